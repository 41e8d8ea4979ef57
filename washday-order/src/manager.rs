use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Order, OrderStatus, OrderView};

struct BoardEntry {
    view: OrderView,
    revision: u64,
}

/// Local view of the order collection that staff screens read from.
///
/// Edits are applied optimistically: the board shows the new value at once,
/// the remote write runs, and a failed write restores the previous value.
/// Each edit stamps the entry with a fresh revision; a rollback or a write
/// acknowledgement only lands if the entry still carries that revision, so
/// the most recent edit or full refresh wins.
pub struct OrderBoard {
    entries: RwLock<HashMap<Uuid, BoardEntry>>,
    revision: AtomicU64,
}

impl OrderBoard {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            revision: AtomicU64::new(0),
        }
    }

    fn next_revision(&self) -> u64 {
        self.revision.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Swap in a freshly fetched collection. Outstanding optimistic edits
    /// lose to it.
    pub async fn replace_all(&self, views: Vec<OrderView>) {
        let mut fresh = HashMap::with_capacity(views.len());
        for view in views {
            let revision = self.next_revision();
            fresh.insert(view.order.id, BoardEntry { view, revision });
        }
        *self.entries.write().await = fresh;
    }

    pub async fn upsert(&self, view: OrderView) {
        let revision = self.next_revision();
        self.entries
            .write()
            .await
            .insert(view.order.id, BoardEntry { view, revision });
    }

    pub async fn get(&self, order_id: &Uuid) -> Option<OrderView> {
        self.entries.read().await.get(order_id).map(|e| e.view.clone())
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// All orders, newest first, optionally narrowed to one status.
    pub async fn snapshot(&self, status: Option<OrderStatus>) -> Vec<OrderView> {
        let mut views: Vec<OrderView> = self
            .entries
            .read()
            .await
            .values()
            .filter(|e| status.map_or(true, |s| e.view.order.status == s))
            .map(|e| e.view.clone())
            .collect();
        views.sort_by(|a, b| b.order.created_at.cmp(&a.order.created_at));
        views
    }

    /// Apply `edit` locally, then persist with `write`.
    ///
    /// `write` receives the optimistically edited order and returns the
    /// stored one. On failure the pre-edit view is restored (unless a newer
    /// edit has replaced it) and the write error is returned.
    pub async fn apply<T, E, Edit, Write, Fut>(
        &self,
        order_id: Uuid,
        edit: Edit,
        write: Write,
    ) -> Result<(OrderView, T), BoardError<E>>
    where
        Edit: FnOnce(&mut Order) -> Result<T, E>,
        Write: FnOnce(Order) -> Fut,
        Fut: Future<Output = Result<Order, E>>,
    {
        let (previous, optimistic, outcome, revision) = {
            let mut entries = self.entries.write().await;
            let entry = entries
                .get_mut(&order_id)
                .ok_or(BoardError::NotFound(order_id))?;

            let previous = entry.view.clone();
            let outcome = edit(&mut entry.view.order).map_err(BoardError::Rejected)?;
            let revision = self.next_revision();
            entry.revision = revision;
            (previous, entry.view.order.clone(), outcome, revision)
        };

        match write(optimistic).await {
            Ok(stored) => {
                let mut entries = self.entries.write().await;
                let view = OrderView::new(stored, previous.customer);
                if let Some(entry) = entries.get_mut(&order_id) {
                    if entry.revision == revision {
                        entry.view = view.clone();
                    }
                }
                Ok((view, outcome))
            }
            Err(err) => {
                let mut entries = self.entries.write().await;
                if let Some(entry) = entries.get_mut(&order_id) {
                    if entry.revision == revision {
                        tracing::debug!("Rolling back optimistic edit on order {}", order_id);
                        entry.view = previous;
                    }
                }
                Err(BoardError::WriteFailed(err))
            }
        }
    }
}

impl Default for OrderBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BoardError<E> {
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    #[error("Edit rejected")]
    Rejected(E),

    #[error("Remote write failed")]
    WriteFailed(E),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::ChangeHandler;
    use crate::models::{Customer, PaymentStatus};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn view() -> OrderView {
        let customer = Customer::new("Lucy Wambui".into(), "+254733000000".into());
        let order = Order::new(customer.id, dec!(900));
        OrderView::new(order, customer)
    }

    #[tokio::test]
    async fn test_successful_write_keeps_edit() {
        let board = OrderBoard::new();
        let v = view();
        let id = v.order.id;
        board.upsert(v).await;

        let (stored, change) = board
            .apply(
                id,
                |o| ChangeHandler::change_status(o, OrderStatus::Ready).map_err(|e| e.to_string()),
                |o| async move { Ok::<_, String>(o) },
            )
            .await
            .unwrap();

        assert!(change.changed);
        assert_eq!(stored.order.status, OrderStatus::Ready);
        assert_eq!(board.get(&id).await.unwrap().order.status, OrderStatus::Ready);
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back() {
        let board = OrderBoard::new();
        let mut v = view();
        v.order.amount_paid = dec!(250);
        v.order.payment_status = PaymentStatus::Deposit;
        let id = v.order.id;
        board.upsert(v).await;

        let result = board
            .apply(
                id,
                |o| Ok::<_, String>(ChangeHandler::change_payment_status(o, PaymentStatus::Paid)),
                |_| async { Err::<Order, _>("connection reset".to_string()) },
            )
            .await;

        assert!(matches!(result, Err(BoardError::WriteFailed(ref e)) if e == "connection reset"));
        let restored = board.get(&id).await.unwrap();
        assert_eq!(restored.order.payment_status, PaymentStatus::Deposit);
        assert_eq!(restored.order.amount_paid, dec!(250));
    }

    #[tokio::test]
    async fn test_edit_visible_before_write_completes() {
        let board = Arc::new(OrderBoard::new());
        let v = view();
        let id = v.order.id;
        board.upsert(v).await;

        let (seen_tx, seen_rx) = tokio::sync::oneshot::channel();
        let reader = board.clone();
        let result = board
            .apply(
                id,
                |o| ChangeHandler::change_status(o, OrderStatus::Delayed).map_err(|e| e.to_string()),
                |o| async move {
                    let during = reader.get(&id).await.unwrap().order.status;
                    let _ = seen_tx.send(during);
                    Ok::<_, String>(o)
                },
            )
            .await;

        assert!(result.is_ok());
        assert_eq!(seen_rx.await.unwrap(), OrderStatus::Delayed);
    }

    #[tokio::test]
    async fn test_refresh_during_write_wins_over_rollback() {
        let board = Arc::new(OrderBoard::new());
        let v = view();
        let id = v.order.id;
        board.upsert(v.clone()).await;

        let mut refreshed = v.clone();
        refreshed.order.status = OrderStatus::Collected;
        let refresher = board.clone();

        let result = board
            .apply(
                id,
                |o| ChangeHandler::change_status(o, OrderStatus::Ready).map_err(|e| e.to_string()),
                |_| async move {
                    refresher.replace_all(vec![refreshed]).await;
                    Err::<Order, _>("timeout".to_string())
                },
            )
            .await;

        assert!(result.is_err());
        assert_eq!(board.get(&id).await.unwrap().order.status, OrderStatus::Collected);
    }

    #[tokio::test]
    async fn test_missing_order() {
        let board = OrderBoard::new();
        let result = board
            .apply(
                Uuid::new_v4(),
                |_| Ok::<_, String>(()),
                |o| async move { Ok::<_, String>(o) },
            )
            .await;
        assert!(matches!(result, Err(BoardError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_snapshot_filters_by_status() {
        let board = OrderBoard::new();
        let mut ready = view();
        ready.order.status = OrderStatus::Ready;
        board.replace_all(vec![view(), ready]).await;

        assert_eq!(board.len().await, 2);
        assert_eq!(board.snapshot(Some(OrderStatus::Ready)).await.len(), 1);
        assert_eq!(board.snapshot(None).await.len(), 2);
    }
}
