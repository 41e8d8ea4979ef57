use chrono::NaiveDate;
use std::time::Duration;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{error, info, warn};
use uuid::Uuid;

use washday_core::repository::OrderFilter;
use washday_order::lifecycle::{evaluate_overdue, today};
use washday_order::{OrderStatus, OrderView};
use washday_shared::models::events::{ChangeTable, RecordChangedEvent};

use crate::error::{store_error, AppError};
use crate::state::AppState;

/// Mark every order past its storage threshold as overdue. Collected orders
/// and orders already marked are left alone. Returns the ids that changed.
pub async fn sweep_overdue(state: &AppState, today: NaiveDate) -> Result<Vec<Uuid>, AppError> {
    let orders = state
        .orders
        .list_orders(&OrderFilter::default())
        .await
        .map_err(store_error)?;

    let mut marked = Vec::new();
    for view in orders {
        let order = &view.order;
        if order.status == OrderStatus::Overdue {
            continue;
        }
        let standing = evaluate_overdue(order.collection_date, order.status, today, &state.overdue_policy);
        if !standing.is_overdue() {
            continue;
        }

        match state.orders.update_status(order.id, OrderStatus::Overdue).await {
            Ok(stored) => {
                state.board.upsert(OrderView::new(stored, view.customer.clone())).await;
                state.publish(RecordChangedEvent::order_updated(order.id));
                marked.push(order.id);
            }
            Err(e) => error!("Failed to mark order {} overdue: {}", order.reference(), e),
        }
    }

    if !marked.is_empty() {
        info!("Marked {} orders overdue", marked.len());
    }
    Ok(marked)
}

pub async fn start_overdue_worker(state: AppState, interval_seconds: u64) {
    if interval_seconds == 0 {
        info!("Overdue sweep disabled");
        return;
    }

    info!("Overdue sweep running every {}s", interval_seconds);
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_seconds));
    loop {
        ticker.tick().await;
        if let Err(e) = sweep_overdue(&state, today()).await {
            error!("Overdue sweep failed: {:?}", e);
        }
    }
}

/// Replace the board with a fresh copy of every order.
pub async fn refresh_board(state: &AppState) -> Result<usize, AppError> {
    let views = state
        .orders
        .list_orders(&OrderFilter::default())
        .await
        .map_err(store_error)?;
    let count = views.len();
    state.board.replace_all(views).await;
    Ok(count)
}

fn touches_orders(event: &RecordChangedEvent) -> bool {
    matches!(event.table, ChangeTable::Orders | ChangeTable::Customers)
}

/// Keep the board in step with the store. A burst of notifications results
/// in a single refetch.
pub async fn start_board_sync(state: AppState) {
    let mut rx = state.change_tx.subscribe();

    if let Err(e) = refresh_board(&state).await {
        warn!("Initial board load failed: {:?}", e);
    }

    loop {
        let mut stale = match rx.recv().await {
            Ok(event) => touches_orders(&event),
            Err(RecvError::Lagged(skipped)) => {
                warn!("Board sync lagged by {} notifications", skipped);
                true
            }
            Err(RecvError::Closed) => break,
        };

        loop {
            match rx.try_recv() {
                Ok(event) => stale |= touches_orders(&event),
                Err(TryRecvError::Lagged(_)) => stale = true,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        if stale {
            match refresh_board(&state).await {
                Ok(count) => info!("Board refreshed with {} orders", count),
                Err(e) => warn!("Board refresh failed: {:?}", e),
            }
        }
    }

    info!("Board sync stopped");
}
