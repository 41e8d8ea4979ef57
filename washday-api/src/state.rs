use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use washday_core::notify::{PaymentAlertGateway, SmsGateway};
use washday_core::repository::{
    ClothingTypeRepository, CustomerRepository, OrderRepository, PaymentRepository, StaffDirectory,
};
use washday_order::{OrderBoard, OrderView, OverduePolicy};
use washday_shared::models::events::RecordChangedEvent;
use washday_store::{InMemoryStore, RedisClient};

use crate::error::{store_error, AppError};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub customers: Arc<dyn CustomerRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub clothing_types: Arc<dyn ClothingTypeRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub staff: Arc<dyn StaffDirectory>,
    pub sms: Arc<dyn SmsGateway>,
    pub payment_alerts: Arc<dyn PaymentAlertGateway>,
    /// Rate limiting is skipped when absent.
    pub redis: Option<Arc<RedisClient>>,
    pub change_tx: broadcast::Sender<RecordChangedEvent>,
    pub board: Arc<OrderBoard>,
    pub auth: AuthConfig,
    pub overdue_policy: OverduePolicy,
}

impl AppState {
    /// Every repository backed by one in-memory store.
    pub fn in_memory(
        store: Arc<InMemoryStore>,
        sms: Arc<dyn SmsGateway>,
        payment_alerts: Arc<dyn PaymentAlertGateway>,
        auth: AuthConfig,
    ) -> Self {
        let (change_tx, _) = broadcast::channel(100);
        Self {
            customers: store.clone(),
            orders: store.clone(),
            clothing_types: store.clone(),
            payments: store.clone(),
            staff: store,
            sms,
            payment_alerts,
            redis: None,
            change_tx,
            board: Arc::new(OrderBoard::new()),
            auth,
            overdue_policy: OverduePolicy::default(),
        }
    }

    /// Broadcast a change notification. Having no subscribers is fine.
    pub fn publish(&self, event: RecordChangedEvent) {
        let _ = self.change_tx.send(event);
    }

    /// Put the stored copy of the order on the board and return it. Edits
    /// start from this copy so they see writes the board has not synced yet.
    pub async fn load_onto_board(&self, order_id: Uuid) -> Result<OrderView, AppError> {
        let view = self
            .orders
            .get_order(order_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| AppError::NotFoundError(format!("Order {} not found", order_id)))?;
        self.board.upsert(view.clone()).await;
        Ok(view)
    }
}
