use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use washday_order::{
    ClothingType, Customer, Order, OrderItem, OrderStatus, OrderView, Payment, PaymentStatus,
};

use crate::identity::{Role, StaffUser};

pub type RepoResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Filter for order listings. Listings are newest first.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    pub fn status(status: OrderStatus) -> Self {
        Self { status: Some(status) }
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.status.map_or(true, |s| order.status == s)
    }
}

/// Repository trait for customer records
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_by_phone(&self, phone_number: &str) -> RepoResult<Option<Customer>>;

    async fn get_customer(&self, id: Uuid) -> RepoResult<Option<Customer>>;

    async fn create_customer(&self, customer: &Customer) -> RepoResult<()>;
}

/// Repository trait for orders and their line items
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Stores the order, its items and the payment taken at the counter as
    /// one unit. Nothing is kept if any part fails.
    async fn create_order(
        &self,
        order: &Order,
        items: &[OrderItem],
        payment: Option<&Payment>,
    ) -> RepoResult<()>;

    async fn get_order(&self, id: Uuid) -> RepoResult<Option<OrderView>>;

    async fn list_orders(&self, filter: &OrderFilter) -> RepoResult<Vec<OrderView>>;

    /// Case-insensitive substring match on customer name or phone, most
    /// recently received first.
    async fn search_orders(&self, term: &str) -> RepoResult<Vec<OrderView>>;

    async fn list_items(&self, order_id: Uuid) -> RepoResult<Vec<OrderItem>>;

    /// Point update of the status column. Fails with `CoreError::NotFound`
    /// when the order does not exist.
    async fn update_status(&self, id: Uuid, status: OrderStatus) -> RepoResult<Order>;

    async fn update_payment(
        &self,
        id: Uuid,
        payment_status: PaymentStatus,
        amount_paid: Decimal,
    ) -> RepoResult<Order>;
}

/// Repository trait for the clothing price list
#[async_trait]
pub trait ClothingTypeRepository: Send + Sync {
    async fn list_clothing_types(&self) -> RepoResult<Vec<ClothingType>>;

    async fn create_clothing_type(&self, clothing_type: &ClothingType) -> RepoResult<()>;
}

/// Repository trait for the payment audit trail
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn record_payment(&self, payment: &Payment) -> RepoResult<()>;

    async fn list_payments(&self, order_id: Uuid) -> RepoResult<Vec<Payment>>;
}

/// Staff accounts and their roles
#[async_trait]
pub trait StaffDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<StaffUser>>;

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<StaffUser>>;

    async fn role_for(&self, user_id: Uuid) -> RepoResult<Option<Role>>;
}
