use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use washday_core::identity::{Role, StaffUser};
use washday_core::repository::{
    ClothingTypeRepository, CustomerRepository, OrderFilter, OrderRepository, PaymentRepository,
    RepoResult, StaffDirectory,
};
use washday_core::CoreError;
use washday_order::{
    ClothingType, Customer, Order, OrderItem, OrderStatus, OrderView, Payment, PaymentStatus,
};

#[derive(Default)]
struct Tables {
    customers: HashMap<Uuid, Customer>,
    orders: HashMap<Uuid, Order>,
    items: Vec<OrderItem>,
    clothing_types: Vec<ClothingType>,
    payments: Vec<Payment>,
    staff: HashMap<Uuid, (StaffUser, Role)>,
}

/// Process-local implementation of every repository trait. Used by the
/// `memory` storage backend and by the API tests.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    /// When set, every write fails with this message.
    failing_writes: RwLock<Option<String>>,
    /// When set, only payment inserts fail.
    failing_payments: RwLock<Option<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_staff(&self, user: StaffUser, role: Role) {
        self.tables.write().await.staff.insert(user.id, (user, role));
    }

    pub async fn fail_writes(&self, message: Option<&str>) {
        *self.failing_writes.write().await = message.map(str::to_string);
    }

    pub async fn fail_payments(&self, message: Option<&str>) {
        *self.failing_payments.write().await = message.map(str::to_string);
    }

    async fn check_payment_writable(&self) -> RepoResult<()> {
        self.check_writable().await?;
        match self.failing_payments.read().await.as_ref() {
            Some(msg) => Err(CoreError::InternalError(msg.clone()).into()),
            None => Ok(()),
        }
    }

    async fn check_writable(&self) -> RepoResult<()> {
        match self.failing_writes.read().await.as_ref() {
            Some(msg) => Err(CoreError::InternalError(msg.clone()).into()),
            None => Ok(()),
        }
    }

    fn view(tables: &Tables, order: &Order) -> RepoResult<OrderView> {
        let customer = tables
            .customers
            .get(&order.customer_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("customer {}", order.customer_id)))?;
        Ok(OrderView::new(order.clone(), customer))
    }
}

fn order_not_found(id: Uuid) -> Box<dyn std::error::Error + Send + Sync> {
    CoreError::NotFound(format!("order {}", id)).into()
}

#[async_trait]
impl CustomerRepository for InMemoryStore {
    async fn find_by_phone(&self, phone_number: &str) -> RepoResult<Option<Customer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .customers
            .values()
            .find(|c| c.phone_number == phone_number)
            .cloned())
    }

    async fn get_customer(&self, id: Uuid) -> RepoResult<Option<Customer>> {
        Ok(self.tables.read().await.customers.get(&id).cloned())
    }

    async fn create_customer(&self, customer: &Customer) -> RepoResult<()> {
        self.check_writable().await?;
        let mut tables = self.tables.write().await;
        if tables.customers.values().any(|c| c.phone_number == customer.phone_number) {
            return Err(CoreError::ValidationError("phone number already registered".into()).into());
        }
        tables.customers.insert(customer.id, customer.clone());
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn create_order(
        &self,
        order: &Order,
        items: &[OrderItem],
        payment: Option<&Payment>,
    ) -> RepoResult<()> {
        self.check_writable().await?;
        if payment.is_some() {
            self.check_payment_writable().await?;
        }
        let mut tables = self.tables.write().await;
        if !tables.customers.contains_key(&order.customer_id) {
            return Err(CoreError::NotFound(format!("customer {}", order.customer_id)).into());
        }
        tables.orders.insert(order.id, order.clone());
        tables.items.extend_from_slice(items);
        tables.payments.extend(payment.cloned());
        Ok(())
    }

    async fn get_order(&self, id: Uuid) -> RepoResult<Option<OrderView>> {
        let tables = self.tables.read().await;
        tables
            .orders
            .get(&id)
            .map(|o| Self::view(&tables, o))
            .transpose()
    }

    async fn list_orders(&self, filter: &OrderFilter) -> RepoResult<Vec<OrderView>> {
        let tables = self.tables.read().await;
        let mut views = tables
            .orders
            .values()
            .filter(|o| filter.matches(o))
            .map(|o| Self::view(&tables, o))
            .collect::<RepoResult<Vec<_>>>()?;
        views.sort_by(|a, b| b.order.created_at.cmp(&a.order.created_at));
        Ok(views)
    }

    async fn search_orders(&self, term: &str) -> RepoResult<Vec<OrderView>> {
        let needle = term.to_lowercase();
        let tables = self.tables.read().await;
        let mut views = tables
            .orders
            .values()
            .map(|o| Self::view(&tables, o))
            .collect::<RepoResult<Vec<_>>>()?;
        views.retain(|v| {
            v.customer.full_name.to_lowercase().contains(&needle)
                || v.customer.phone_number.to_lowercase().contains(&needle)
        });
        views.sort_by(|a, b| b.order.date_received.cmp(&a.order.date_received));
        Ok(views)
    }

    async fn list_items(&self, order_id: Uuid) -> RepoResult<Vec<OrderItem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn update_status(&self, id: Uuid, status: OrderStatus) -> RepoResult<Order> {
        self.check_writable().await?;
        let mut tables = self.tables.write().await;
        let order = tables.orders.get_mut(&id).ok_or_else(|| order_not_found(id))?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn update_payment(
        &self,
        id: Uuid,
        payment_status: PaymentStatus,
        amount_paid: Decimal,
    ) -> RepoResult<Order> {
        self.check_writable().await?;
        let mut tables = self.tables.write().await;
        let order = tables.orders.get_mut(&id).ok_or_else(|| order_not_found(id))?;
        order.payment_status = payment_status;
        order.amount_paid = amount_paid;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }
}

#[async_trait]
impl ClothingTypeRepository for InMemoryStore {
    async fn list_clothing_types(&self) -> RepoResult<Vec<ClothingType>> {
        let mut types = self.tables.read().await.clothing_types.clone();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(types)
    }

    async fn create_clothing_type(&self, clothing_type: &ClothingType) -> RepoResult<()> {
        self.check_writable().await?;
        self.tables.write().await.clothing_types.push(clothing_type.clone());
        Ok(())
    }
}

#[async_trait]
impl PaymentRepository for InMemoryStore {
    async fn record_payment(&self, payment: &Payment) -> RepoResult<()> {
        self.check_payment_writable().await?;
        let mut tables = self.tables.write().await;
        if !tables.orders.contains_key(&payment.order_id) {
            return Err(order_not_found(payment.order_id));
        }
        tables.payments.push(payment.clone());
        Ok(())
    }

    async fn list_payments(&self, order_id: Uuid) -> RepoResult<Vec<Payment>> {
        let tables = self.tables.read().await;
        let mut payments: Vec<Payment> = tables
            .payments
            .iter()
            .filter(|p| p.order_id == order_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
        Ok(payments)
    }
}

#[async_trait]
impl StaffDirectory for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<StaffUser>> {
        let tables = self.tables.read().await;
        Ok(tables
            .staff
            .values()
            .find(|(u, _)| u.username == username)
            .map(|(u, _)| u.clone()))
    }

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<StaffUser>> {
        Ok(self.tables.read().await.staff.get(&id).map(|(u, _)| u.clone()))
    }

    async fn role_for(&self, user_id: Uuid) -> RepoResult<Option<Role>> {
        Ok(self.tables.read().await.staff.get(&user_id).map(|(_, r)| *r))
    }
}
