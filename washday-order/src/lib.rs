pub mod models;
pub mod lifecycle;
pub mod finance;
pub mod changes;
pub mod notification;
pub mod intake;
pub mod receipt;
pub mod report;
pub mod manager;

pub use models::{
    ClothingType, Customer, Order, OrderItem, OrderStatus, OrderView, Payment, PaymentMethod,
    PaymentStatus,
};
pub use lifecycle::{evaluate_overdue, OverduePolicy, OverdueStatus};
pub use changes::{ChangeHandler, StatusChange, PaymentChange};
pub use manager::{OrderBoard, BoardError};
