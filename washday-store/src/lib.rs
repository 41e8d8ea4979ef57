pub mod app_config;
pub mod database;
pub mod redis_repo;
pub mod order_repo;
pub mod catalog_repo;
pub mod payment_repo;
pub mod staff_repo;
pub mod memory_repo;
pub mod sms_gateway;

pub use database::DbClient;
pub use memory_repo::InMemoryStore;
pub use redis_repo::RedisClient;
pub use sms_gateway::{AfricasTalkingClient, TwilioAlertClient};
