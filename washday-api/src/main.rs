use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use washday_api::{app, worker, AppState, AuthConfig};
use washday_order::OrderBoard;
use washday_store::app_config::{Config, StorageBackend};
use washday_store::catalog_repo::StoreClothingTypeRepository;
use washday_store::order_repo::StoreOrderRepository;
use washday_store::payment_repo::StorePaymentRepository;
use washday_store::staff_repo::StoreStaffDirectory;
use washday_store::{AfricasTalkingClient, DbClient, InMemoryStore, RedisClient, TwilioAlertClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "washday_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Washday API on port {}", config.server.port);

    let auth = AuthConfig {
        secret: config.auth.jwt_secret.clone(),
        expiration: config.auth.jwt_expiration_seconds,
    };
    let sms = Arc::new(AfricasTalkingClient::new(&config.sms));
    let payment_alerts = Arc::new(TwilioAlertClient::new(&config.mpesa_alert));

    let mut app_state = match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            AppState::in_memory(Arc::new(InMemoryStore::new()), sms, payment_alerts, auth)
        }
        StorageBackend::Postgres => {
            let db = DbClient::new(&config.database.url)
                .await
                .context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;

            let orders = Arc::new(StoreOrderRepository::new(db.pool.clone()));
            let (change_tx, _) = broadcast::channel(100);
            AppState {
                customers: orders.clone(),
                orders,
                clothing_types: Arc::new(StoreClothingTypeRepository::new(db.pool.clone())),
                payments: Arc::new(StorePaymentRepository::new(db.pool.clone())),
                staff: Arc::new(StoreStaffDirectory::new(db.pool.clone())),
                sms,
                payment_alerts,
                redis: None,
                change_tx,
                board: Arc::new(OrderBoard::new()),
                auth,
                overdue_policy: Default::default(),
            }
        }
    };
    app_state.overdue_policy = config.business_rules.overdue_policy();

    if let Some(url) = config.redis.url.as_deref().filter(|u| !u.is_empty()) {
        match RedisClient::new(url).await {
            Ok(client) => app_state.redis = Some(Arc::new(client)),
            Err(e) => tracing::warn!("Redis unavailable, rate limiting disabled: {}", e),
        }
    }

    tokio::spawn(worker::start_board_sync(app_state.clone()));
    tokio::spawn(worker::start_overdue_worker(
        app_state.clone(),
        config.business_rules.overdue_sweep_seconds,
    ));

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
