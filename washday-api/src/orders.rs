use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use washday_core::repository::OrderFilter;
use washday_order::finance::Financials;
use washday_order::intake::OrderDraft;
use washday_order::lifecycle::{evaluate_overdue, today};
use washday_order::receipt::Receipt;
use washday_order::{
    ChangeHandler, Customer, OrderItem, OrderStatus, OrderView, OverdueStatus, PaymentChange,
    PaymentStatus, StatusChange,
};
use washday_shared::models::events::{CustomerNotifiedEvent, RecordChangedEvent};
use washday_shared::pii::Masked;

use crate::error::{board_error, intake_error, store_error, AppError};
use crate::middleware::auth::StaffClaims;
use crate::notifications::notify_customer;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// An order as listed on staff screens, with its collection standing.
#[derive(Debug, Serialize)]
pub struct OrderSummary {
    #[serde(flatten)]
    pub view: OrderView,
    pub overdue: OverdueStatus,
    pub financials: Financials,
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub summary: OrderSummary,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdateResponse {
    pub order: OrderView,
    pub change: StatusChange,
    pub notification: Option<CustomerNotifiedEvent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaymentStatusRequest {
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Serialize)]
pub struct PaymentUpdateResponse {
    pub order: OrderView,
    pub change: PaymentChange,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/orders", get(list_orders).post(create_order))
        .route("/v1/orders/search", get(search_orders))
        .route("/v1/orders/board", get(board_snapshot))
        .route("/v1/orders/{id}", get(get_order))
        .route("/v1/orders/{id}/receipt", get(get_receipt))
        .route("/v1/orders/{id}/status", put(update_status))
        .route("/v1/orders/{id}/payment-status", put(update_payment_status))
}

fn summarize(state: &AppState, view: OrderView) -> OrderSummary {
    let overdue = evaluate_overdue(
        view.order.collection_date,
        view.order.status,
        today(),
        &state.overdue_policy,
    );
    let financials = Financials::of(&view.order);
    OrderSummary { view, overdue, financials }
}

// ============================================================================
// Handlers
// ============================================================================

/// Look the customer up by phone, registering them on first visit. A
/// concurrent first visit from the same phone wins the insert; the loser
/// picks up that record.
async fn find_or_register_customer(state: &AppState, draft: &OrderDraft) -> Result<Customer, AppError> {
    let phone = draft.phone_number.trim();
    if let Some(existing) = state.customers.find_by_phone(phone).await.map_err(store_error)? {
        return Ok(existing);
    }

    let customer = Customer::new(draft.customer_name.trim().to_string(), phone.to_string());
    match state.customers.create_customer(&customer).await {
        Ok(()) => {
            tracing::info!("Registered customer {}", Masked(customer.phone_number.as_str()));
            Ok(customer)
        }
        Err(e) => match state.customers.find_by_phone(phone).await.map_err(store_error)? {
            Some(existing) => {
                tracing::debug!("Customer {} registered concurrently", Masked(phone));
                Ok(existing)
            }
            None => Err(store_error(e)),
        },
    }
}

/// POST /v1/orders
/// Take in a new order, registering the customer on first visit
pub async fn create_order(
    State(state): State<AppState>,
    Extension(claims): Extension<StaffClaims>,
    Json(draft): Json<OrderDraft>,
) -> Result<(StatusCode, Json<OrderDetail>), AppError> {
    draft.validate().map_err(intake_error)?;

    let customer = find_or_register_customer(&state, &draft).await?;

    let accepted = draft.accept(&customer, Some(claims.sub)).map_err(intake_error)?;
    state
        .orders
        .create_order(&accepted.order, &accepted.items, accepted.payment.as_ref())
        .await
        .map_err(store_error)?;

    if let Some(payment) = &accepted.payment {
        state.publish(RecordChangedEvent::payment_inserted(payment.id));
    }

    let view = OrderView::new(accepted.order, customer);
    tracing::info!("Order {} created by {}", view.order.reference(), claims.username);
    state.board.upsert(view.clone()).await;
    state.publish(RecordChangedEvent::order_inserted(view.order.id));

    let detail = OrderDetail {
        summary: summarize(&state, view),
        items: accepted.items,
    };
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /v1/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<OrderSummary>>, AppError> {
    let filter = OrderFilter { status: query.status };
    let views = state.orders.list_orders(&filter).await.map_err(store_error)?;

    Ok(Json(views.into_iter().map(|v| summarize(&state, v)).collect()))
}

/// GET /v1/orders/board
/// The local board, including edits whose writes are still in flight
pub async fn board_snapshot(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Json<Vec<OrderSummary>> {
    let views = state.board.snapshot(query.status).await;
    Json(views.into_iter().map(|v| summarize(&state, v)).collect())
}

/// GET /v1/orders/search?q=
/// Tracking lookup by customer name or phone
pub async fn search_orders(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<OrderSummary>>, AppError> {
    let term = query.q.trim();
    if term.is_empty() {
        return Err(AppError::ValidationError("Enter a name or phone number to search".into()));
    }

    let views = state.orders.search_orders(term).await.map_err(store_error)?;
    Ok(Json(views.into_iter().map(|v| summarize(&state, v)).collect()))
}

/// GET /v1/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderDetail>, AppError> {
    let view = state
        .orders
        .get_order(order_id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::NotFoundError(format!("Order {} not found", order_id)))?;
    let items = state.orders.list_items(order_id).await.map_err(store_error)?;

    Ok(Json(OrderDetail {
        summary: summarize(&state, view),
        items,
    }))
}

/// GET /v1/orders/{id}/receipt
pub async fn get_receipt(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Receipt>, AppError> {
    let view = state
        .orders
        .get_order(order_id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| AppError::NotFoundError(format!("Order {} not found", order_id)))?;
    let items = state.orders.list_items(order_id).await.map_err(store_error)?;
    let clothing_types = state.clothing_types.list_clothing_types().await.map_err(store_error)?;

    Ok(Json(Receipt::build(
        &view,
        &items,
        &clothing_types,
        &state.overdue_policy,
        today(),
    )))
}

/// PUT /v1/orders/{id}/status
/// Change the order status; ready and delayed trigger a customer SMS once
/// the new status is stored
pub async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<StaffClaims>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<StatusUpdateResponse>, AppError> {
    state.load_onto_board(order_id).await?;

    let orders = state.orders.clone();
    let (view, change) = state
        .board
        .apply(
            order_id,
            |order| {
                ChangeHandler::change_status(order, req.status)
                    .map_err(|e| AppError::ValidationError(e.to_string()))
            },
            |order| async move {
                orders
                    .update_status(order.id, order.status)
                    .await
                    .map_err(store_error)
            },
        )
        .await
        .map_err(board_error)?;

    tracing::info!(
        "Order {} status {} -> {} by {}",
        view.order.reference(),
        change.from,
        change.to,
        claims.username
    );
    if change.changed {
        state.publish(RecordChangedEvent::order_updated(order_id));
    }

    let mut warnings = Vec::new();
    let mut notification = None;
    if let Some(template) = change.notify {
        let outcome = notify_customer(&state, template, &view).await;
        notification = outcome.event;
        warnings.extend(outcome.warning);
    }

    Ok(Json(StatusUpdateResponse {
        order: view,
        change,
        notification,
        warnings,
    }))
}

/// PUT /v1/orders/{id}/payment-status
/// Paid settles the order in full, unpaid clears the amount, deposit keeps it
pub async fn update_payment_status(
    State(state): State<AppState>,
    Extension(claims): Extension<StaffClaims>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<UpdatePaymentStatusRequest>,
) -> Result<Json<PaymentUpdateResponse>, AppError> {
    state.load_onto_board(order_id).await?;

    let orders = state.orders.clone();
    let (view, change) = state
        .board
        .apply(
            order_id,
            |order| Ok(ChangeHandler::change_payment_status(order, req.payment_status)),
            |order| async move {
                orders
                    .update_payment(order.id, order.payment_status, order.amount_paid)
                    .await
                    .map_err(store_error)
            },
        )
        .await
        .map_err(board_error)?;

    tracing::info!(
        "Order {} payment {} -> {} (paid {} -> {}) by {}",
        view.order.reference(),
        change.from,
        change.to,
        change.amount_paid_before,
        change.amount_paid_after,
        claims.username
    );
    state.publish(RecordChangedEvent::order_updated(order_id));

    Ok(Json(PaymentUpdateResponse { order: view, change }))
}
