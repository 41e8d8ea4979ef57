use chrono::Utc;
use tracing::{info, warn};

use washday_order::notification::{plan_notification, NotificationPlan, NotificationTemplate};
use washday_order::OrderView;
use washday_shared::models::events::CustomerNotifiedEvent;
use washday_shared::pii::Masked;

use crate::state::AppState;

/// Result of the customer SMS that follows a status change.
#[derive(Debug, Default)]
pub struct NotifyOutcome {
    pub event: Option<CustomerNotifiedEvent>,
    pub warning: Option<String>,
}

/// Send the status SMS for an order that has already been stored. Never
/// fails: a gateway error comes back as a warning for the operator.
pub async fn notify_customer(
    state: &AppState,
    template: NotificationTemplate,
    view: &OrderView,
) -> NotifyOutcome {
    let notification = match plan_notification(template, &view.order, &view.customer) {
        NotificationPlan::Send(n) => n,
        NotificationPlan::SkipNoPhone { template } => {
            info!(
                "No phone on file for order {}, skipping {} SMS",
                view.order.reference(),
                template.name()
            );
            return NotifyOutcome::default();
        }
    };

    let result = state.sms.send_sms(&notification.to, &notification.message).await;
    let (delivered, provider_message_id, warning) = match result {
        Ok(receipt) => (true, receipt.message_id, None),
        Err(e) => {
            warn!(
                "{} SMS for order {} to {} failed: {}",
                template.name(),
                view.order.reference(),
                Masked(notification.to.as_str()),
                e
            );
            (false, None, Some(format!("Status updated but SMS notification failed: {}", e)))
        }
    };

    let event = CustomerNotifiedEvent {
        order_id: view.order.id,
        template: template.name().to_string(),
        delivered,
        provider_message_id,
        timestamp: Utc::now().timestamp(),
    };
    info!("Customer notification: {:?}", event);

    NotifyOutcome { event: Some(event), warning }
}
