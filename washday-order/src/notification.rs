use serde::{Deserialize, Serialize};

use crate::finance::format_kes;
use crate::models::{Customer, Order, OrderStatus};

/// Customer SMS wording, keyed by the status that triggers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTemplate {
    ReadyForCollection,
    Delayed,
}

impl NotificationTemplate {
    pub fn for_status(status: OrderStatus) -> Option<Self> {
        match status {
            OrderStatus::Ready => Some(NotificationTemplate::ReadyForCollection),
            OrderStatus::Delayed => Some(NotificationTemplate::Delayed),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NotificationTemplate::ReadyForCollection => "ready_for_collection",
            NotificationTemplate::Delayed => "delayed",
        }
    }

    pub fn render(&self, order: &Order, customer: &Customer) -> String {
        let greeting = match customer.first_name() {
            "" => "Hello".to_string(),
            name => format!("Hello {}", name),
        };

        match self {
            NotificationTemplate::ReadyForCollection => {
                let balance = order.balance_due();
                let mut text = format!(
                    "{}, your laundry order #{} is ready for collection.",
                    greeting,
                    order.reference()
                );
                if balance > rust_decimal::Decimal::ZERO {
                    text.push_str(&format!(" Balance due: {}.", format_kes(balance)));
                }
                text.push_str(" Thank you!");
                text
            }
            NotificationTemplate::Delayed => format!(
                "{}, your laundry order #{} has been delayed. We apologise for the inconvenience and will let you know as soon as it is ready.",
                greeting,
                order.reference()
            ),
        }
    }
}

/// An SMS ready to hand to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerNotification {
    pub template: NotificationTemplate,
    pub to: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NotificationPlan {
    Send(CustomerNotification),
    /// The customer has no phone number on file.
    SkipNoPhone { template: NotificationTemplate },
}

pub fn plan_notification(
    template: NotificationTemplate,
    order: &Order,
    customer: &Customer,
) -> NotificationPlan {
    let phone = customer.phone_number.trim();
    if phone.is_empty() {
        return NotificationPlan::SkipNoPhone { template };
    }

    NotificationPlan::Send(CustomerNotification {
        template,
        to: phone.to_string(),
        message: template.render(order, customer),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fixture() -> (Order, Customer) {
        let customer = Customer::new("Amina Otieno".into(), "+254700000000".into());
        let order = Order::new(customer.id, dec!(1200));
        (order, customer)
    }

    #[test]
    fn test_delayed_message_wording() {
        let (order, customer) = fixture();
        let text = NotificationTemplate::Delayed.render(&order, &customer);
        assert!(text.contains(&order.reference()));
        assert!(text.contains("delayed"));
        assert!(text.contains("apologise"));
        assert!(text.starts_with("Hello Amina"));
    }

    #[test]
    fn test_ready_message_quotes_balance() {
        let (mut order, customer) = fixture();
        order.amount_paid = dec!(200);
        let text = NotificationTemplate::ReadyForCollection.render(&order, &customer);
        assert!(text.contains("ready for collection"));
        assert!(text.contains("KES 1000.00"));
    }

    #[test]
    fn test_ready_message_omits_settled_balance() {
        let (mut order, customer) = fixture();
        order.amount_paid = dec!(1200);
        let text = NotificationTemplate::ReadyForCollection.render(&order, &customer);
        assert!(!text.contains("Balance due"));
    }

    #[test]
    fn test_missing_phone_skips() {
        let (order, mut customer) = fixture();
        customer.phone_number = "  ".into();
        let plan = plan_notification(NotificationTemplate::Delayed, &order, &customer);
        assert_eq!(plan, NotificationPlan::SkipNoPhone { template: NotificationTemplate::Delayed });
    }

    #[test]
    fn test_plan_targets_customer_phone() {
        let (order, customer) = fixture();
        match plan_notification(NotificationTemplate::ReadyForCollection, &order, &customer) {
            NotificationPlan::Send(sms) => assert_eq!(sms.to, "+254700000000"),
            other => panic!("unexpected plan {:?}", other),
        }
    }
}
