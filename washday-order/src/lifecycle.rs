use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::OrderStatus;

/// How long an uncollected order may sit before storage charges apply, and
/// how early to start warning about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverduePolicy {
    pub grace_months: u32,
    pub warning_window_days: i64,
}

impl Default for OverduePolicy {
    fn default() -> Self {
        Self {
            grace_months: 3,
            warning_window_days: 30,
        }
    }
}

/// Collection standing of an order relative to its overdue threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OverdueStatus {
    /// Collected orders never show an indicator.
    Exempt,
    /// No usable collection date.
    Indeterminate,
    Overdue { days_overdue: i64 },
    Approaching { days_remaining: i64 },
    Normal { days_remaining: i64 },
}

impl OverdueStatus {
    pub fn is_overdue(&self) -> bool {
        matches!(self, OverdueStatus::Overdue { .. })
    }

    pub fn is_approaching(&self) -> bool {
        matches!(self, OverdueStatus::Approaching { .. })
    }

    /// Whether a badge is rendered next to the order.
    pub fn shows_badge(&self) -> bool {
        self.is_overdue() || self.is_approaching()
    }

    /// Signed days to the threshold; negative once overdue.
    pub fn days_remaining(&self) -> Option<i64> {
        match *self {
            OverdueStatus::Overdue { days_overdue } => Some(-days_overdue),
            OverdueStatus::Approaching { days_remaining }
            | OverdueStatus::Normal { days_remaining } => Some(days_remaining),
            OverdueStatus::Exempt | OverdueStatus::Indeterminate => None,
        }
    }
}

/// The date after which storage charges apply. Month arithmetic clamps to the
/// end of the target month (Nov 30 + 3 months is the last day of February).
pub fn overdue_threshold(collection_date: NaiveDate, policy: &OverduePolicy) -> Option<NaiveDate> {
    collection_date.checked_add_months(Months::new(policy.grace_months))
}

/// Whole calendar days from `today` to the overdue threshold. Both ends are
/// dates, so there is no fractional day to round.
pub fn days_until_overdue(
    collection_date: NaiveDate,
    today: NaiveDate,
    policy: &OverduePolicy,
) -> Option<i64> {
    overdue_threshold(collection_date, policy).map(|threshold| (threshold - today).num_days())
}

pub fn evaluate_overdue(
    collection_date: Option<NaiveDate>,
    status: OrderStatus,
    today: NaiveDate,
    policy: &OverduePolicy,
) -> OverdueStatus {
    if status == OrderStatus::Collected {
        return OverdueStatus::Exempt;
    }

    let Some(days) = collection_date.and_then(|d| days_until_overdue(d, today, policy)) else {
        return OverdueStatus::Indeterminate;
    };

    if days < 0 {
        OverdueStatus::Overdue { days_overdue: -days }
    } else if days > 0 && days <= policy.warning_window_days {
        OverdueStatus::Approaching { days_remaining: days }
    } else {
        OverdueStatus::Normal { days_remaining: days }
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (date part kept).
pub fn parse_collection_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_overdue_after_three_months() {
        let policy = OverduePolicy::default();
        let result = evaluate_overdue(
            Some(date(2024, 1, 1)),
            OrderStatus::Pending,
            date(2024, 4, 15),
            &policy,
        );
        assert_eq!(result, OverdueStatus::Overdue { days_overdue: 14 });
        assert!(result.is_overdue());
    }

    #[test]
    fn test_approaching_overdue_window() {
        let policy = OverduePolicy::default();
        let result = evaluate_overdue(
            Some(date(2024, 1, 1)),
            OrderStatus::Pending,
            date(2024, 3, 20),
            &policy,
        );
        assert_eq!(result, OverdueStatus::Approaching { days_remaining: 12 });
        assert_eq!(overdue_threshold(date(2024, 1, 1), &policy), Some(date(2024, 4, 1)));
    }

    #[test]
    fn test_collected_is_exempt_even_when_late() {
        let policy = OverduePolicy::default();
        let result = evaluate_overdue(
            Some(date(2023, 1, 1)),
            OrderStatus::Collected,
            date(2024, 6, 1),
            &policy,
        );
        assert_eq!(result, OverdueStatus::Exempt);
        assert!(!result.shows_badge());
    }

    #[test]
    fn test_stored_status_does_not_mask_overdue() {
        let policy = OverduePolicy::default();
        for status in OrderStatus::ALL {
            if status == OrderStatus::Collected {
                continue;
            }
            let result = evaluate_overdue(Some(date(2024, 1, 1)), status, date(2024, 5, 1), &policy);
            assert!(result.is_overdue(), "{status} should evaluate overdue");
        }
    }

    #[test]
    fn test_threshold_day_is_normal() {
        let policy = OverduePolicy::default();
        let result = evaluate_overdue(
            Some(date(2024, 1, 1)),
            OrderStatus::Ready,
            date(2024, 4, 1),
            &policy,
        );
        assert_eq!(result, OverdueStatus::Normal { days_remaining: 0 });
        assert!(!result.shows_badge());
    }

    #[test]
    fn test_far_from_threshold_is_normal() {
        let policy = OverduePolicy::default();
        let result = evaluate_overdue(
            Some(date(2024, 1, 1)),
            OrderStatus::Pending,
            date(2024, 1, 2),
            &policy,
        );
        assert_eq!(result, OverdueStatus::Normal { days_remaining: 90 });
        assert_eq!(result.days_remaining(), Some(90));
    }

    #[test]
    fn test_missing_date_is_indeterminate() {
        let policy = OverduePolicy::default();
        let result = evaluate_overdue(None, OrderStatus::Pending, date(2024, 1, 1), &policy);
        assert_eq!(result, OverdueStatus::Indeterminate);
        assert_eq!(result.days_remaining(), None);
    }

    #[test]
    fn test_month_end_clamps() {
        let policy = OverduePolicy::default();
        assert_eq!(overdue_threshold(date(2023, 11, 30), &policy), Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_parse_collection_date() {
        assert_eq!(parse_collection_date("2024-01-01"), Some(date(2024, 1, 1)));
        assert_eq!(parse_collection_date("2024-01-01T10:30:00+03:00"), Some(date(2024, 1, 1)));
        assert_eq!(parse_collection_date("next tuesday"), None);
        assert_eq!(parse_collection_date(""), None);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(OverdueStatus::Approaching { days_remaining: 5 }).unwrap();
        assert_eq!(json, serde_json::json!({"state": "approaching", "days_remaining": 5}));
    }
}
