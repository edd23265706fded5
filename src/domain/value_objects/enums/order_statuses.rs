use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Order lifecycle status. Terminal states never transition again.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    PendingVerification,
    Confirmed,
    Active,
    Failed,
    Cancelled,
    Expired,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::PendingVerification => "pending_verification",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Active => "active",
            OrderStatus::Failed => "failed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Expired => "expired",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(OrderStatus::Pending),
            "pending_verification" => Some(OrderStatus::PendingVerification),
            "confirmed" => Some(OrderStatus::Confirmed),
            "active" => Some(OrderStatus::Active),
            "failed" => Some(OrderStatus::Failed),
            "cancelled" => Some(OrderStatus::Cancelled),
            "expired" => Some(OrderStatus::Expired),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Failed | OrderStatus::Cancelled | OrderStatus::Expired
        )
    }

    /// Legal transitions of the order state machine. Re-setting the current
    /// status is allowed so idempotent updates (proof resubmission) stay valid.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if *self == next {
            return true;
        }

        match self {
            OrderStatus::Pending => matches!(
                next,
                OrderStatus::PendingVerification | OrderStatus::Cancelled | OrderStatus::Failed
            ),
            OrderStatus::PendingVerification => matches!(
                next,
                OrderStatus::Confirmed | OrderStatus::Cancelled | OrderStatus::Failed
            ),
            OrderStatus::Confirmed => matches!(
                next,
                OrderStatus::Active | OrderStatus::Expired | OrderStatus::Failed
            ),
            OrderStatus::Active => matches!(next, OrderStatus::Expired | OrderStatus::Failed),
            OrderStatus::Failed | OrderStatus::Cancelled | OrderStatus::Expired => false,
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_moves_forward_to_verification_only() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::PendingVerification));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Failed));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Expired));
    }

    #[test]
    fn verification_confirms_or_aborts() {
        assert!(OrderStatus::PendingVerification.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::PendingVerification.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::PendingVerification.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn terminal_states_never_transition() {
        for terminal in [
            OrderStatus::Failed,
            OrderStatus::Cancelled,
            OrderStatus::Expired,
        ] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition_to(OrderStatus::Pending));
            assert!(!terminal.can_transition_to(OrderStatus::Confirmed));
        }
    }

    #[test]
    fn resetting_current_status_is_legal() {
        assert!(
            OrderStatus::PendingVerification.can_transition_to(OrderStatus::PendingVerification)
        );
    }

    #[test]
    fn round_trips_through_strings() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::PendingVerification,
            OrderStatus::Confirmed,
            OrderStatus::Active,
            OrderStatus::Failed,
            OrderStatus::Cancelled,
            OrderStatus::Expired,
        ] {
            assert_eq!(OrderStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::from_str("refunded"), None);
    }
}
