use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Closed payment method set. The storefront sends the human-readable labels
/// ("Cash On Delivery", "Online"), the database stores the snake_case form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub enum PaymentMethod {
    CashOnDelivery,
    Online,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
            PaymentMethod::Online => "online",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "cash on delivery" | "cash_on_delivery" => Some(PaymentMethod::CashOnDelivery),
            "online" => Some(PaymentMethod::Online),
            _ => None,
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for PaymentMethod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PaymentMethod::from_str(&value)
            .ok_or_else(|| format!("unknown payment method: {}", value))
    }
}

impl From<PaymentMethod> for String {
    fn from(value: PaymentMethod) -> Self {
        value.as_str().to_string()
    }
}
