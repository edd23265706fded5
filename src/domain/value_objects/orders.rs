use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::entities::orders::OrderEntity;
use crate::domain::value_objects::enums::{
    order_statuses::OrderStatus, payment_methods::PaymentMethod,
};

/// Plan details captured at order creation so later catalog changes never
/// retroactively affect existing orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanSnapshotModel {
    pub price_minor: i64,
    pub billing_cycle: String,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderModel {
    pub plan: String,
    pub address: String,
    pub confirm_address: String,
    #[serde(default)]
    pub city: Option<String>,
    pub mobile_number: String,
    // The storefront historically sends "alternetNumber".
    #[serde(default, alias = "alternetNumber")]
    pub alternate_number: Option<String>,
    pub payment_method: PaymentMethod,
    pub plan_details: Option<PlanSnapshotModel>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderModel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: String,
    pub plan_details: Value,
    pub address: String,
    pub city: Option<String>,
    pub mobile_number: String,
    pub alternate_number: Option<String>,
    pub payment_method: String,
    pub utr_number: Option<String>,
    pub payment_screenshot_url: Option<String>,
    pub payment_verified: bool,
    pub subscription_starts_at: DateTime<Utc>,
    pub subscription_ends_at: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderEntity> for OrderModel {
    fn from(entity: OrderEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            plan: entity.plan,
            plan_details: entity.plan_details,
            address: entity.address,
            city: entity.city,
            mobile_number: entity.mobile_number,
            alternate_number: entity.alternate_number,
            payment_method: entity.payment_method,
            utr_number: entity.utr_number,
            payment_screenshot_url: entity.payment_screenshot_url,
            payment_verified: entity.payment_verified,
            subscription_starts_at: entity.subscription_starts_at,
            subscription_ends_at: entity.subscription_ends_at,
            status: entity.status,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Structured detail for the single-active-subscription conflict so callers
/// can render a helpful message instead of a bare error string.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSubscriptionConflict {
    pub order_id: Uuid,
    pub plan: String,
    pub subscription_ends_at: DateTime<Utc>,
    pub days_remaining: i64,
    pub suggestion: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderListFilter {
    pub status: Option<OrderStatus>,
    pub user_id: Option<Uuid>,
    pub page: i64,
    pub limit: i64,
}

impl OrderListFilter {
    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0) * self.limit
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListModel {
    pub orders: Vec<OrderModel>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// Uploaded proof-of-payment artifact as received from the multipart form.
#[derive(Debug, Clone, PartialEq)]
pub struct ProofArtifactModel {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitProofModel {
    pub order_id: Uuid,
    pub utr_number: String,
    pub artifact: ProofArtifactModel,
}
