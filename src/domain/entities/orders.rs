use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::orders;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = orders)]
pub struct OrderEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: String,
    pub plan_details: Value,
    pub address: String,
    pub confirm_address: String,
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

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub struct InsertOrderEntity {
    pub user_id: Uuid,
    pub plan: String,
    pub plan_details: Value,
    pub address: String,
    pub confirm_address: String,
    pub city: Option<String>,
    pub mobile_number: String,
    pub alternate_number: Option<String>,
    pub payment_method: String,
    pub payment_verified: bool,
    pub subscription_starts_at: DateTime<Utc>,
    pub subscription_ends_at: DateTime<Utc>,
    pub status: String,
}
