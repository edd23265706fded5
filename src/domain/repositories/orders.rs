use anyhow::Result;
use axum::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::orders::{InsertOrderEntity, OrderEntity};
use crate::domain::value_objects::{enums::order_statuses::OrderStatus, orders::OrderListFilter};

#[async_trait]
#[automock]
pub trait OrderRepository {
    async fn create(&self, insert_order_entity: InsertOrderEntity) -> Result<OrderEntity>;

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<OrderEntity>>;

    /// Order holding the single-active-subscription slot: status confirmed or
    /// active with a subscription end still in the future.
    async fn find_active_subscription(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<OrderEntity>>;

    /// Most recent expired order whose subscription end has already passed,
    /// used as the renewal anchor.
    async fn find_latest_expired(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<OrderEntity>>;

    async fn list(&self, filter: OrderListFilter) -> Result<(Vec<OrderEntity>, i64)>;

    async fn update_status(&self, order_id: Uuid, status: OrderStatus) -> Result<OrderEntity>;

    async fn attach_payment_proof(
        &self,
        order_id: Uuid,
        utr_number: String,
        screenshot_url: String,
    ) -> Result<OrderEntity>;

    async fn mark_payment_verified(&self, order_id: Uuid) -> Result<OrderEntity>;

    /// Moves every confirmed/active order past its subscription end to
    /// expired; returns the number of rows swept.
    async fn expire_lapsed_orders(&self, now: DateTime<Utc>) -> Result<usize>;
}
