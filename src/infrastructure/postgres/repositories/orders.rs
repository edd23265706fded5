use std::sync::Arc;

use anyhow::Result;
use axum::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use uuid::Uuid;

use crate::domain::{
    entities::orders::{InsertOrderEntity, OrderEntity},
    repositories::orders::OrderRepository,
    value_objects::{enums::order_statuses::OrderStatus, orders::OrderListFilter},
};
use crate::infrastructure::postgres::{postgres_connection::PgPoolHandle, schema::orders};

pub struct OrderPostgres {
    db_pool: Arc<PgPoolHandle>,
}

impl OrderPostgres {
    pub fn new(db_pool: Arc<PgPoolHandle>) -> Self {
        Self { db_pool }
    }
}

fn active_statuses() -> [String; 2] {
    [
        OrderStatus::Confirmed.to_string(),
        OrderStatus::Active.to_string(),
    ]
}

#[async_trait]
impl OrderRepository for OrderPostgres {
    async fn create(&self, insert_order_entity: InsertOrderEntity) -> Result<OrderEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(orders::table)
            .values(&insert_order_entity)
            .returning(OrderEntity::as_returning())
            .get_result::<OrderEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<OrderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = orders::table
            .find(order_id)
            .select(OrderEntity::as_select())
            .first::<OrderEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_active_subscription(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<OrderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = orders::table
            .filter(orders::user_id.eq(user_id))
            .filter(orders::status.eq_any(active_statuses()))
            .filter(orders::subscription_ends_at.gt(now))
            .order(orders::subscription_ends_at.desc())
            .select(OrderEntity::as_select())
            .first::<OrderEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_latest_expired(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<OrderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = orders::table
            .filter(orders::user_id.eq(user_id))
            .filter(orders::status.eq(OrderStatus::Expired.to_string()))
            .filter(orders::subscription_ends_at.lt(now))
            .order(orders::subscription_ends_at.desc())
            .select(OrderEntity::as_select())
            .first::<OrderEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list(&self, filter: OrderListFilter) -> Result<(Vec<OrderEntity>, i64)> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut rows_query = orders::table.into_boxed();
        let mut count_query = orders::table.into_boxed();

        if let Some(status) = filter.status {
            rows_query = rows_query.filter(orders::status.eq(status.to_string()));
            count_query = count_query.filter(orders::status.eq(status.to_string()));
        }
        if let Some(user_id) = filter.user_id {
            rows_query = rows_query.filter(orders::user_id.eq(user_id));
            count_query = count_query.filter(orders::user_id.eq(user_id));
        }

        let total = count_query.count().get_result::<i64>(&mut conn)?;

        let rows = rows_query
            .order(orders::created_at.desc())
            .limit(filter.limit)
            .offset(filter.offset())
            .select(OrderEntity::as_select())
            .load::<OrderEntity>(&mut conn)?;

        Ok((rows, total))
    }

    async fn update_status(&self, order_id: Uuid, status: OrderStatus) -> Result<OrderEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(orders::table.find(order_id))
            .set((
                orders::status.eq(status.to_string()),
                orders::updated_at.eq(Utc::now()),
            ))
            .returning(OrderEntity::as_returning())
            .get_result::<OrderEntity>(&mut conn)?;

        Ok(result)
    }

    async fn attach_payment_proof(
        &self,
        order_id: Uuid,
        utr_number: String,
        screenshot_url: String,
    ) -> Result<OrderEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(orders::table.find(order_id))
            .set((
                orders::utr_number.eq(Some(utr_number)),
                orders::payment_screenshot_url.eq(Some(screenshot_url)),
                orders::status.eq(OrderStatus::PendingVerification.to_string()),
                orders::updated_at.eq(Utc::now()),
            ))
            .returning(OrderEntity::as_returning())
            .get_result::<OrderEntity>(&mut conn)?;

        Ok(result)
    }

    async fn mark_payment_verified(&self, order_id: Uuid) -> Result<OrderEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(orders::table.find(order_id))
            .set((
                orders::payment_verified.eq(true),
                orders::status.eq(OrderStatus::Confirmed.to_string()),
                orders::updated_at.eq(Utc::now()),
            ))
            .returning(OrderEntity::as_returning())
            .get_result::<OrderEntity>(&mut conn)?;

        Ok(result)
    }

    async fn expire_lapsed_orders(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let affected = update(
            orders::table
                .filter(orders::status.eq_any(active_statuses()))
                .filter(orders::subscription_ends_at.lt(now)),
        )
        .set((
            orders::status.eq(OrderStatus::Expired.to_string()),
            orders::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(affected)
    }
}
