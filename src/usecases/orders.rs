use std::sync::Arc;

use anyhow::anyhow;
use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::orders::InsertOrderEntity,
    repositories::orders::OrderRepository,
    value_objects::{
        enums::{order_statuses::OrderStatus, payment_methods::PaymentMethod},
        orders::{
            ActiveSubscriptionConflict, CreateOrderModel, OrderListFilter, OrderListModel,
            OrderModel,
        },
    },
};
use crate::usecases::subscription_period::{compute_fresh_period, compute_renewal_period};

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("an active subscription already exists")]
    Conflict(ActiveSubscriptionConflict),
    #[error("{0} not found")]
    NotFound(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("confirmation notification failed: {0}")]
    Notification(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl OrderError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            OrderError::Validation(_) | OrderError::Conflict(_) => StatusCode::BAD_REQUEST,
            OrderError::NotFound(_) => StatusCode::NOT_FOUND,
            OrderError::Forbidden(_) => StatusCode::FORBIDDEN,
            OrderError::Notification(_) | OrderError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub type OrderResult<T> = std::result::Result<T, OrderError>;

pub struct OrderUseCase<O>
where
    O: OrderRepository + Send + Sync + 'static,
{
    order_repo: Arc<O>,
}

impl<O> OrderUseCase<O>
where
    O: OrderRepository + Send + Sync + 'static,
{
    pub fn new(order_repo: Arc<O>) -> Self {
        Self { order_repo }
    }

    pub async fn create_order(
        &self,
        user_id: Uuid,
        create_order_model: CreateOrderModel,
    ) -> OrderResult<OrderModel> {
        info!(
            %user_id,
            plan = %create_order_model.plan,
            payment_method = %create_order_model.payment_method,
            "orders: create order requested"
        );

        require_non_empty(user_id, "plan", &create_order_model.plan)?;
        require_non_empty(user_id, "address", &create_order_model.address)?;
        require_non_empty(user_id, "confirmAddress", &create_order_model.confirm_address)?;
        require_non_empty(user_id, "mobileNumber", &create_order_model.mobile_number)?;

        let plan_details = create_order_model.plan_details.as_ref().ok_or_else(|| {
            let err = OrderError::Validation("planDetails is required".to_string());
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                "orders: missing plan details"
            );
            err
        })?;

        if create_order_model.address != create_order_model.confirm_address {
            let err =
                OrderError::Validation("address and confirmAddress do not match".to_string());
            warn!(
                %user_id,
                status = err.status_code().as_u16(),
                "orders: address confirmation mismatch"
            );
            return Err(err);
        }

        // Check-then-act: the read and the insert below are deliberately not
        // wrapped in a transaction, matching the admin-mediated traffic this
        // system sees.
        let now = Utc::now();
        if let Some(existing) = self
            .order_repo
            .find_active_subscription(user_id, now)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    db_error = ?err,
                    "orders: failed to check for active subscription"
                );
                OrderError::Internal(err)
            })?
        {
            let days_remaining = (existing.subscription_ends_at - now).num_days();
            let conflict = ActiveSubscriptionConflict {
                order_id: existing.id,
                plan: existing.plan.clone(),
                subscription_ends_at: existing.subscription_ends_at,
                days_remaining,
                suggestion: format!(
                    "Your {} plan is active until {}. A new order can be placed once it expires.",
                    existing.plan,
                    existing.subscription_ends_at.format("%d %B %Y")
                ),
            };
            let err = OrderError::Conflict(conflict);
            warn!(
                %user_id,
                existing_order_id = %existing.id,
                days_remaining,
                status = err.status_code().as_u16(),
                "orders: active subscription already exists"
            );
            return Err(err);
        }

        let period = match self
            .order_repo
            .find_latest_expired(user_id, now)
            .await
            .map_err(|err| {
                error!(
                    %user_id,
                    db_error = ?err,
                    "orders: failed to look up prior expired order"
                );
                OrderError::Internal(err)
            })? {
            Some(prior) => {
                info!(
                    %user_id,
                    prior_order_id = %prior.id,
                    prior_ends_at = %prior.subscription_ends_at,
                    "orders: renewing from prior expired order"
                );
                compute_renewal_period(prior.subscription_ends_at, now)?
            }
            None => compute_fresh_period(now)?,
        };

        // Cash on delivery skips the proof step entirely.
        let initial_status = match create_order_model.payment_method {
            PaymentMethod::CashOnDelivery => OrderStatus::Confirmed,
            PaymentMethod::Online => OrderStatus::Pending,
        };

        let insert_order_entity = InsertOrderEntity {
            user_id,
            plan: create_order_model.plan,
            plan_details: serde_json::to_value(plan_details)
                .map_err(|err| OrderError::Internal(err.into()))?,
            address: create_order_model.address,
            confirm_address: create_order_model.confirm_address,
            city: create_order_model.city,
            mobile_number: create_order_model.mobile_number,
            alternate_number: create_order_model.alternate_number,
            payment_method: create_order_model.payment_method.to_string(),
            payment_verified: false,
            subscription_starts_at: period.starts_at,
            subscription_ends_at: period.ends_at,
            status: initial_status.to_string(),
        };

        let order = self
            .order_repo
            .create(insert_order_entity)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "orders: failed to persist order");
                OrderError::Internal(err)
            })?;

        info!(
            %user_id,
            order_id = %order.id,
            order_status = %order.status,
            subscription_ends_at = %order.subscription_ends_at,
            "orders: order created"
        );

        Ok(OrderModel::from(order))
    }

    pub async fn get_order(&self, order_id: Uuid) -> OrderResult<OrderModel> {
        let order = self
            .order_repo
            .find_by_id(order_id)
            .await
            .map_err(|err| {
                error!(%order_id, db_error = ?err, "orders: failed to load order");
                OrderError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = OrderError::NotFound("order".to_string());
                warn!(
                    %order_id,
                    status = err.status_code().as_u16(),
                    "orders: order not found"
                );
                err
            })?;

        Ok(OrderModel::from(order))
    }

    pub async fn list_orders(&self, filter: OrderListFilter) -> OrderResult<OrderListModel> {
        let page = filter.page;
        let limit = filter.limit;

        let (orders, total) = self.order_repo.list(filter).await.map_err(|err| {
            error!(db_error = ?err, "orders: failed to list orders");
            OrderError::Internal(err)
        })?;

        info!(total, page, limit, "orders: listed orders");

        Ok(OrderListModel {
            orders: orders.into_iter().map(OrderModel::from).collect(),
            total,
            page,
            limit,
        })
    }

    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> OrderResult<OrderModel> {
        let order = self
            .order_repo
            .find_by_id(order_id)
            .await
            .map_err(|err| {
                error!(%order_id, db_error = ?err, "orders: failed to load order for status update");
                OrderError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = OrderError::NotFound("order".to_string());
                warn!(
                    %order_id,
                    status = err.status_code().as_u16(),
                    "orders: order not found for status update"
                );
                err
            })?;

        let current_status = OrderStatus::from_str(&order.status).ok_or_else(|| {
            OrderError::Internal(anyhow!(
                "order {} carries unknown status {}",
                order.id,
                order.status
            ))
        })?;

        if !current_status.can_transition_to(new_status) {
            let err = OrderError::Validation(format!(
                "illegal status transition: {} -> {}",
                current_status, new_status
            ));
            warn!(
                %order_id,
                current_status = %current_status,
                new_status = %new_status,
                status = err.status_code().as_u16(),
                "orders: rejected status transition"
            );
            return Err(err);
        }

        let updated = self
            .order_repo
            .update_status(order_id, new_status)
            .await
            .map_err(|err| {
                error!(%order_id, db_error = ?err, "orders: failed to update status");
                OrderError::Internal(err)
            })?;

        info!(%order_id, new_status = %new_status, "orders: status updated");

        Ok(OrderModel::from(updated))
    }

    pub async fn expire_lapsed_orders(&self) -> OrderResult<usize> {
        let now = Utc::now();
        let swept = self
            .order_repo
            .expire_lapsed_orders(now)
            .await
            .map_err(|err| {
                error!(db_error = ?err, "orders: expiry sweep failed");
                OrderError::Internal(err)
            })?;

        info!(swept, "orders: expiry sweep completed");
        Ok(swept)
    }
}

fn require_non_empty(user_id: Uuid, field: &'static str, value: &str) -> OrderResult<()> {
    if value.trim().is_empty() {
        let err = OrderError::Validation(format!("{} is required", field));
        warn!(
            %user_id,
            field,
            status = err.status_code().as_u16(),
            "orders: missing required field"
        );
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entities::orders::OrderEntity, repositories::orders::MockOrderRepository,
        value_objects::orders::PlanSnapshotModel,
    };
    use chrono::{Duration, Utc};
    use mockall::predicate::eq;

    fn sample_create_model(payment_method: PaymentMethod) -> CreateOrderModel {
        CreateOrderModel {
            plan: "Weight Loss Pro".to_string(),
            address: "123 Main St".to_string(),
            confirm_address: "123 Main St".to_string(),
            city: Some("Pune".to_string()),
            mobile_number: "9876543210".to_string(),
            alternate_number: None,
            payment_method,
            plan_details: Some(PlanSnapshotModel {
                price_minor: 149900,
                billing_cycle: "monthly".to_string(),
                features: vec!["diet chart".to_string(), "weekly call".to_string()],
            }),
        }
    }

    fn persisted(insert: InsertOrderEntity) -> OrderEntity {
        let now = Utc::now();
        OrderEntity {
            id: Uuid::new_v4(),
            user_id: insert.user_id,
            plan: insert.plan,
            plan_details: insert.plan_details,
            address: insert.address,
            confirm_address: insert.confirm_address,
            city: insert.city,
            mobile_number: insert.mobile_number,
            alternate_number: insert.alternate_number,
            payment_method: insert.payment_method,
            utr_number: None,
            payment_screenshot_url: None,
            payment_verified: insert.payment_verified,
            subscription_starts_at: insert.subscription_starts_at,
            subscription_ends_at: insert.subscription_ends_at,
            status: insert.status,
            created_at: now,
            updated_at: now,
        }
    }

    fn active_order(user_id: Uuid) -> OrderEntity {
        let now = Utc::now();
        OrderEntity {
            id: Uuid::new_v4(),
            user_id,
            plan: "Weight Loss Pro".to_string(),
            plan_details: serde_json::json!({"priceMinor": 149900}),
            address: "123 Main St".to_string(),
            confirm_address: "123 Main St".to_string(),
            city: None,
            mobile_number: "9876543210".to_string(),
            alternate_number: None,
            payment_method: "online".to_string(),
            utr_number: None,
            payment_screenshot_url: None,
            payment_verified: true,
            subscription_starts_at: now - Duration::days(10),
            subscription_ends_at: now + Duration::days(20),
            status: OrderStatus::Confirmed.to_string(),
            created_at: now - Duration::days(10),
            updated_at: now - Duration::days(10),
        }
    }

    #[tokio::test]
    async fn create_order_rejects_missing_mobile_number() {
        let order_repo = MockOrderRepository::new();
        let usecase = OrderUseCase::new(Arc::new(order_repo));

        let mut model = sample_create_model(PaymentMethod::Online);
        model.mobile_number = " ".to_string();

        let err = usecase
            .create_order(Uuid::new_v4(), model)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[tokio::test]
    async fn create_order_rejects_address_mismatch() {
        let order_repo = MockOrderRepository::new();
        let usecase = OrderUseCase::new(Arc::new(order_repo));

        let mut model = sample_create_model(PaymentMethod::Online);
        model.confirm_address = "123 Main".to_string();

        let err = usecase
            .create_order(Uuid::new_v4(), model)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[tokio::test]
    async fn create_order_reports_existing_active_subscription() {
        let user_id = Uuid::new_v4();
        let existing = active_order(user_id);
        let existing_id = existing.id;

        let mut order_repo = MockOrderRepository::new();
        order_repo
            .expect_find_active_subscription()
            .returning(move |_, _| {
                let existing = existing.clone();
                Box::pin(async move { Ok(Some(existing)) })
            });

        let usecase = OrderUseCase::new(Arc::new(order_repo));
        let err = usecase
            .create_order(user_id, sample_create_model(PaymentMethod::Online))
            .await
            .unwrap_err();

        match err {
            OrderError::Conflict(conflict) => {
                assert_eq!(conflict.order_id, existing_id);
                assert_eq!(conflict.plan, "Weight Loss Pro");
                assert!(conflict.days_remaining >= 19 && conflict.days_remaining <= 20);
                assert!(!conflict.suggestion.is_empty());
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn online_order_starts_pending() {
        let user_id = Uuid::new_v4();

        let mut order_repo = MockOrderRepository::new();
        order_repo
            .expect_find_active_subscription()
            .returning(|_, _| Box::pin(async { Ok(None) }));
        order_repo
            .expect_find_latest_expired()
            .returning(|_, _| Box::pin(async { Ok(None) }));
        order_repo
            .expect_create()
            .withf(|insert| {
                insert.status == "pending"
                    && !insert.payment_verified
                    && insert.subscription_ends_at > insert.subscription_starts_at
            })
            .returning(|insert| Box::pin(async move { Ok(persisted(insert)) }));

        let usecase = OrderUseCase::new(Arc::new(order_repo));
        let order = usecase
            .create_order(user_id, sample_create_model(PaymentMethod::Online))
            .await
            .unwrap();

        assert_eq!(order.status, "pending");
        assert_eq!(order.payment_method, "online");
    }

    #[tokio::test]
    async fn cash_on_delivery_order_confirms_immediately() {
        let user_id = Uuid::new_v4();

        let mut order_repo = MockOrderRepository::new();
        order_repo
            .expect_find_active_subscription()
            .returning(|_, _| Box::pin(async { Ok(None) }));
        order_repo
            .expect_find_latest_expired()
            .returning(|_, _| Box::pin(async { Ok(None) }));
        order_repo
            .expect_create()
            .withf(|insert| insert.status == "confirmed")
            .returning(|insert| Box::pin(async move { Ok(persisted(insert)) }));

        let usecase = OrderUseCase::new(Arc::new(order_repo));
        let order = usecase
            .create_order(user_id, sample_create_model(PaymentMethod::CashOnDelivery))
            .await
            .unwrap();

        assert_eq!(order.status, "confirmed");
    }

    #[tokio::test]
    async fn renewal_continues_from_prior_expired_order() {
        let user_id = Uuid::new_v4();
        let mut prior = active_order(user_id);
        prior.status = OrderStatus::Expired.to_string();
        prior.subscription_ends_at = Utc::now() - Duration::days(3);

        let mut order_repo = MockOrderRepository::new();
        order_repo
            .expect_find_active_subscription()
            .returning(|_, _| Box::pin(async { Ok(None) }));
        order_repo
            .expect_find_latest_expired()
            .returning(move |_, _| {
                let prior = prior.clone();
                Box::pin(async move { Ok(Some(prior)) })
            });
        order_repo
            .expect_create()
            .withf(|insert| {
                // Prior term already lapsed: the new one restarts from now.
                let age = Utc::now() - insert.subscription_starts_at;
                age.num_seconds() < 5 && insert.subscription_ends_at > insert.subscription_starts_at
            })
            .returning(|insert| Box::pin(async move { Ok(persisted(insert)) }));

        let usecase = OrderUseCase::new(Arc::new(order_repo));
        usecase
            .create_order(user_id, sample_create_model(PaymentMethod::Online))
            .await
            .unwrap();
    }

    // Documents the check-then-act gap: two creates racing past the same
    // empty snapshot both commit at this layer.
    #[tokio::test]
    async fn concurrent_creates_both_pass_an_empty_snapshot() {
        let user_id = Uuid::new_v4();

        let mut order_repo = MockOrderRepository::new();
        order_repo
            .expect_find_active_subscription()
            .times(2)
            .returning(|_, _| Box::pin(async { Ok(None) }));
        order_repo
            .expect_find_latest_expired()
            .times(2)
            .returning(|_, _| Box::pin(async { Ok(None) }));
        order_repo
            .expect_create()
            .times(2)
            .returning(|insert| Box::pin(async move { Ok(persisted(insert)) }));

        let usecase = OrderUseCase::new(Arc::new(order_repo));
        let first = usecase
            .create_order(user_id, sample_create_model(PaymentMethod::Online))
            .await;
        let second = usecase
            .create_order(user_id, sample_create_model(PaymentMethod::Online))
            .await;

        assert!(first.is_ok());
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn update_status_rejects_illegal_transition() {
        let mut expired = active_order(Uuid::new_v4());
        expired.status = OrderStatus::Expired.to_string();
        let order_id = expired.id;

        let mut order_repo = MockOrderRepository::new();
        order_repo
            .expect_find_by_id()
            .with(eq(order_id))
            .returning(move |_| {
                let expired = expired.clone();
                Box::pin(async move { Ok(Some(expired)) })
            });

        let usecase = OrderUseCase::new(Arc::new(order_repo));
        let err = usecase
            .update_status(order_id, OrderStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[tokio::test]
    async fn update_status_applies_legal_transition() {
        let mut pending = active_order(Uuid::new_v4());
        pending.status = OrderStatus::Pending.to_string();
        let order_id = pending.id;

        let mut order_repo = MockOrderRepository::new();
        order_repo.expect_find_by_id().returning(move |_| {
            let pending = pending.clone();
            Box::pin(async move { Ok(Some(pending)) })
        });
        order_repo
            .expect_update_status()
            .with(eq(order_id), eq(OrderStatus::Cancelled))
            .returning(|order_id, status| {
                Box::pin(async move {
                    let mut order = active_order(Uuid::new_v4());
                    order.id = order_id;
                    order.status = status.to_string();
                    Ok(order)
                })
            });

        let usecase = OrderUseCase::new(Arc::new(order_repo));
        let updated = usecase
            .update_status(order_id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(updated.status, "cancelled");
    }

    #[tokio::test]
    async fn update_status_unknown_order_is_not_found() {
        let mut order_repo = MockOrderRepository::new();
        order_repo
            .expect_find_by_id()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = OrderUseCase::new(Arc::new(order_repo));
        let err = usecase
            .update_status(Uuid::new_v4(), OrderStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::NotFound(_)));
    }

    #[tokio::test]
    async fn expiry_sweep_reports_swept_count() {
        let mut order_repo = MockOrderRepository::new();
        order_repo
            .expect_expire_lapsed_orders()
            .returning(|_| Box::pin(async { Ok(3) }));

        let usecase = OrderUseCase::new(Arc::new(order_repo));
        assert_eq!(usecase.expire_lapsed_orders().await.unwrap(), 3);
    }
}
