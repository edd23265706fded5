use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::{orders::OrderEntity, users::UserEntity},
    repositories::{
        mailer::{MailError, MailTransport},
        orders::OrderRepository,
        users::UserRepository,
    },
    value_objects::{
        enums::order_statuses::OrderStatus,
        orders::{OrderModel, PlanSnapshotModel},
    },
};
use crate::usecases::{
    orders::{OrderError, OrderResult},
    subscription_period::{compute_fresh_period, SubscriptionPeriod},
};

const MAIL_RETRY_DELAY: Duration = Duration::from_secs(2);

pub struct SubscriptionConfirmationUseCase<O, U, M>
where
    O: OrderRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    M: MailTransport + Send + Sync + 'static,
{
    order_repo: Arc<O>,
    user_repo: Arc<U>,
    mail_transport: Arc<M>,
}

impl<O, U, M> SubscriptionConfirmationUseCase<O, U, M>
where
    O: OrderRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    M: MailTransport + Send + Sync + 'static,
{
    pub fn new(order_repo: Arc<O>, user_repo: Arc<U>, mail_transport: Arc<M>) -> Self {
        Self {
            order_repo,
            user_repo,
            mail_transport,
        }
    }

    /// Admin-side gate: marks the payment as received, confirms the order and
    /// chains into the confirmation notification. The status change commits
    /// before the email is attempted and is never rolled back.
    pub async fn verify_payment(&self, order_id: Uuid) -> OrderResult<OrderModel> {
        info!(%order_id, "subscription: payment verification requested");

        let order = self
            .order_repo
            .find_by_id(order_id)
            .await
            .map_err(|err| {
                error!(%order_id, db_error = ?err, "subscription: failed to load order");
                OrderError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = OrderError::NotFound("order".to_string());
                warn!(
                    %order_id,
                    status = err.status_code().as_u16(),
                    "subscription: order not found for verification"
                );
                err
            })?;

        if OrderStatus::from_str(&order.status).is_some_and(|status| status.is_terminal()) {
            let err = OrderError::Validation(format!(
                "order in status {} cannot be confirmed",
                order.status
            ));
            warn!(
                %order_id,
                order_status = %order.status,
                status = err.status_code().as_u16(),
                "subscription: refusing to confirm terminal order"
            );
            return Err(err);
        }

        self.order_repo
            .mark_payment_verified(order_id)
            .await
            .map_err(|err| {
                error!(%order_id, db_error = ?err, "subscription: failed to mark payment verified");
                OrderError::Internal(err)
            })?;

        info!(%order_id, "subscription: payment verified, order confirmed");

        self.confirm_subscription(order_id).await
    }

    /// Sends the confirmation email. The window in the email body is
    /// re-derived from the current moment rather than read from the stored
    /// order dates, matching the storefront's historical behavior; the stored
    /// window stays authoritative for conflict checks and the expiry sweep.
    pub async fn confirm_subscription(&self, order_id: Uuid) -> OrderResult<OrderModel> {
        let order = self
            .order_repo
            .find_by_id(order_id)
            .await
            .map_err(|err| {
                error!(%order_id, db_error = ?err, "subscription: failed to load order");
                OrderError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = OrderError::NotFound("order".to_string());
                warn!(
                    %order_id,
                    status = err.status_code().as_u16(),
                    "subscription: order not found for confirmation"
                );
                err
            })?;

        let user = self
            .user_repo
            .find_by_id(order.user_id)
            .await
            .map_err(|err| {
                error!(
                    %order_id,
                    user_id = %order.user_id,
                    db_error = ?err,
                    "subscription: failed to load order owner"
                );
                OrderError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = OrderError::NotFound("order owner".to_string());
                warn!(
                    %order_id,
                    user_id = %order.user_id,
                    status = err.status_code().as_u16(),
                    "subscription: order owner not found"
                );
                err
            })?;

        let period = compute_fresh_period(Utc::now())?;
        let subject = format!("HealthFit subscription confirmed - order {}", order.id);
        let body = build_confirmation_body(&order, &user, period);

        self.send_with_retry(user.email.clone(), subject, body)
            .await?;

        info!(
            %order_id,
            recipient = %user.email,
            "subscription: confirmation email sent"
        );

        Ok(OrderModel::from(order))
    }

    /// Timeout-class failures get one retry after a fixed delay; anything
    /// else fails straight away. Failures surface as a non-fatal
    /// notification error.
    async fn send_with_retry(&self, to: String, subject: String, body: String) -> OrderResult<()> {
        match self
            .mail_transport
            .send_mail(to.clone(), subject.clone(), body.clone())
            .await
        {
            Ok(()) => Ok(()),
            Err(MailError::Timeout) => {
                warn!(recipient = %to, "subscription: confirmation email timed out, retrying once");
                tokio::time::sleep(MAIL_RETRY_DELAY).await;
                self.mail_transport
                    .send_mail(to.clone(), subject, body)
                    .await
                    .map_err(|err| {
                        error!(
                            recipient = %to,
                            error = %err,
                            "subscription: confirmation email failed after retry"
                        );
                        OrderError::Notification(err.to_string())
                    })
            }
            Err(err) => {
                error!(
                    recipient = %to,
                    error = %err,
                    "subscription: confirmation email failed"
                );
                Err(OrderError::Notification(err.to_string()))
            }
        }
    }
}

fn build_confirmation_body(
    order: &OrderEntity,
    user: &UserEntity,
    period: SubscriptionPeriod,
) -> String {
    let price_minor = serde_json::from_value::<PlanSnapshotModel>(order.plan_details.clone())
        .map(|details| details.price_minor)
        .unwrap_or_default();
    let days_remaining = (period.ends_at - period.starts_at).num_days();

    format!(
        "Hello {},\n\n\
         Your HealthFit subscription is confirmed.\n\n\
         Order: {}\n\
         Plan: {}\n\
         Price: INR {:.2}\n\
         Starts: {}\n\
         Ends: {}\n\
         Days remaining: {}\n\n\
         Delivery to: {}{}\n\
         Contact: {}\n\n\
         Thank you for choosing HealthFit!",
        user.full_name,
        order.id,
        order.plan,
        price_minor as f64 / 100.0,
        period.starts_at.format("%d %B %Y"),
        period.ends_at.format("%d %B %Y"),
        days_remaining,
        order.address,
        order
            .city
            .as_deref()
            .map(|city| format!(", {}", city))
            .unwrap_or_default(),
        order.mobile_number,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{
        mailer::MockMailTransport, orders::MockOrderRepository, users::MockUserRepository,
    };
    use anyhow::anyhow;
    use chrono::Duration as ChronoDuration;
    use mockall::predicate::eq;

    fn confirmed_order(owner_id: Uuid) -> OrderEntity {
        let now = Utc::now();
        OrderEntity {
            id: Uuid::new_v4(),
            user_id: owner_id,
            plan: "Weight Loss Pro".to_string(),
            plan_details: serde_json::json!({
                "priceMinor": 149900,
                "billingCycle": "monthly",
                "features": ["diet chart"],
            }),
            address: "123 Main St".to_string(),
            confirm_address: "123 Main St".to_string(),
            city: Some("Pune".to_string()),
            mobile_number: "9876543210".to_string(),
            alternate_number: None,
            payment_method: "online".to_string(),
            utr_number: Some("UTR123".to_string()),
            payment_screenshot_url: Some("https://storage.example/proof.png".to_string()),
            payment_verified: true,
            subscription_starts_at: now,
            subscription_ends_at: now + ChronoDuration::days(30),
            status: OrderStatus::Confirmed.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn owner(user_id: Uuid) -> UserEntity {
        let now = Utc::now();
        UserEntity {
            id: user_id,
            email: "customer@example.com".to_string(),
            full_name: "Asha Kumar".to_string(),
            mobile_number: Some("9876543210".to_string()),
            status: "active".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let mut order_repo = MockOrderRepository::new();
        order_repo
            .expect_find_by_id()
            .returning(|_| Box::pin(async { Ok(None) }));

        let usecase = SubscriptionConfirmationUseCase::new(
            Arc::new(order_repo),
            Arc::new(MockUserRepository::new()),
            Arc::new(MockMailTransport::new()),
        );

        let err = usecase.verify_payment(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, OrderError::NotFound(_)));
    }

    #[tokio::test]
    async fn terminal_order_cannot_be_verified() {
        let mut order = confirmed_order(Uuid::new_v4());
        order.status = OrderStatus::Cancelled.to_string();
        let order_id = order.id;

        let mut order_repo = MockOrderRepository::new();
        order_repo.expect_find_by_id().returning(move |_| {
            let order = order.clone();
            Box::pin(async move { Ok(Some(order)) })
        });

        let usecase = SubscriptionConfirmationUseCase::new(
            Arc::new(order_repo),
            Arc::new(MockUserRepository::new()),
            Arc::new(MockMailTransport::new()),
        );

        let err = usecase.verify_payment(order_id).await.unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[tokio::test]
    async fn verification_confirms_and_emails_the_owner() {
        let user_id = Uuid::new_v4();
        let order = confirmed_order(user_id);
        let order_id = order.id;

        let mut order_repo = MockOrderRepository::new();
        {
            let order = order.clone();
            order_repo.expect_find_by_id().returning(move |_| {
                let order = order.clone();
                Box::pin(async move { Ok(Some(order)) })
            });
        }
        order_repo
            .expect_mark_payment_verified()
            .with(eq(order_id))
            .times(1)
            .returning(move |_| {
                let order = order.clone();
                Box::pin(async move { Ok(order) })
            });

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_id()
            .with(eq(user_id))
            .returning(move |id| Box::pin(async move { Ok(Some(owner(id))) }));

        let mut mail_transport = MockMailTransport::new();
        mail_transport
            .expect_send_mail()
            .withf(|to, subject, body| {
                to == "customer@example.com"
                    && subject.contains("subscription confirmed")
                    && body.contains("Weight Loss Pro")
                    && body.contains("INR 1499.00")
            })
            .times(1)
            .returning(|_, _, _| Box::pin(async { Ok(()) }));

        let usecase = SubscriptionConfirmationUseCase::new(
            Arc::new(order_repo),
            Arc::new(user_repo),
            Arc::new(mail_transport),
        );

        let confirmed = usecase.verify_payment(order_id).await.unwrap();
        assert_eq!(confirmed.status, "confirmed");
        assert!(confirmed.payment_verified);
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_email_is_retried_once() {
        let user_id = Uuid::new_v4();
        let order = confirmed_order(user_id);
        let order_id = order.id;

        let mut order_repo = MockOrderRepository::new();
        order_repo.expect_find_by_id().returning(move |_| {
            let order = order.clone();
            Box::pin(async move { Ok(Some(order)) })
        });

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_id()
            .returning(move |id| Box::pin(async move { Ok(Some(owner(id))) }));

        let mut attempts = 0;
        let mut mail_transport = MockMailTransport::new();
        mail_transport
            .expect_send_mail()
            .times(2)
            .returning(move |_, _, _| {
                attempts += 1;
                if attempts == 1 {
                    Box::pin(async { Err(MailError::Timeout) })
                } else {
                    Box::pin(async { Ok(()) })
                }
            });

        let usecase = SubscriptionConfirmationUseCase::new(
            Arc::new(order_repo),
            Arc::new(user_repo),
            Arc::new(mail_transport),
        );

        usecase.confirm_subscription(order_id).await.unwrap();
    }

    #[tokio::test]
    async fn email_failure_is_non_fatal_notification_error() {
        let user_id = Uuid::new_v4();
        let order = confirmed_order(user_id);
        let order_id = order.id;

        let mut order_repo = MockOrderRepository::new();
        {
            let order = order.clone();
            order_repo.expect_find_by_id().returning(move |_| {
                let order = order.clone();
                Box::pin(async move { Ok(Some(order)) })
            });
        }
        // The status change must commit even though the email will fail.
        order_repo
            .expect_mark_payment_verified()
            .times(1)
            .returning(move |_| {
                let order = order.clone();
                Box::pin(async move { Ok(order) })
            });

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_id()
            .returning(move |id| Box::pin(async move { Ok(Some(owner(id))) }));

        let mut mail_transport = MockMailTransport::new();
        mail_transport.expect_send_mail().times(1).returning(|_, _, _| {
            Box::pin(async { Err(MailError::Transport(anyhow!("mailbox rejected"))) })
        });

        let usecase = SubscriptionConfirmationUseCase::new(
            Arc::new(order_repo),
            Arc::new(user_repo),
            Arc::new(mail_transport),
        );

        let err = usecase.verify_payment(order_id).await.unwrap_err();
        assert!(matches!(err, OrderError::Notification(_)));
    }
}
