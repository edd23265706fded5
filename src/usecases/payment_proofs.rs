use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    repositories::{orders::OrderRepository, storage::ProofStorageClient},
    value_objects::{
        enums::{order_statuses::OrderStatus, payment_methods::PaymentMethod},
        orders::{OrderModel, SubmitProofModel},
    },
};
use crate::usecases::orders::{OrderError, OrderResult};

pub struct PaymentProofUseCase<O, S>
where
    O: OrderRepository + Send + Sync + 'static,
    S: ProofStorageClient + Send + Sync + 'static,
{
    order_repo: Arc<O>,
    proof_storage: Arc<S>,
}

impl<O, S> PaymentProofUseCase<O, S>
where
    O: OrderRepository + Send + Sync + 'static,
    S: ProofStorageClient + Send + Sync + 'static,
{
    pub fn new(order_repo: Arc<O>, proof_storage: Arc<S>) -> Self {
        Self {
            order_repo,
            proof_storage,
        }
    }

    /// Attaches payment evidence to the order and advances it to
    /// pending_verification. Resubmission overwrites the prior proof and UTR.
    pub async fn submit_proof(
        &self,
        owner_id: Uuid,
        submit_proof_model: SubmitProofModel,
    ) -> OrderResult<OrderModel> {
        let order_id = submit_proof_model.order_id;
        info!(%owner_id, %order_id, "payments: proof submission received");

        if submit_proof_model.utr_number.trim().is_empty() {
            let err = OrderError::Validation("utrNumber is required".to_string());
            warn!(
                %owner_id,
                %order_id,
                status = err.status_code().as_u16(),
                "payments: missing utr number"
            );
            return Err(err);
        }

        if submit_proof_model.artifact.bytes.is_empty() {
            let err = OrderError::Validation("paymentScreenshot is required".to_string());
            warn!(
                %owner_id,
                %order_id,
                status = err.status_code().as_u16(),
                "payments: empty payment screenshot"
            );
            return Err(err);
        }

        let order = self
            .order_repo
            .find_by_id(order_id)
            .await
            .map_err(|err| {
                error!(%order_id, db_error = ?err, "payments: failed to load order");
                OrderError::Internal(err)
            })?
            .ok_or_else(|| {
                let err = OrderError::NotFound("order".to_string());
                warn!(
                    %order_id,
                    status = err.status_code().as_u16(),
                    "payments: order not found"
                );
                err
            })?;

        if order.user_id != owner_id {
            let err = OrderError::Forbidden("order belongs to another user".to_string());
            warn!(
                %owner_id,
                %order_id,
                order_owner = %order.user_id,
                status = err.status_code().as_u16(),
                "payments: proof submitted by non-owner"
            );
            return Err(err);
        }

        if PaymentMethod::from_str(&order.payment_method) == Some(PaymentMethod::CashOnDelivery) {
            let err = OrderError::Validation(
                "payment proof is only accepted for online orders".to_string(),
            );
            warn!(
                %order_id,
                status = err.status_code().as_u16(),
                "payments: proof submitted for cash on delivery order"
            );
            return Err(err);
        }

        if OrderStatus::from_str(&order.status).is_some_and(|status| status.is_terminal()) {
            let err = OrderError::Validation(format!(
                "order in status {} cannot accept payment proof",
                order.status
            ));
            warn!(
                %order_id,
                order_status = %order.status,
                status = err.status_code().as_u16(),
                "payments: proof submitted for terminal order"
            );
            return Err(err);
        }

        let screenshot_url = self
            .proof_storage
            .upload_payment_proof(order_id, submit_proof_model.artifact)
            .await
            .map_err(|err| {
                error!(%order_id, error = ?err, "payments: proof upload failed");
                OrderError::Internal(err)
            })?;

        let updated = self
            .order_repo
            .attach_payment_proof(order_id, submit_proof_model.utr_number, screenshot_url)
            .await
            .map_err(|err| {
                error!(%order_id, db_error = ?err, "payments: failed to attach proof");
                OrderError::Internal(err)
            })?;

        info!(
            %order_id,
            order_status = %updated.status,
            "payments: proof attached, awaiting verification"
        );

        Ok(OrderModel::from(updated))
    }
}
