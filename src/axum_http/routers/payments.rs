use std::sync::Arc;

use axum::{
    Router,
    extract::{Multipart, State},
    response::IntoResponse,
    routing::post,
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::ApiResponse,
    config::config_model::DotEnvyConfig,
    domain::{
        repositories::{orders::OrderRepository, storage::ProofStorageClient},
        value_objects::orders::{ProofArtifactModel, SubmitProofModel},
    },
    infrastructure::{
        postgres::{postgres_connection::PgPoolHandle, repositories::orders::OrderPostgres},
        storage::supabase_storage::{SupabaseStorageClient, SupabaseStorageConfig},
    },
    usecases::{
        orders::{OrderError, OrderResult},
        payment_proofs::PaymentProofUseCase,
    },
};

pub fn routes(db_pool: Arc<PgPoolHandle>, config: Arc<DotEnvyConfig>) -> Router {
    let order_repository = OrderPostgres::new(Arc::clone(&db_pool));
    let proof_storage = SupabaseStorageClient::new(SupabaseStorageConfig {
        project_url: config.supabase_storage.project_url.clone(),
        service_key: config.supabase_storage.service_key.clone(),
        bucket: config.supabase_storage.proof_bucket.clone(),
    });
    let payment_proof_usecase =
        PaymentProofUseCase::new(Arc::new(order_repository), Arc::new(proof_storage));

    Router::new()
        .route("/upload-payment-proof", post(upload_payment_proof))
        .with_state(Arc::new(payment_proof_usecase))
}

pub async fn upload_payment_proof<O, S>(
    State(payment_proof_usecase): State<Arc<PaymentProofUseCase<O, S>>>,
    auth: AuthUser,
    multipart: Multipart,
) -> impl IntoResponse
where
    O: OrderRepository + Send + Sync + 'static,
    S: ProofStorageClient + Send + Sync + 'static,
{
    let submit_proof_model = match read_proof_form(multipart).await {
        Ok(model) => model,
        Err(err) => return err.into_response(),
    };

    match payment_proof_usecase
        .submit_proof(auth.user_id, submit_proof_model)
        .await
    {
        Ok(order) => ApiResponse::ok_with_message("Payment proof submitted", order).into_response(),
        Err(err) => err.into_response(),
    }
}

// Expected form fields: orderId, utrNumber, paymentScreenshot (file).
async fn read_proof_form(mut multipart: Multipart) -> OrderResult<SubmitProofModel> {
    let mut order_id: Option<String> = None;
    let mut utr_number: Option<String> = None;
    let mut artifact: Option<ProofArtifactModel> = None;

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        OrderError::Validation(format!("invalid multipart payload: {}", err))
    })? {
        let name = field.name().map(|name| name.to_string());
        match name.as_deref() {
            Some("orderId") => {
                order_id = Some(field.text().await.map_err(|err| {
                    OrderError::Validation(format!("invalid orderId field: {}", err))
                })?);
            }
            Some("utrNumber") => {
                utr_number = Some(field.text().await.map_err(|err| {
                    OrderError::Validation(format!("invalid utrNumber field: {}", err))
                })?);
            }
            Some("paymentScreenshot") => {
                let file_name = field
                    .file_name()
                    .unwrap_or("payment-proof.png")
                    .to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(|err| {
                    OrderError::Validation(format!("invalid paymentScreenshot field: {}", err))
                })?;

                artifact = Some(ProofArtifactModel {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    let order_id = order_id
        .ok_or_else(|| OrderError::Validation("orderId is required".to_string()))?;
    let order_id = Uuid::parse_str(order_id.trim())
        .map_err(|_| OrderError::Validation("orderId must be a valid UUID".to_string()))?;

    let utr_number = utr_number
        .ok_or_else(|| OrderError::Validation("utrNumber is required".to_string()))?;

    let artifact = artifact
        .ok_or_else(|| OrderError::Validation("paymentScreenshot is required".to_string()))?;

    Ok(SubmitProofModel {
        order_id,
        utr_number,
        artifact,
    })
}
