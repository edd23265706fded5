use anyhow::Result;
use axum::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::value_objects::orders::ProofArtifactModel;

/// External artifact storage: takes the uploaded proof and returns a durable
/// public URL to store on the order.
#[async_trait]
#[automock]
pub trait ProofStorageClient {
    async fn upload_payment_proof(
        &self,
        order_id: Uuid,
        artifact: ProofArtifactModel,
    ) -> Result<String>;
}
