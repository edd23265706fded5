use std::path::Path;
use std::time::Duration;

use anyhow::{Result, anyhow};
use axum::async_trait;
use reqwest::Client;
use uuid::Uuid;

use crate::domain::{
    repositories::storage::ProofStorageClient, value_objects::orders::ProofArtifactModel,
};

const PROOF_FOLDER: &str = "payment-proofs";

#[derive(Debug, Clone)]
pub struct SupabaseStorageConfig {
    pub project_url: String,
    pub service_key: String,
    pub bucket: String,
}

/// Supabase Storage object API reference:
/// https://supabase.com/docs/reference/api/storage
pub struct SupabaseStorageClient {
    http: Client,
    project_url: String,
    service_key: String,
    bucket: String,
}

impl SupabaseStorageClient {
    pub fn new(config: SupabaseStorageConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client must build");

        Self {
            http,
            project_url: config.project_url.trim_end_matches('/').to_string(),
            service_key: config.service_key,
            bucket: config.bucket,
        }
    }

    // One object per order: resubmission replaces the prior proof in place.
    fn object_key(order_id: Uuid, file_name: &str) -> String {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("png");
        format!("{}/{}.{}", PROOF_FOLDER, order_id, extension)
    }
}

#[async_trait]
impl ProofStorageClient for SupabaseStorageClient {
    async fn upload_payment_proof(
        &self,
        order_id: Uuid,
        artifact: ProofArtifactModel,
    ) -> Result<String> {
        let object_key = Self::object_key(order_id, &artifact.file_name);
        let upload_url = format!(
            "{}/storage/v1/object/{}/{}",
            self.project_url, self.bucket, object_key
        );

        let response = self
            .http
            .post(&upload_url)
            .bearer_auth(&self.service_key)
            .header(reqwest::header::CONTENT_TYPE, artifact.content_type)
            .header("x-upsert", "true")
            .body(artifact.bytes)
            .send()
            .await
            .map_err(sanitize_storage_error)?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "storage upload returned non-success status: {}",
                response.status()
            ));
        }

        Ok(format!(
            "{}/storage/v1/object/public/{}/{}",
            self.project_url, self.bucket, object_key
        ))
    }
}

fn sanitize_storage_error(error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("storage upload timed out");
    }
    if error.is_connect() {
        return anyhow!("storage connection failed");
    }
    anyhow!("storage upload request failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_keeps_the_upload_extension() {
        let order_id = Uuid::new_v4();
        let key = SupabaseStorageClient::object_key(order_id, "screenshot.jpeg");
        assert_eq!(key, format!("payment-proofs/{}.jpeg", order_id));
    }

    #[test]
    fn object_key_defaults_to_png_without_extension() {
        let order_id = Uuid::new_v4();
        let key = SupabaseStorageClient::object_key(order_id, "screenshot");
        assert_eq!(key, format!("payment-proofs/{}.png", order_id));
    }
}
