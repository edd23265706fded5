use std::time::Duration;

use anyhow::anyhow;
use axum::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::domain::repositories::mailer::{MailError, MailTransport};

#[derive(Debug, Clone)]
pub struct HttpMailerConfig {
    pub api_url: String,
    pub api_key: String,
    pub from_address: String,
}

/// Plaintext delivery through an HTTP mail API (Resend-style JSON body).
pub struct HttpMailerClient {
    http: Client,
    api_url: String,
    api_key: String,
    from_address: String,
}

impl HttpMailerClient {
    pub fn new(config: HttpMailerConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client must build");

        Self {
            http,
            api_url: config.api_url,
            api_key: config.api_key,
            from_address: config.from_address,
        }
    }
}

#[async_trait]
impl MailTransport for HttpMailerClient {
    async fn send_mail(&self, to: String, subject: String, body: String) -> Result<(), MailError> {
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from_address,
                "to": [to],
                "subject": subject,
                "text": body,
            }))
            .send()
            .await
            .map_err(classify_mail_error)?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(MailError::Transport(anyhow!(
            "mail api returned non-success status: {}",
            response.status()
        )))
    }
}

fn classify_mail_error(error: reqwest::Error) -> MailError {
    if error.is_timeout() {
        return MailError::Timeout;
    }
    if error.is_connect() {
        return MailError::Transport(anyhow!("mail api connection failed"));
    }
    MailError::Transport(anyhow!("mail api request failed"))
}
