use axum::async_trait;
use mockall::automock;
use thiserror::Error;

/// Timeout-class failures are distinguished so callers can retry exactly
/// those; anything else fails immediately.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport timed out")]
    Timeout,
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

#[async_trait]
#[automock]
pub trait MailTransport {
    async fn send_mail(
        &self,
        to: String,
        subject: String,
        body: String,
    ) -> Result<(), MailError>;
}
