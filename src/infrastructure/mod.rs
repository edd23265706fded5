pub mod mailer;
pub mod postgres;
pub mod storage;
