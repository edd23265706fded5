pub mod mailer;
pub mod orders;
pub mod storage;
pub mod users;
