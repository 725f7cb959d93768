pub mod error;
pub mod logger;
pub mod mailer;
pub mod validation;
