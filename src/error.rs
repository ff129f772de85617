// src/error.rs
// Standardized error types for the query runner

use thiserror::Error;

use crate::notify::recipients::RecipientSpec;

/// Main error type for the query runner library
#[derive(Error, Debug)]
pub enum QueryRunnerError {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("frontend returned {status}: {body}")]
    Frontend { status: u16, body: String },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Result using QueryRunnerError
pub type Result<T> = std::result::Result<T, QueryRunnerError>;

/// Failures while resolving recipients or delivering a notification
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("recipient lookup failed: {0}")]
    Recipients(String),

    #[error("email delivery failed: {0}")]
    Email(String),

    #[error("chat delivery failed: {0}")]
    Chat(String),

    #[error("no chat webhook configured for {0}")]
    NoChatWebhook(RecipientSpec),
}

/// Test notifications report which half of the pipeline broke so an
/// operator can tell configuration problems from transport problems.
#[derive(Error, Debug)]
pub enum TestNotificationError {
    #[error("error computing recipients: {0}")]
    Recipients(#[source] NotifyError),

    #[error("error sending notification to {recipient}: {source}")]
    Delivery {
        recipient: RecipientSpec,
        #[source]
        source: NotifyError,
    },
}
