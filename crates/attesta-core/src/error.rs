//! Error taxonomy shared across the workspace.
//!
//! HTTP handlers map these to status codes; the notification pipeline
//! logs and swallows `Recipient`/`Telegram` so a bad chat never aborts
//! a batch or surfaces to a request.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The messaging platform rejected this recipient (blocked bot,
    /// unknown chat). Permanently skippable.
    #[error("recipient rejected: {0}")]
    Recipient(String),

    /// Transport-level Telegram failure (network, malformed response).
    #[error("telegram: {0}")]
    Telegram(String),

    #[error("config: {0}")]
    Config(String),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
