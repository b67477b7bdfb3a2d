//! Trait seams between the notification pipeline and its collaborators.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::LinkButton;

/// Outbound messaging transport. The production implementation is the
/// Telegram Bot API client; tests substitute an in-memory recorder.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver `text` to `chat_id`, optionally with one inline URL button.
    ///
    /// `Error::Recipient` means this chat rejected the message and may be
    /// skipped permanently; any other error is a transport-level failure.
    async fn send(&self, chat_id: i64, text: &str, button: Option<&LinkButton>) -> Result<()>;
}
