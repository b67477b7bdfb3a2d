//! # Attesta Bot
//!
//! Telegram-side self-registration: a per-chat finite state machine
//! (`registration`) walking role choice → full-name lookup → password
//! capture → credential/handle binding, and a dispatcher loop feeding it
//! from the polling stream.

pub mod directory;
pub mod dispatcher;
pub mod registration;

pub use dispatcher::BotDispatcher;
pub use registration::{Conversation, Directory, Registration, Reply};
