//! # Attesta Core
//!
//! Shared foundation for the attestation backend: configuration,
//! the error taxonomy, principal roles, and the seams (traits) the
//! notification pipeline and the bot are built against.

pub mod config;
pub mod error;
pub mod security;
pub mod traits;
pub mod types;

pub use config::AttestaConfig;
pub use error::{Error, Result};
pub use traits::Transport;
pub use types::{ExamKind, LinkButton, Role};
