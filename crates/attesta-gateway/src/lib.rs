//! # Attesta Gateway
//!
//! HTTP API: authentication, exam/group/student/curator/mark routes.
//! Every protected handler extracts the caller from a Bearer JWT, gates
//! on a role allow-list, and threads the curator scope into list
//! queries. Mutations that students should hear about enqueue a
//! `NotifyEvent` instead of sending anything inline.

pub mod auth;
pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, start, AppState};
