//! API route handlers, grouped by resource.

pub mod auth;
pub mod curators;
pub mod exams;
pub mod groups;
pub mod marks;
pub mod students;
