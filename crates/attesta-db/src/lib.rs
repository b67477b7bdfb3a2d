//! # Attesta DB
//!
//! Postgres persistence for the attestation backend. One `Store` handle
//! wraps the pool; every query checks out a pooled connection for the
//! duration of that query only, so no operation holds a connection across
//! an outbound network delay.
//!
//! Curator scoping: list queries take `scope: Option<i64>` — `Some(id)`
//! narrows the result set to records owned by that curator, `None`
//! (admin) returns everything.

pub mod curators;
pub mod exams;
pub mod groups;
pub mod handles;
pub mod marks;
pub mod principals;
pub mod records;
pub mod students;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use attesta_core::{Error, Result};

pub use records::*;

/// Shared database handle. Cloning is cheap (pool is internally shared).
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Connect to Postgres.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Run embedded schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Config(format!("migrations failed: {e}")))?;
        tracing::info!("database schema up to date");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
