//! Principal lookup for authentication.
//!
//! One lookup keyed by role instead of scanning the three tables in
//! sequence: the caller derives the intended role (from the presented
//! secret key) and we query exactly one table.

use attesta_core::{Error, Result, Role};

use crate::records::{Admin, Principal};
use crate::Store;

impl Store {
    /// Find a principal of the given role by login.
    pub async fn find_principal(&self, role: Role, login: &str) -> Result<Option<Principal>> {
        let row = match role {
            Role::Admin => {
                sqlx::query_as::<_, (i64, String, Option<String>)>(
                    "SELECT id, login, password FROM admins WHERE login = $1",
                )
                .bind(login)
                .fetch_optional(&self.pool)
                .await?
            }
            Role::Curator => {
                sqlx::query_as::<_, (i64, String, Option<String>)>(
                    "SELECT id, login, password FROM curators WHERE login = $1",
                )
                .bind(login)
                .fetch_optional(&self.pool)
                .await?
            }
            Role::Student => {
                sqlx::query_as::<_, (i64, String, Option<String>)>(
                    "SELECT id, login, password FROM students WHERE login = $1",
                )
                .bind(login)
                .fetch_optional(&self.pool)
                .await?
            }
        };
        Ok(row.map(|(id, login, password)| Principal {
            id,
            login,
            password,
            role,
        }))
    }

    /// Register a new admin. Duplicate logins are a validation error.
    pub async fn create_admin(&self, login: &str, password_hash: &str) -> Result<Admin> {
        let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM admins WHERE login = $1")
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(Error::validation(format!("login '{login}' is already taken")));
        }
        let admin = sqlx::query_as::<_, Admin>(
            "INSERT INTO admins (login, password, role) VALUES ($1, $2, 'admin') RETURNING *",
        )
        .bind(login)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(login, "admin registered");
        Ok(admin)
    }
}
