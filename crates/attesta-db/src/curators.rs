//! Curator queries.

use attesta_core::{Error, Result};

use crate::records::{Curator, NewCurator};
use crate::Store;

impl Store {
    pub async fn create_curator(&self, new: &NewCurator, password_hash: &str) -> Result<Curator> {
        let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM curators WHERE login = $1")
            .bind(&new.login)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(Error::validation(format!(
                "login '{}' is already taken",
                new.login
            )));
        }
        let curator = sqlx::query_as::<_, Curator>(
            "INSERT INTO curators (login, password, role, last_name, first_name, patronymic) \
             VALUES ($1, $2, 'curator', $3, $4, $5) RETURNING *",
        )
        .bind(&new.login)
        .bind(password_hash)
        .bind(&new.last_name)
        .bind(&new.first_name)
        .bind(&new.patronymic)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(curator_id = curator.id, "curator created");
        Ok(curator)
    }

    pub async fn list_curators(&self) -> Result<Vec<Curator>> {
        let curators =
            sqlx::query_as::<_, Curator>("SELECT * FROM curators ORDER BY last_name, first_name")
                .fetch_all(&self.pool)
                .await?;
        Ok(curators)
    }

    pub async fn get_curator(&self, id: i64) -> Result<Curator> {
        sqlx::query_as::<_, Curator>("SELECT * FROM curators WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found(format!("curator {id}")))
    }

    pub async fn find_curator_by_full_name(
        &self,
        last_name: &str,
        first_name: &str,
        patronymic: &str,
    ) -> Result<Option<Curator>> {
        let curator = sqlx::query_as::<_, Curator>(
            "SELECT * FROM curators \
             WHERE LOWER(last_name) = LOWER($1) \
               AND LOWER(first_name) = LOWER($2) \
               AND LOWER(patronymic) = LOWER($3)",
        )
        .bind(last_name)
        .bind(first_name)
        .bind(patronymic)
        .fetch_optional(&self.pool)
        .await?;
        Ok(curator)
    }

    /// Cascades to owned groups, their students, exams, and marks.
    pub async fn delete_curator(&self, id: i64) -> Result<()> {
        let affected = sqlx::query("DELETE FROM curators WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(Error::not_found(format!("curator {id}")));
        }
        tracing::info!(curator_id = id, "curator deleted (cascade)");
        Ok(())
    }

    pub async fn bind_curator_credentials(
        &self,
        id: i64,
        password_hash: &str,
        handle_id: i64,
    ) -> Result<Curator> {
        let curator = sqlx::query_as::<_, Curator>(
            "UPDATE curators SET password = $2, chat_handle_id = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(password_hash)
        .bind(handle_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::not_found(format!("curator {id}")))?;
        Ok(curator)
    }
}
