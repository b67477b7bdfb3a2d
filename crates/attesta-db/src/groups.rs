//! Group queries.

use attesta_core::{Error, Result};

use crate::records::Group;
use crate::Store;

impl Store {
    pub async fn create_group(&self, name: &str, curator_id: i64) -> Result<Group> {
        let curator = sqlx::query_scalar::<_, i64>("SELECT id FROM curators WHERE id = $1")
            .bind(curator_id)
            .fetch_optional(&self.pool)
            .await?;
        if curator.is_none() {
            return Err(Error::not_found(format!("curator {curator_id}")));
        }
        let group = sqlx::query_as::<_, Group>(
            "INSERT INTO groups (name, curator_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(curator_id)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(group_id = group.id, name, "group created");
        Ok(group)
    }

    /// List groups, narrowed to the owning curator when scoped.
    pub async fn list_groups(&self, scope: Option<i64>) -> Result<Vec<Group>> {
        let groups = match scope {
            Some(curator_id) => {
                sqlx::query_as::<_, Group>(
                    "SELECT * FROM groups WHERE curator_id = $1 ORDER BY name",
                )
                .bind(curator_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Group>("SELECT * FROM groups ORDER BY name")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(groups)
    }

    pub async fn get_group(&self, id: i64) -> Result<Group> {
        sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found(format!("group {id}")))
    }

    pub async fn update_group(
        &self,
        id: i64,
        name: Option<&str>,
        curator_id: Option<i64>,
    ) -> Result<Group> {
        if let Some(curator_id) = curator_id {
            let curator = sqlx::query_scalar::<_, i64>("SELECT id FROM curators WHERE id = $1")
                .bind(curator_id)
                .fetch_optional(&self.pool)
                .await?;
            if curator.is_none() {
                return Err(Error::not_found(format!("curator {curator_id}")));
            }
        }
        let group = sqlx::query_as::<_, Group>(
            "UPDATE groups SET name = COALESCE($2, name), curator_id = COALESCE($3, curator_id) \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .bind(curator_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::not_found(format!("group {id}")))?;
        Ok(group)
    }

    /// Cascades to the group's students and exams.
    pub async fn delete_group(&self, id: i64) -> Result<()> {
        let affected = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(Error::not_found(format!("group {id}")));
        }
        tracing::info!(group_id = id, "group deleted (cascade)");
        Ok(())
    }
}
