//! Store-backed `Directory` implementation.

use async_trait::async_trait;

use attesta_core::{security, Error, Result, Role};
use attesta_db::Store;

use crate::registration::Directory;

#[async_trait]
impl Directory for Store {
    async fn chat_registered(&self, chat_id: i64) -> Result<bool> {
        Store::chat_registered(self, chat_id).await
    }

    async fn find_by_full_name(
        &self,
        role: Role,
        last_name: &str,
        first_name: &str,
        patronymic: &str,
    ) -> Result<Option<i64>> {
        match role {
            Role::Student => Ok(self
                .find_student_by_full_name(last_name, first_name, patronymic)
                .await?
                .map(|s| s.id)),
            Role::Curator => Ok(self
                .find_curator_by_full_name(last_name, first_name, patronymic)
                .await?
                .map(|c| c.id)),
            // Admins are registered over HTTP, never through the bot.
            Role::Admin => Ok(None),
        }
    }

    async fn bind_credentials(
        &self,
        role: Role,
        principal_id: i64,
        password: &str,
        chat_id: i64,
    ) -> Result<Option<String>> {
        let hash = security::hash_password(password)?;
        let handle_id = self.find_or_create_handle(chat_id).await?;
        match role {
            Role::Student => {
                let student = self
                    .bind_student_credentials(principal_id, &hash, handle_id)
                    .await?;
                Ok(student.login)
            }
            Role::Curator => {
                let curator = self
                    .bind_curator_credentials(principal_id, &hash, handle_id)
                    .await?;
                Ok(Some(curator.login))
            }
            Role::Admin => Err(Error::Forbidden),
        }
    }
}
