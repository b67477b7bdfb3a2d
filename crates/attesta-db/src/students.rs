//! Student queries.

use attesta_core::{Error, Result};

use crate::records::{GroupStudentRow, NewStudent, Student, StudentPatch};
use crate::Store;

impl Store {
    pub async fn create_student(&self, new: &NewStudent) -> Result<Student> {
        let group = sqlx::query_scalar::<_, i64>("SELECT id FROM groups WHERE id = $1")
            .bind(new.group_id)
            .fetch_optional(&self.pool)
            .await?;
        if group.is_none() {
            return Err(Error::not_found(format!("group {}", new.group_id)));
        }
        let student = sqlx::query_as::<_, Student>(
            "INSERT INTO students (login, last_name, first_name, patronymic, date_of_birth, \
             telephone, mail, snils, group_id, role) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'student') RETURNING *",
        )
        .bind(&new.login)
        .bind(&new.last_name)
        .bind(&new.first_name)
        .bind(&new.patronymic)
        .bind(&new.date_of_birth)
        .bind(&new.telephone)
        .bind(&new.mail)
        .bind(&new.snils)
        .bind(new.group_id)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(student_id = student.id, "student created");
        Ok(student)
    }

    /// List students, narrowed to groups owned by `scope` when given.
    pub async fn list_students(&self, scope: Option<i64>) -> Result<Vec<Student>> {
        let students = match scope {
            Some(curator_id) => {
                sqlx::query_as::<_, Student>(
                    "SELECT s.* FROM students s \
                     JOIN groups g ON g.id = s.group_id \
                     WHERE g.curator_id = $1 \
                     ORDER BY s.last_name, s.first_name",
                )
                .bind(curator_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Student>(
                    "SELECT * FROM students ORDER BY last_name, first_name",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(students)
    }

    /// Case-insensitive exact match on the three name parts.
    pub async fn find_student_by_full_name(
        &self,
        last_name: &str,
        first_name: &str,
        patronymic: &str,
    ) -> Result<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT * FROM students \
             WHERE LOWER(last_name) = LOWER($1) \
               AND LOWER(first_name) = LOWER($2) \
               AND LOWER(patronymic) = LOWER($3)",
        )
        .bind(last_name)
        .bind(first_name)
        .bind(patronymic)
        .fetch_optional(&self.pool)
        .await?;
        Ok(student)
    }

    /// Match used by the mark table import, which only carries
    /// "Lastname Firstname".
    pub async fn find_student_by_name_pair(
        &self,
        last_name: &str,
        first_name: &str,
    ) -> Result<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT * FROM students \
             WHERE LOWER(last_name) = LOWER($1) AND LOWER(first_name) = LOWER($2)",
        )
        .bind(last_name)
        .bind(first_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(student)
    }

    pub async fn update_student(&self, id: i64, patch: &StudentPatch) -> Result<Student> {
        let student = sqlx::query_as::<_, Student>(
            "UPDATE students SET \
               last_name = COALESCE($2, last_name), \
               first_name = COALESCE($3, first_name), \
               patronymic = COALESCE($4, patronymic), \
               date_of_birth = COALESCE($5, date_of_birth), \
               telephone = COALESCE($6, telephone), \
               mail = COALESCE($7, mail), \
               snils = COALESCE($8, snils), \
               group_id = COALESCE($9, group_id) \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&patch.last_name)
        .bind(&patch.first_name)
        .bind(&patch.patronymic)
        .bind(&patch.date_of_birth)
        .bind(&patch.telephone)
        .bind(&patch.mail)
        .bind(&patch.snils)
        .bind(patch.group_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::not_found(format!("student {id}")))?;
        Ok(student)
    }

    pub async fn delete_student(&self, id: i64) -> Result<()> {
        let affected = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(Error::not_found(format!("student {id}")));
        }
        tracing::info!(student_id = id, "student deleted");
        Ok(())
    }

    /// Finish bot registration: set the password hash, bind the handle,
    /// and flip `verified`. Returns the updated row.
    pub async fn bind_student_credentials(
        &self,
        id: i64,
        password_hash: &str,
        handle_id: i64,
    ) -> Result<Student> {
        let student = sqlx::query_as::<_, Student>(
            "UPDATE students SET password = $2, chat_handle_id = $3, verified = TRUE \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(password_hash)
        .bind(handle_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::not_found(format!("student {id}")))?;
        Ok(student)
    }

    /// Students of a group with the mark for `exam_id` when requested.
    pub async fn students_of_group(
        &self,
        group_id: i64,
        exam_id: Option<i64>,
    ) -> Result<Vec<GroupStudentRow>> {
        let group = sqlx::query_scalar::<_, i64>("SELECT id FROM groups WHERE id = $1")
            .bind(group_id)
            .fetch_optional(&self.pool)
            .await?;
        if group.is_none() {
            return Err(Error::not_found(format!("group {group_id}")));
        }
        let rows = sqlx::query_as::<_, GroupStudentRow>(
            "SELECT s.id, s.last_name, s.first_name, s.patronymic, s.verified, m.value AS mark \
             FROM students s \
             LEFT JOIN marks m ON m.student_id = s.id AND m.exam_id = $2 \
             WHERE s.group_id = $1 \
             ORDER BY s.last_name, s.first_name",
        )
        .bind(group_id)
        .bind(exam_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Chat id of a student's bound handle, if any.
    pub async fn student_chat_id(&self, student_id: i64) -> Result<Option<i64>> {
        let chat_id = sqlx::query_scalar::<_, i64>(
            "SELECT h.chat_id FROM chat_handles h \
             JOIN students s ON s.chat_handle_id = h.id \
             WHERE s.id = $1",
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(chat_id)
    }
}
