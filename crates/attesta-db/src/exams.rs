//! Exam queries, including the recipient resolver.

use attesta_core::{Error, Result};

use crate::records::{Exam, ExamDetails, ExamListRow, NewExam};
use crate::Store;

const LIST_COLUMNS: &str = "e.id, e.kind, e.semester, e.course, e.discipline, e.holding_date, \
     e.link, e.group_id, g.name AS group_name, \
     c.last_name || ' ' || c.first_name AS curator_full_name";

impl Store {
    pub async fn create_exam(&self, new: &NewExam) -> Result<Exam> {
        let group = sqlx::query_scalar::<_, i64>("SELECT id FROM groups WHERE id = $1")
            .bind(new.group_id)
            .fetch_optional(&self.pool)
            .await?;
        if group.is_none() {
            return Err(Error::not_found(format!("group {}", new.group_id)));
        }
        let exam = sqlx::query_as::<_, Exam>(
            "INSERT INTO exams (kind, semester, course, discipline, holding_date, group_id, curator_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(new.kind.as_str())
        .bind(new.semester)
        .bind(new.course)
        .bind(&new.discipline)
        .bind(&new.holding_date)
        .bind(new.group_id)
        .bind(new.curator_id)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(exam_id = exam.id, discipline = %exam.discipline, "exam created");
        Ok(exam)
    }

    /// List exams of one kind, narrowed to the owning curator when scoped.
    pub async fn list_exams(&self, kind: &str, scope: Option<i64>) -> Result<Vec<ExamListRow>> {
        let base = format!(
            "SELECT {LIST_COLUMNS} FROM exams e \
             JOIN groups g ON g.id = e.group_id \
             JOIN curators c ON c.id = e.curator_id \
             WHERE e.kind = $1"
        );
        let rows = match scope {
            Some(curator_id) => {
                sqlx::query_as::<_, ExamListRow>(&format!(
                    "{base} AND e.curator_id = $2 ORDER BY e.holding_date"
                ))
                .bind(kind)
                .bind(curator_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ExamListRow>(&format!("{base} ORDER BY e.holding_date"))
                    .bind(kind)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    pub async fn get_exam(&self, id: i64) -> Result<Exam> {
        sqlx::query_as::<_, Exam>("SELECT * FROM exams WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found(format!("exam {id}")))
    }

    /// Exam joined with its curator's name parts.
    pub async fn exam_details(&self, id: i64) -> Result<ExamDetails> {
        sqlx::query_as::<_, ExamDetails>(
            "SELECT e.id, e.kind, e.discipline, e.holding_date, e.link, e.group_id, \
                    c.last_name AS curator_last_name, \
                    c.first_name AS curator_first_name, \
                    c.patronymic AS curator_patronymic \
             FROM exams e JOIN curators c ON c.id = e.curator_id \
             WHERE e.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::not_found(format!("exam {id}")))
    }

    pub async fn update_exam_link(&self, id: i64, link: Option<&str>) -> Result<ExamListRow> {
        let affected = sqlx::query("UPDATE exams SET link = $2 WHERE id = $1")
            .bind(id)
            .bind(link)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(Error::not_found(format!("exam {id}")));
        }
        let row = sqlx::query_as::<_, ExamListRow>(&format!(
            "SELECT {LIST_COLUMNS} FROM exams e \
             JOIN groups g ON g.id = e.group_id \
             JOIN curators c ON c.id = e.curator_id \
             WHERE e.id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(exam_id = id, "exam link updated");
        Ok(row)
    }

    /// Cascades to the exam's marks.
    pub async fn delete_exam(&self, id: i64) -> Result<()> {
        let affected = sqlx::query("DELETE FROM exams WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(Error::not_found(format!("exam {id}")));
        }
        tracing::info!(exam_id = id, "exam deleted");
        Ok(())
    }

    /// All exams dated today or later. ISO dates compare lexicographically,
    /// so a plain string comparison is enough.
    pub async fn upcoming_exams(&self, today: &str) -> Result<Vec<ExamDetails>> {
        let exams = sqlx::query_as::<_, ExamDetails>(
            "SELECT e.id, e.kind, e.discipline, e.holding_date, e.link, e.group_id, \
                    c.last_name AS curator_last_name, \
                    c.first_name AS curator_first_name, \
                    c.patronymic AS curator_patronymic \
             FROM exams e JOIN curators c ON c.id = e.curator_id \
             WHERE e.holding_date >= $1 \
             ORDER BY e.holding_date",
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;
        Ok(exams)
    }

    /// Recipient resolver: chat ids of every student in the exam's group
    /// holding a bound handle. Handle-less students are silently excluded;
    /// a missing exam propagates as `NotFound`.
    pub async fn exam_recipients(&self, exam_id: i64) -> Result<Vec<i64>> {
        let group_id = sqlx::query_scalar::<_, i64>("SELECT group_id FROM exams WHERE id = $1")
            .bind(exam_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found(format!("exam {exam_id}")))?;

        let chat_ids = sqlx::query_scalar::<_, i64>(
            "SELECT h.chat_id FROM chat_handles h \
             JOIN students s ON s.chat_handle_id = h.id \
             WHERE s.group_id = $1 \
             ORDER BY s.id",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(chat_ids)
    }
}
