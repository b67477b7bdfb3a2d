//! Mark queries: upsert with change detection, mark sheets, and the
//! flat document-data record.

use attesta_core::{Error, Result};
use uuid::Uuid;

use crate::records::{
    DocumentStudentRow, ExamDocumentData, Mark, MarkChange, StudentMarkRow,
};
use crate::Store;

impl Store {
    /// Upsert one (student, exam) mark. `Unchanged` means the stored value
    /// already equals the requested one; callers use that to skip
    /// notifications. Last write wins, no row lock is taken.
    pub async fn upsert_mark(
        &self,
        student_id: i64,
        exam_id: i64,
        value: Option<i16>,
    ) -> Result<MarkChange> {
        let existing = sqlx::query_as::<_, Mark>(
            "SELECT * FROM marks WHERE student_id = $1 AND exam_id = $2",
        )
        .bind(student_id)
        .bind(exam_id)
        .fetch_optional(&self.pool)
        .await?;

        match existing {
            Some(mark) if mark.value == value => Ok(MarkChange::Unchanged),
            Some(mark) => {
                sqlx::query("UPDATE marks SET value = $2 WHERE id = $1")
                    .bind(mark.id)
                    .bind(value)
                    .execute(&self.pool)
                    .await?;
                Ok(MarkChange::Updated)
            }
            None => {
                sqlx::query("INSERT INTO marks (student_id, exam_id, value) VALUES ($1, $2, $3)")
                    .bind(student_id)
                    .bind(exam_id)
                    .bind(value)
                    .execute(&self.pool)
                    .await?;
                Ok(MarkChange::Inserted)
            }
        }
    }

    /// Mark sheet for one exam: every graded student with their value.
    pub async fn marks_for_exam(&self, exam_id: i64) -> Result<Vec<StudentMarkRow>> {
        let exam = sqlx::query_scalar::<_, i64>("SELECT id FROM exams WHERE id = $1")
            .bind(exam_id)
            .fetch_optional(&self.pool)
            .await?;
        if exam.is_none() {
            return Err(Error::not_found(format!("exam {exam_id}")));
        }
        let rows = sqlx::query_as::<_, StudentMarkRow>(
            "SELECT s.id AS student_id, \
                    s.last_name || ' ' || s.first_name AS student_full_name, \
                    m.value AS mark \
             FROM marks m JOIN students s ON s.id = m.student_id \
             WHERE m.exam_id = $1 \
             ORDER BY s.last_name, s.first_name",
        )
        .bind(exam_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Fully-resolved flat record for the external document generator.
    pub async fn exam_document_data(&self, exam_id: i64) -> Result<ExamDocumentData> {
        let exam = self.exam_details(exam_id).await?;
        let group_name = sqlx::query_scalar::<_, String>("SELECT name FROM groups WHERE id = $1")
            .bind(exam.group_id)
            .fetch_optional(&self.pool)
            .await?
            .unwrap_or_else(|| "Не указано".to_string());
        let (semester, course) = sqlx::query_as::<_, (i16, i16)>(
            "SELECT semester, course FROM exams WHERE id = $1",
        )
        .bind(exam_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, (String, String, String, Option<i16>)>(
            "SELECT s.last_name, s.first_name, s.patronymic, m.value \
             FROM marks m JOIN students s ON s.id = m.student_id \
             WHERE m.exam_id = $1 \
             ORDER BY s.last_name, s.first_name",
        )
        .bind(exam_id)
        .fetch_all(&self.pool)
        .await?;

        let students = rows
            .into_iter()
            .map(|(last, first, patronymic, value)| DocumentStudentRow {
                name: format!("{last} {first} {patronymic}"),
                grade: value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string()),
            })
            .collect();

        Ok(ExamDocumentData {
            name: format!("document_{}", Uuid::new_v4().simple()),
            group: group_name,
            course: course.to_string(),
            semester: semester.to_string(),
            discipline: exam.discipline.clone(),
            exam_date: exam.holding_date.clone(),
            teacher: exam.curator_full_name(),
            doc_type: exam.exam_kind().doc_type().to_string(),
            students,
        })
    }
}
