//! Row types and input records.

use attesta_core::{ExamKind, Role};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

fn join_name(last: &str, first: &str, patronymic: &str) -> String {
    format!("{last} {first} {patronymic}").trim().to_string()
}

#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: i64,
    pub login: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Curator {
    pub id: i64,
    pub login: String,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub role: String,
    pub last_name: String,
    pub first_name: String,
    pub patronymic: String,
    #[serde(skip_serializing)]
    pub chat_handle_id: Option<i64>,
}

impl Curator {
    pub fn full_name(&self) -> String {
        join_name(&self.last_name, &self.first_name, &self.patronymic)
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub curator_id: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Student {
    pub id: i64,
    pub login: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub role: String,
    pub last_name: String,
    pub first_name: String,
    pub patronymic: String,
    pub date_of_birth: Option<String>,
    pub telephone: Option<String>,
    pub mail: Option<String>,
    pub snils: Option<String>,
    pub group_id: i64,
    #[serde(skip_serializing)]
    pub chat_handle_id: Option<i64>,
    pub verified: bool,
}

impl Student {
    pub fn full_name(&self) -> String {
        join_name(&self.last_name, &self.first_name, &self.patronymic)
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Exam {
    pub id: i64,
    pub kind: String,
    pub semester: i16,
    pub course: i16,
    pub discipline: String,
    pub holding_date: String,
    pub link: Option<String>,
    pub group_id: i64,
    pub curator_id: i64,
}

impl Exam {
    /// Kind tag parsed leniently: unknown tags read as `exam`.
    pub fn exam_kind(&self) -> ExamKind {
        self.kind.parse().unwrap_or(ExamKind::Exam)
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Mark {
    pub id: i64,
    pub value: Option<i16>,
    pub exam_id: i64,
    pub student_id: i64,
}

/// Exam list view with the owning group and curator resolved.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExamListRow {
    pub id: i64,
    pub kind: String,
    pub semester: i16,
    pub course: i16,
    pub discipline: String,
    pub holding_date: String,
    pub link: Option<String>,
    pub group_id: i64,
    pub group_name: String,
    pub curator_full_name: String,
}

/// Exam with its curator's name parts, used by the notification
/// templates and the reminder scan.
#[derive(Debug, Clone, FromRow)]
pub struct ExamDetails {
    pub id: i64,
    pub kind: String,
    pub discipline: String,
    pub holding_date: String,
    pub link: Option<String>,
    pub group_id: i64,
    pub curator_last_name: String,
    pub curator_first_name: String,
    pub curator_patronymic: String,
}

impl ExamDetails {
    pub fn exam_kind(&self) -> ExamKind {
        self.kind.parse().unwrap_or(ExamKind::Exam)
    }

    pub fn curator_full_name(&self) -> String {
        join_name(
            &self.curator_last_name,
            &self.curator_first_name,
            &self.curator_patronymic,
        )
    }
}

/// One student row in an exam's mark sheet.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentMarkRow {
    pub student_id: i64,
    pub student_full_name: String,
    pub mark: Option<i16>,
}

/// Student row in a group listing, with the mark for a requested exam.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GroupStudentRow {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub patronymic: String,
    pub verified: bool,
    pub mark: Option<i16>,
}

/// An authenticated principal found by login, tagged with its role.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: i64,
    pub login: String,
    pub password: Option<String>,
    pub role: Role,
}

/// Outcome of a mark upsert; `Unchanged` fires no notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkChange {
    Unchanged,
    Updated,
    Inserted,
}

/// Flat record handed to the external document generator.
#[derive(Debug, Clone, Serialize)]
pub struct ExamDocumentData {
    pub name: String,
    pub group: String,
    pub course: String,
    pub semester: String,
    pub discipline: String,
    pub exam_date: String,
    pub teacher: String,
    pub students: Vec<DocumentStudentRow>,
    pub doc_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentStudentRow {
    pub name: String,
    pub grade: String,
}

// ---- input records ----

#[derive(Debug, Clone, Deserialize)]
pub struct NewExam {
    pub kind: ExamKind,
    pub semester: i16,
    pub course: i16,
    pub discipline: String,
    pub holding_date: String,
    pub group_id: i64,
    pub curator_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
    pub last_name: String,
    pub first_name: String,
    pub patronymic: String,
    pub login: Option<String>,
    pub date_of_birth: Option<String>,
    pub telephone: Option<String>,
    pub mail: Option<String>,
    pub snils: Option<String>,
    pub group_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentPatch {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub patronymic: Option<String>,
    pub date_of_birth: Option<String>,
    pub telephone: Option<String>,
    pub mail: Option<String>,
    pub snils: Option<String>,
    pub group_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCurator {
    pub login: String,
    pub password: String,
    pub last_name: String,
    pub first_name: String,
    pub patronymic: String,
}
