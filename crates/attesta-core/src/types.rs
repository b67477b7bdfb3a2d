//! Principal roles and small shared value types.

use serde::{Deserialize, Serialize};

/// Role of an authenticated actor. Stored as a lowercase tag both in the
/// database and in token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Curator,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Curator => "curator",
            Role::Student => "student",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "curator" => Ok(Role::Curator),
            "student" => Ok(Role::Student),
            other => Err(crate::Error::validation(format!("unknown role: {other}"))),
        }
    }
}

/// Kind of an attestation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamKind {
    Exam,
    Credit,
}

impl ExamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamKind::Exam => "exam",
            ExamKind::Credit => "credit",
        }
    }

    /// Human label used in outbound messages.
    pub fn label(&self) -> &'static str {
        match self {
            ExamKind::Exam => "Экзамен",
            ExamKind::Credit => "Зачёт",
        }
    }

    /// Document template selector for the external generator.
    pub fn doc_type(&self) -> &'static str {
        match self {
            ExamKind::Exam => "exam",
            ExamKind::Credit => "credits",
        }
    }
}

impl std::str::FromStr for ExamKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exam" => Ok(ExamKind::Exam),
            "credit" => Ok(ExamKind::Credit),
            other => Err(crate::Error::validation(format!("unknown exam kind: {other}"))),
        }
    }
}

/// A single inline URL button attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkButton {
    pub label: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trip() {
        for role in [Role::Admin, Role::Curator, Role::Student] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("tutor".parse::<Role>().is_err());
    }

    #[test]
    fn exam_kind_doc_type() {
        assert_eq!(ExamKind::Credit.doc_type(), "credits");
        assert_eq!(ExamKind::Exam.doc_type(), "exam");
    }
}
