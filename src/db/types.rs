use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Admin,
    Instructor,
    Student,
}

impl UserRole {
    pub(crate) fn can_author(self) -> bool {
        matches!(self, Self::Admin | Self::Instructor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "assessmentkind", rename_all = "lowercase")]
pub(crate) enum AssessmentKind {
    Assignment,
    Quiz,
    Exam,
}

impl AssessmentKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Assignment => "assignment",
            Self::Quiz => "quiz",
            Self::Exam => "exam",
        }
    }

    /// Quizzes and exams carry per-question answers; assignments carry free-form content.
    pub(crate) fn has_questions(self) -> bool {
        matches!(self, Self::Quiz | Self::Exam)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "submissionstatus", rename_all = "lowercase")]
pub(crate) enum SubmissionStatus {
    Pending,
    Graded,
    Late,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "notificationtype", rename_all = "lowercase")]
pub(crate) enum NotificationType {
    Announcement,
    Grade,
    General,
}

impl NotificationType {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Announcement => "announcement",
            Self::Grade => "grade",
            Self::General => "general",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assessment_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_value(AssessmentKind::Exam).unwrap(), "exam");
        let parsed: AssessmentKind = serde_json::from_value(serde_json::json!("quiz")).unwrap();
        assert_eq!(parsed, AssessmentKind::Quiz);
        assert_eq!(AssessmentKind::Assignment.as_str(), "assignment");
    }

    #[test]
    fn only_quizzes_and_exams_have_questions() {
        assert!(!AssessmentKind::Assignment.has_questions());
        assert!(AssessmentKind::Quiz.has_questions());
        assert!(AssessmentKind::Exam.has_questions());
    }

    #[test]
    fn students_cannot_author() {
        assert!(UserRole::Admin.can_author());
        assert!(UserRole::Instructor.can_author());
        assert!(!UserRole::Student.can_author());
    }
}
