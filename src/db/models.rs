use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{AssessmentKind, NotificationType, SubmissionStatus, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) display_name: String,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Course {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) instructor_id: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Enrollment {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) student_id: String,
    pub(crate) enrolled_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Question {
    pub(crate) id: String,
    pub(crate) prompt: String,
    pub(crate) points: f64,
    #[serde(default)]
    pub(crate) answer_key: Option<String>,
}

impl Question {
    pub(crate) fn is_machine_graded(&self) -> bool {
        self.answer_key.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Assessment {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) kind: AssessmentKind,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) questions: Json<Vec<Question>>,
    pub(crate) total_points: f64,
    pub(crate) passing_score: f64,
    pub(crate) available_from: Option<PrimitiveDateTime>,
    pub(crate) due_at: Option<PrimitiveDateTime>,
    pub(crate) created_by: String,
    pub(crate) created_at: PrimitiveDateTime,
}

impl Assessment {
    pub(crate) fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.0.iter().find(|question| question.id == question_id)
    }

    /// Every question has an answer key, so no human grading pass is needed.
    pub(crate) fn is_fully_machine_graded(&self) -> bool {
        self.kind.has_questions()
            && !self.questions.0.is_empty()
            && self.questions.0.iter().all(Question::is_machine_graded)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct QuestionResult {
    pub(crate) question_id: String,
    #[serde(default)]
    pub(crate) correct: Option<bool>,
    #[serde(default)]
    pub(crate) points_awarded: Option<f64>,
    #[serde(default)]
    pub(crate) feedback: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Submission {
    pub(crate) id: String,
    pub(crate) assessment_id: String,
    pub(crate) kind: AssessmentKind,
    pub(crate) course_id: String,
    pub(crate) student_id: String,
    pub(crate) content: Option<String>,
    pub(crate) answers: Json<BTreeMap<String, String>>,
    pub(crate) results: Json<Vec<QuestionResult>>,
    pub(crate) auto_score: Option<f64>,
    pub(crate) manual_score: Option<f64>,
    pub(crate) total_score: Option<f64>,
    pub(crate) grade_percent: Option<f64>,
    pub(crate) passed: Option<bool>,
    pub(crate) feedback: Option<String>,
    pub(crate) status: SubmissionStatus,
    pub(crate) submitted_at: PrimitiveDateTime,
    pub(crate) graded_at: Option<PrimitiveDateTime>,
    pub(crate) graded_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Announcement {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) author_id: String,
    pub(crate) title: String,
    pub(crate) message: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Notification {
    pub(crate) id: String,
    pub(crate) recipient_id: String,
    pub(crate) notification_type: NotificationType,
    pub(crate) title: String,
    pub(crate) message: String,
    pub(crate) is_read: bool,
    pub(crate) metadata: Json<serde_json::Value>,
    pub(crate) created_at: PrimitiveDateTime,
}
