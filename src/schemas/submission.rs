use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::{QuestionResult, Submission};
use crate::db::types::{AssessmentKind, SubmissionStatus};

#[derive(Debug, Deserialize)]
pub(crate) struct SubmissionCreate {
    #[serde(default)]
    pub(crate) content: Option<String>,
    #[serde(default)]
    pub(crate) answers: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionResponse {
    pub(crate) id: String,
    pub(crate) assessment_id: String,
    pub(crate) kind: AssessmentKind,
    pub(crate) course_id: String,
    pub(crate) student_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) student_name: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) answers: BTreeMap<String, String>,
    pub(crate) results: Vec<QuestionResult>,
    pub(crate) auto_score: Option<f64>,
    pub(crate) manual_score: Option<f64>,
    pub(crate) total_score: Option<f64>,
    pub(crate) grade_percent: Option<f64>,
    pub(crate) passed: Option<bool>,
    pub(crate) feedback: Option<String>,
    pub(crate) status: SubmissionStatus,
    pub(crate) submitted_at: String,
    pub(crate) graded_at: Option<String>,
    pub(crate) graded_by: Option<String>,
}

impl SubmissionResponse {
    pub(crate) fn from_db(submission: Submission, student_name: Option<String>) -> Self {
        Self {
            id: submission.id,
            assessment_id: submission.assessment_id,
            kind: submission.kind,
            course_id: submission.course_id,
            student_id: submission.student_id,
            student_name,
            content: submission.content,
            answers: submission.answers.0,
            results: submission.results.0,
            auto_score: submission.auto_score,
            manual_score: submission.manual_score,
            total_score: submission.total_score,
            grade_percent: submission.grade_percent,
            passed: submission.passed,
            feedback: submission.feedback,
            status: submission.status,
            submitted_at: format_primitive(submission.submitted_at),
            graded_at: submission.graded_at.map(format_primitive),
            graded_by: submission.graded_by,
        }
    }
}
