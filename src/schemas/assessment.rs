use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime,
    PrimitiveDateTime,
};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Assessment, Question};
use crate::db::types::AssessmentKind;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionCreate {
    #[validate(length(min = 1, max = 64, message = "question id must be 1-64 characters"))]
    pub(crate) id: String,
    #[validate(length(min = 1, message = "prompt must not be empty"))]
    pub(crate) prompt: String,
    #[validate(range(exclusive_min = 0.0, message = "points must be positive"))]
    pub(crate) points: f64,
    #[serde(default)]
    #[serde(alias = "answerKey")]
    pub(crate) answer_key: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct AssessmentCreate {
    pub(crate) kind: AssessmentKind,
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub(crate) questions: Vec<QuestionCreate>,
    #[serde(alias = "totalPoints")]
    #[validate(range(exclusive_min = 0.0, message = "total_points must be positive"))]
    pub(crate) total_points: f64,
    #[serde(alias = "passingScore")]
    #[validate(range(min = 0.0, message = "passing_score must be non-negative"))]
    pub(crate) passing_score: f64,
    #[serde(
        default,
        alias = "availableFrom",
        alias = "availableAfter",
        alias = "startDate",
        deserialize_with = "deserialize_option_offset_datetime_flexible"
    )]
    pub(crate) available_from: Option<OffsetDateTime>,
    #[serde(
        default,
        alias = "dueAt",
        alias = "dueDate",
        alias = "endDate",
        deserialize_with = "deserialize_option_offset_datetime_flexible"
    )]
    pub(crate) due_at: Option<OffsetDateTime>,
}

impl AssessmentCreate {
    /// Cross-field rules the derive cannot express.
    pub(crate) fn check_consistency(&self) -> Result<(), String> {
        if self.passing_score > self.total_points {
            return Err("passing_score must not exceed total_points".to_string());
        }
        if let (Some(opens), Some(due)) = (self.available_from, self.due_at) {
            if opens > due {
                return Err("available_from must not be after due_at".to_string());
            }
        }

        let mut seen = std::collections::HashSet::new();
        for question in &self.questions {
            if !seen.insert(question.id.as_str()) {
                return Err(format!("duplicate question id {}", question.id));
            }
        }
        let question_points: f64 = self.questions.iter().map(|question| question.points).sum();
        if question_points > self.total_points {
            return Err("question points exceed total_points".to_string());
        }
        if !self.kind.has_questions() && self.questions.iter().any(|q| q.answer_key.is_some()) {
            return Err("assignments cannot carry answer keys".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) prompt: String,
    pub(crate) points: f64,
    pub(crate) auto_graded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) answer_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssessmentResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) kind: AssessmentKind,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) questions: Vec<QuestionResponse>,
    pub(crate) total_points: f64,
    pub(crate) passing_score: f64,
    pub(crate) available_from: Option<String>,
    pub(crate) due_at: Option<String>,
    pub(crate) created_by: String,
    pub(crate) created_at: String,
}

impl AssessmentResponse {
    pub(crate) fn from_db(assessment: Assessment, include_answer_keys: bool) -> Self {
        let questions = assessment
            .questions
            .0
            .into_iter()
            .map(|question: Question| QuestionResponse {
                auto_graded: question.is_machine_graded(),
                answer_key: question.answer_key.filter(|_| include_answer_keys),
                id: question.id,
                prompt: question.prompt,
                points: question.points,
            })
            .collect();

        Self {
            id: assessment.id,
            course_id: assessment.course_id,
            kind: assessment.kind,
            title: assessment.title,
            description: assessment.description,
            questions,
            total_points: assessment.total_points,
            passing_score: assessment.passing_score,
            available_from: assessment.available_from.map(format_primitive),
            due_at: assessment.due_at.map(format_primitive),
            created_by: assessment.created_by,
            created_at: format_primitive(assessment.created_at),
        }
    }
}

fn parse_offset_datetime_flexible(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(value);
    }

    // Date-time without an offset is read as UTC.
    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Some(value.assume_utc());
    }
    if let Ok(value) =
        PrimitiveDateTime::parse(raw, &format_description!("[year]-[month]-[day]T[hour]:[minute]"))
    {
        return Some(value.assume_utc());
    }

    None
}

fn deserialize_option_offset_datetime_flexible<'de, D>(
    deserializer: D,
) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        Some(value) => parse_offset_datetime_flexible(&value)
            .ok_or_else(|| D::Error::custom(format!("invalid datetime: {value}")))
            .map(Some),
        None => Ok(None),
    }
}
