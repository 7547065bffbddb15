use serde::Deserialize;
use serde_json::Value;

use crate::db::types::AssessmentKind;
use crate::services::grading::{GradeCommand, QuestionGrade, ScoreInput};

/// Raw grading body. Numeric fields stay untyped so a missing or non-numeric
/// score is reported as a validation error instead of a decode failure.
#[derive(Debug, Deserialize)]
pub(crate) struct GradeRequest {
    #[serde(default, alias = "submissionId")]
    pub(crate) submission_id: Option<String>,
    #[serde(default, alias = "gradePercent")]
    pub(crate) grade_percent: Option<Value>,
    #[serde(default)]
    pub(crate) payload: Option<Vec<QuestionGradeRequest>>,
    #[serde(default)]
    pub(crate) feedback: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionGradeRequest {
    #[serde(default, alias = "questionId")]
    pub(crate) question_id: Option<String>,
    #[serde(default, alias = "pointsAwarded")]
    pub(crate) points_awarded: Option<Value>,
    #[serde(default)]
    pub(crate) feedback: Option<String>,
}

fn number(value: Option<&Value>, field: &str) -> Result<f64, String> {
    match value {
        None | Some(Value::Null) => Err(format!("{field} is required")),
        Some(value) => value.as_f64().ok_or_else(|| format!("{field} must be a number")),
    }
}

impl GradeRequest {
    pub(crate) fn into_command(
        self,
        kind: AssessmentKind,
        assessment_id: String,
        graded_by: String,
    ) -> Result<GradeCommand, String> {
        let submission_id = self
            .submission_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| "submissionId is required".to_string())?;

        let score = match self.payload {
            Some(items) => {
                let grades = items
                    .into_iter()
                    .map(|item| {
                        let question_id = item
                            .question_id
                            .filter(|id| !id.trim().is_empty())
                            .ok_or_else(|| "questionId is required".to_string())?;
                        let points_awarded =
                            number(item.points_awarded.as_ref(), "pointsAwarded")?;
                        Ok(QuestionGrade { question_id, points_awarded, feedback: item.feedback })
                    })
                    .collect::<Result<Vec<_>, String>>()?;
                ScoreInput::Questions(grades)
            }
            None => ScoreInput::Percent(number(self.grade_percent.as_ref(), "gradePercent")?),
        };

        Ok(GradeCommand {
            kind,
            assessment_id,
            submission_id,
            score,
            feedback: self.feedback,
            graded_by: Some(graded_by),
        })
    }
}
