use std::sync::Arc;

use crate::core::metrics;
use crate::core::time::primitive_now_utc;
use crate::db::models::{Assessment, QuestionResult, Submission};
use crate::db::types::{AssessmentKind, SubmissionStatus};
use crate::services::auto_grading::auto_grade;
use crate::services::notifications::{NotificationEvent, NotificationFanout};
use crate::services::score_aggregation::aggregate;
use crate::services::submission_locks::SubmissionLocks;
use crate::services::{ServiceError, ServiceResult};
use crate::store::Store;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct QuestionGrade {
    pub(crate) question_id: String,
    pub(crate) points_awarded: f64,
    pub(crate) feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ScoreInput {
    /// Authoritative percentage for the whole submission.
    Percent(f64),
    Questions(Vec<QuestionGrade>),
    /// Re-run answer-key matching.
    Automatic,
}

impl ScoreInput {
    fn mode(&self) -> &'static str {
        match self {
            Self::Percent(_) => "percent",
            Self::Questions(_) => "questions",
            Self::Automatic => "automatic",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct GradeCommand {
    pub(crate) kind: AssessmentKind,
    pub(crate) assessment_id: String,
    pub(crate) submission_id: String,
    pub(crate) score: ScoreInput,
    pub(crate) feedback: Option<String>,
    pub(crate) graded_by: Option<String>,
}

#[derive(Clone)]
pub(crate) struct GradingService {
    store: Arc<dyn Store>,
    fanout: NotificationFanout,
    locks: Arc<SubmissionLocks>,
    max_feedback_chars: usize,
}

impl GradingService {
    pub(crate) fn new(
        store: Arc<dyn Store>,
        fanout: NotificationFanout,
        max_feedback_chars: usize,
    ) -> Self {
        Self { store, fanout, locks: Arc::new(SubmissionLocks::default()), max_feedback_chars }
    }

    /// Validates and stores one grading pass, then notifies the student.
    ///
    /// Nothing is written and no notification is sent when validation fails.
    /// A failed notification never undoes a stored grade.
    pub(crate) async fn record_grade(&self, command: GradeCommand) -> ServiceResult<Submission> {
        self.check_input(&command)?;

        let assessment = self
            .store
            .find_assessment(&command.assessment_id)
            .await?
            .filter(|assessment| assessment.kind == command.kind)
            .ok_or_else(|| ServiceError::not_found("Assessment not found"))?;

        let updated = {
            let _guard = self.locks.acquire(&command.submission_id).await;

            let submission = self
                .store
                .find_submission(&command.submission_id)
                .await?
                .filter(|submission| {
                    submission.assessment_id == assessment.id && submission.kind == assessment.kind
                })
                .ok_or_else(|| ServiceError::not_found("Submission not found"))?;

            let updated = apply_grade(&assessment, submission, &command)?;
            self.store.update_submission(&updated).await?;
            updated
        };

        metrics::grade_recorded(command.kind, command.score.mode());
        tracing::info!(
            submission_id = %updated.id,
            assessment_id = %assessment.id,
            kind = assessment.kind.as_str(),
            mode = command.score.mode(),
            grade_percent = updated.grade_percent,
            "Grade recorded"
        );

        let event = NotificationEvent::GradePosted {
            student_id: updated.student_id.clone(),
            course_id: assessment.course_id.clone(),
            assessment_id: assessment.id.clone(),
            submission_id: updated.id.clone(),
            assessment_title: assessment.title.clone(),
            grade_percent: updated.grade_percent.unwrap_or(0.0),
        };
        if let Err(err) = self.fanout.notify(event).await {
            tracing::error!(
                error = %err,
                submission_id = %updated.id,
                "Failed to notify student about grade"
            );
        }

        Ok(updated)
    }

    fn check_input(&self, command: &GradeCommand) -> ServiceResult<()> {
        self.check_feedback(command.feedback.as_deref())?;
        match &command.score {
            ScoreInput::Percent(percent) => {
                if !percent.is_finite() || !(0.0..=100.0).contains(percent) {
                    return Err(ServiceError::validation(
                        "gradePercent must be a number between 0 and 100",
                    ));
                }
            }
            ScoreInput::Questions(grades) => {
                if grades.is_empty() {
                    return Err(ServiceError::validation("payload must contain at least one grade"));
                }
                for grade in grades {
                    if !grade.points_awarded.is_finite() || grade.points_awarded < 0.0 {
                        return Err(ServiceError::validation(format!(
                            "pointsAwarded for question {} must be a non-negative number",
                            grade.question_id
                        )));
                    }
                    self.check_feedback(grade.feedback.as_deref())?;
                }
            }
            ScoreInput::Automatic => {}
        }
        Ok(())
    }

    fn check_feedback(&self, feedback: Option<&str>) -> ServiceResult<()> {
        match feedback {
            Some(text) if text.chars().count() > self.max_feedback_chars => {
                Err(ServiceError::validation(format!(
                    "feedback must be at most {} characters",
                    self.max_feedback_chars
                )))
            }
            _ => Ok(()),
        }
    }
}

fn merge_result(results: &mut Vec<QuestionResult>, incoming: QuestionResult) {
    match results.iter_mut().find(|existing| existing.question_id == incoming.question_id) {
        Some(existing) => *existing = incoming,
        None => results.push(incoming),
    }
}

fn apply_grade(
    assessment: &Assessment,
    mut submission: Submission,
    command: &GradeCommand,
) -> ServiceResult<Submission> {
    match &command.score {
        ScoreInput::Percent(percent) => {
            let manual_score = percent * assessment.total_points / 100.0;
            submission.auto_score = None;
            submission.manual_score = Some(manual_score);
            submission.total_score = Some(manual_score);
            submission.grade_percent = Some(*percent);
            submission.passed = Some(manual_score >= assessment.passing_score);
        }
        ScoreInput::Questions(grades) => {
            let mut results = submission.results.0.clone();
            for grade in grades {
                let question = assessment.question(&grade.question_id).ok_or_else(|| {
                    ServiceError::validation(format!("Unknown question id {}", grade.question_id))
                })?;
                if question.is_machine_graded() {
                    return Err(ServiceError::validation(format!(
                        "Question {} is graded automatically",
                        question.id
                    )));
                }
                if grade.points_awarded > question.points {
                    return Err(ServiceError::validation(format!(
                        "pointsAwarded for question {} exceeds its maximum of {}",
                        question.id, question.points
                    )));
                }
                merge_result(
                    &mut results,
                    QuestionResult {
                        question_id: grade.question_id.clone(),
                        correct: None,
                        points_awarded: Some(grade.points_awarded),
                        feedback: grade.feedback.clone(),
                    },
                );
            }

            // Derived from the answers; a percent override clears the stored value.
            let auto_score = auto_grade(&assessment.questions.0, &submission.answers.0).auto_score;
            let summary = aggregate(
                &results,
                auto_score,
                assessment.passing_score,
                assessment.total_points,
            )?;
            submission.results.0 = results;
            submission.auto_score = auto_score;
            submission.manual_score = Some(summary.manual_score);
            submission.total_score = Some(summary.total_score);
            submission.grade_percent = Some(summary.percentage);
            submission.passed = Some(summary.passed);
        }
        ScoreInput::Automatic => {
            let graded = auto_grade(&assessment.questions.0, &submission.answers.0);
            let Some(auto_score) = graded.auto_score else {
                return Err(ServiceError::validation(
                    "Assessment has no automatically graded questions",
                ));
            };
            let mut results = submission.results.0.clone();
            for result in graded.results {
                merge_result(&mut results, result);
            }

            let summary = aggregate(
                &results,
                Some(auto_score),
                assessment.passing_score,
                assessment.total_points,
            )?;
            submission.results.0 = results;
            submission.auto_score = Some(auto_score);
            submission.manual_score = Some(summary.manual_score);
            submission.total_score = Some(summary.total_score);
            submission.grade_percent = Some(summary.percentage);
            submission.passed = Some(summary.passed);
        }
    }

    if !matches!(command.score, ScoreInput::Automatic) {
        submission.feedback = command.feedback.clone();
    }
    submission.status = SubmissionStatus::Graded;
    submission.graded_at = Some(primitive_now_utc());
    submission.graded_by = command.graded_by.clone();

    Ok(submission)
}
