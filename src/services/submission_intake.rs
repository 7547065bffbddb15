use std::collections::BTreeMap;
use std::sync::Arc;

use sqlx::types::Json;

use crate::core::ids::IdGenerator;
use crate::core::time::{is_past, primitive_now_utc};
use crate::db::models::Submission;
use crate::db::types::{AssessmentKind, SubmissionStatus};
use crate::services::auto_grading::auto_grade;
use crate::services::grading::{GradeCommand, GradingService, ScoreInput};
use crate::services::{ServiceError, ServiceResult};
use crate::store::Store;

#[derive(Debug, Clone)]
pub(crate) struct SubmitCommand {
    pub(crate) kind: AssessmentKind,
    pub(crate) assessment_id: String,
    pub(crate) student_id: String,
    pub(crate) content: Option<String>,
    pub(crate) answers: BTreeMap<String, String>,
}

#[derive(Clone)]
pub(crate) struct SubmissionIntake {
    store: Arc<dyn Store>,
    ids: Arc<dyn IdGenerator>,
    grading: GradingService,
}

impl SubmissionIntake {
    pub(crate) fn new(
        store: Arc<dyn Store>,
        ids: Arc<dyn IdGenerator>,
        grading: GradingService,
    ) -> Self {
        Self { store, ids, grading }
    }

    /// Stores a student's attempt. Fully keyed quizzes and exams are graded
    /// on the spot; anything else waits for an instructor.
    pub(crate) async fn submit(&self, command: SubmitCommand) -> ServiceResult<Submission> {
        let assessment = self
            .store
            .find_assessment(&command.assessment_id)
            .await?
            .filter(|assessment| assessment.kind == command.kind)
            .ok_or_else(|| ServiceError::not_found("Assessment not found"))?;

        if !self.store.is_enrolled(&assessment.course_id, &command.student_id).await? {
            return Err(ServiceError::Forbidden("Not enrolled in this course".to_string()));
        }

        let now = primitive_now_utc();
        if assessment.available_from.is_some_and(|opens| now < opens) {
            return Err(ServiceError::validation("Assessment is not open for submissions yet"));
        }

        let (content, answers) = if assessment.kind.has_questions() {
            if command.answers.is_empty() {
                return Err(ServiceError::validation("answers must not be empty"));
            }
            if let Some(unknown) =
                command.answers.keys().find(|question_id| assessment.question(question_id).is_none())
            {
                return Err(ServiceError::validation(format!("Unknown question id {unknown}")));
            }
            (None, command.answers)
        } else {
            let content = command
                .content
                .as_deref()
                .map(str::trim)
                .filter(|content| !content.is_empty())
                .ok_or_else(|| ServiceError::validation("content must not be empty"))?;
            (Some(content.to_string()), BTreeMap::new())
        };

        let graded = auto_grade(&assessment.questions.0, &answers);
        let status =
            if is_past(assessment.due_at, now) { SubmissionStatus::Late } else { SubmissionStatus::Pending };

        let submission = self
            .store
            .insert_submission(Submission {
                id: self.ids.next_id(),
                assessment_id: assessment.id.clone(),
                kind: assessment.kind,
                course_id: assessment.course_id.clone(),
                student_id: command.student_id,
                content,
                answers: Json(answers),
                results: Json(graded.results),
                auto_score: graded.auto_score,
                manual_score: None,
                total_score: None,
                grade_percent: None,
                passed: None,
                feedback: None,
                status,
                submitted_at: now,
                graded_at: None,
                graded_by: None,
            })
            .await?;

        tracing::info!(
            submission_id = %submission.id,
            assessment_id = %assessment.id,
            kind = assessment.kind.as_str(),
            late = matches!(status, SubmissionStatus::Late),
            "Submission received"
        );

        if !assessment.is_fully_machine_graded() {
            return Ok(submission);
        }

        self.grading
            .record_grade(GradeCommand {
                kind: assessment.kind,
                assessment_id: assessment.id,
                submission_id: submission.id,
                score: ScoreInput::Automatic,
                feedback: None,
                graded_by: None,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use time::Duration;

    use super::*;
    use crate::core::ids::SequentialIds;
    use crate::db::models::{Assessment, Enrollment, Question};
    use crate::services::notifications::NotificationFanout;
    use crate::store::MemoryStore;

    fn question(id: &str, points: f64, key: Option<&str>) -> Question {
        Question {
            id: id.to_string(),
            prompt: format!("prompt {id}"),
            points,
            answer_key: key.map(str::to_string),
        }
    }

    fn assessment(id: &str, kind: AssessmentKind, questions: Vec<Question>) -> Assessment {
        Assessment {
            id: id.to_string(),
            course_id: "c1".to_string(),
            kind,
            title: format!("Assessment {id}"),
            description: None,
            questions: Json(questions),
            total_points: 10.0,
            passing_score: 6.0,
            available_from: None,
            due_at: None,
            created_by: "t1".to_string(),
            created_at: primitive_now_utc(),
        }
    }

    async fn intake_with(assessment: Assessment) -> (Arc<MemoryStore>, SubmissionIntake) {
        let store = Arc::new(MemoryStore::default());
        store.insert_assessment(assessment).await.unwrap();
        store
            .insert_enrollment(Enrollment {
                id: "e1".to_string(),
                course_id: "c1".to_string(),
                student_id: "u1".to_string(),
                enrolled_at: primitive_now_utc(),
            })
            .await
            .unwrap();
        let ids: Arc<dyn IdGenerator> = Arc::new(SequentialIds::new("id"));
        let fanout = NotificationFanout::new(store.clone(), ids.clone());
        let grading = GradingService::new(store.clone(), fanout, 100);
        let intake = SubmissionIntake::new(store.clone(), ids, grading);
        (store, intake)
    }

    fn answers(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn essay(student_id: &str, content: &str) -> SubmitCommand {
        SubmitCommand {
            kind: AssessmentKind::Assignment,
            assessment_id: "a1".to_string(),
            student_id: student_id.to_string(),
            content: Some(content.to_string()),
            answers: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn assignment_submission_is_pending() {
        let (_store, intake) = intake_with(assessment("a1", AssessmentKind::Assignment, vec![])).await;
        let submission = intake.submit(essay("u1", "  my essay  ")).await.unwrap();

        assert_eq!(submission.status, SubmissionStatus::Pending);
        assert_eq!(submission.content.as_deref(), Some("my essay"));
        assert!(submission.auto_score.is_none());
    }

    #[tokio::test]
    async fn late_and_early_submissions() {
        let mut late = assessment("a1", AssessmentKind::Assignment, vec![]);
        late.due_at = Some(primitive_now_utc() - Duration::hours(1));
        let (_store, intake) = intake_with(late).await;
        let submission = intake.submit(essay("u1", "essay")).await.unwrap();
        assert_eq!(submission.status, SubmissionStatus::Late);

        let mut early = assessment("a1", AssessmentKind::Assignment, vec![]);
        early.available_from = Some(primitive_now_utc() + Duration::hours(1));
        let (store, intake) = intake_with(early).await;
        let err = intake.submit(essay("u1", "essay")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(store.list_submissions("a1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejects_outsiders_and_empty_content() {
        let (_store, intake) = intake_with(assessment("a1", AssessmentKind::Assignment, vec![])).await;

        let err = intake.submit(essay("stranger", "essay")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = intake.submit(essay("u1", "   ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let mut wrong_kind = essay("u1", "essay");
        wrong_kind.kind = AssessmentKind::Exam;
        let err = intake.submit(wrong_kind).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn fully_keyed_quiz_is_graded_immediately() {
        let quiz = assessment(
            "a1",
            AssessmentKind::Quiz,
            vec![question("q1", 4.0, Some("A")), question("q2", 6.0, Some("Lyon"))],
        );
        let (store, intake) = intake_with(quiz).await;

        let submission = intake
            .submit(SubmitCommand {
                kind: AssessmentKind::Quiz,
                assessment_id: "a1".to_string(),
                student_id: "u1".to_string(),
                content: None,
                answers: answers(&[("q1", "a"), ("q2", " lyon")]),
            })
            .await
            .unwrap();

        assert_eq!(submission.status, SubmissionStatus::Graded);
        assert_eq!(submission.auto_score, Some(10.0));
        assert_eq!(submission.total_score, Some(10.0));
        assert_eq!(submission.grade_percent, Some(100.0));
        assert_eq!(submission.passed, Some(true));
        assert_eq!(store.all_notifications().await.len(), 1);
    }

    #[tokio::test]
    async fn mixed_exam_keeps_partial_auto_score_and_waits() {
        let exam = assessment(
            "a1",
            AssessmentKind::Exam,
            vec![question("q1", 4.0, Some("A")), question("q2", 6.0, None)],
        );
        let (store, intake) = intake_with(exam).await;

        let submission = intake
            .submit(SubmitCommand {
                kind: AssessmentKind::Exam,
                assessment_id: "a1".to_string(),
                student_id: "u1".to_string(),
                content: None,
                answers: answers(&[("q1", "A"), ("q2", "long answer")]),
            })
            .await
            .unwrap();

        assert_eq!(submission.status, SubmissionStatus::Pending);
        assert_eq!(submission.auto_score, Some(4.0));
        assert!(submission.total_score.is_none());
        assert!(store.all_notifications().await.is_empty());
    }

    #[tokio::test]
    async fn quiz_answers_must_reference_known_questions() {
        let quiz = assessment("a1", AssessmentKind::Quiz, vec![question("q1", 10.0, Some("A"))]);
        let (_store, intake) = intake_with(quiz).await;

        for bad in [answers(&[]), answers(&[("q9", "A")])] {
            let err = intake
                .submit(SubmitCommand {
                    kind: AssessmentKind::Quiz,
                    assessment_id: "a1".to_string(),
                    student_id: "u1".to_string(),
                    content: None,
                    answers: bad,
                })
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
        }
    }
}
