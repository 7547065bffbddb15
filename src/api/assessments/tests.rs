use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use sqlx::types::Json;
use time::Duration;
use tower::ServiceExt;

use crate::core::time::primitive_now_utc;
use crate::db::models::{Assessment, Question, Submission};
use crate::db::types::{AssessmentKind, NotificationType, SubmissionStatus};
use crate::store::{MemoryStore, Store};
use crate::test_support::{self, TestContext};

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
        total_points: 100.0,
        passing_score: 60.0,
        available_from: None,
        due_at: None,
        created_by: "t1".to_string(),
        created_at: primitive_now_utc(),
    }
}

async fn insert_assessment(
    store: &MemoryStore,
    id: &str,
    kind: AssessmentKind,
    questions: Vec<Question>,
) -> Assessment {
    store.insert_assessment(assessment(id, kind, questions)).await.expect("insert assessment")
}

async fn insert_pending_submission(store: &MemoryStore, id: &str, assessment: &Assessment) {
    store
        .insert_submission(Submission {
            id: id.to_string(),
            assessment_id: assessment.id.clone(),
            kind: assessment.kind,
            course_id: assessment.course_id.clone(),
            student_id: "u1".to_string(),
            content: Some("my answer".to_string()),
            answers: Json(Default::default()),
            results: Json(Vec::new()),
            auto_score: None,
            manual_score: None,
            total_score: None,
            grade_percent: None,
            passed: None,
            feedback: None,
            status: SubmissionStatus::Pending,
            submitted_at: primitive_now_utc(),
            graded_at: None,
            graded_by: None,
        })
        .await
        .expect("insert submission");
}

async fn send(
    ctx: &TestContext,
    method: Method,
    uri: &str,
    user: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let token = test_support::bearer_token(user, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(method, uri, Some(&token), body))
        .await
        .expect("response");
    let status = response.status();
    (status, test_support::read_json(response).await)
}

async fn grade(ctx: &TestContext, uri: &str, body: Value) -> (StatusCode, Value) {
    send(ctx, Method::POST, uri, "t1", Some(body)).await
}

#[tokio::test]
async fn per_question_grading_end_to_end() {
    let ctx = test_support::setup_test_context().await;
    test_support::seed_course(&ctx).await;
    let exam =
        insert_assessment(&ctx.store, "a1", AssessmentKind::Exam, vec![question("q1", 100.0, None)])
            .await;
    insert_pending_submission(&ctx.store, "s1", &exam).await;

    let (status, body) = grade(
        &ctx,
        "/api/v1/assessments/exam/a1/grade",
        json!({"submissionId": "s1", "payload": [{"questionId": "q1", "pointsAwarded": 70}]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["manual_score"], 70.0);
    assert_eq!(body["total_score"], 70.0);
    assert_eq!(body["grade_percent"], 70.0);
    assert_eq!(body["passed"], true);
    assert_eq!(body["status"], "graded");
    assert_eq!(body["student_name"], "Student One");

    let notifications = ctx.store.all_notifications().await;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].recipient_id, "u1");
    assert_eq!(notifications[0].notification_type, NotificationType::Grade);
    assert!(!notifications[0].is_read);
}

#[tokio::test]
async fn simple_grading_sets_percent_and_feedback() {
    let ctx = test_support::setup_test_context().await;
    test_support::seed_course(&ctx).await;
    let assignment = insert_assessment(&ctx.store, "a1", AssessmentKind::Assignment, vec![]).await;
    insert_pending_submission(&ctx.store, "s1", &assignment).await;

    let (status, body) = grade(
        &ctx,
        "/api/v1/assessments/assignments/a1/grade",
        json!({"submissionId": "s1", "gradePercent": 45, "feedback": "Needs sources"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["grade_percent"], 45.0);
    assert_eq!(body["manual_score"], 45.0);
    assert_eq!(body["passed"], false);
    assert_eq!(body["feedback"], "Needs sources");
    assert_eq!(body["graded_by"], "t1");
}

#[tokio::test]
async fn invalid_grading_requests_are_rejected_without_side_effects() {
    let ctx = test_support::setup_test_context().await;
    test_support::seed_course(&ctx).await;
    let exam = insert_assessment(
        &ctx.store,
        "a1",
        AssessmentKind::Exam,
        vec![question("q1", 10.0, None), question("q2", 10.0, Some("b"))],
    )
    .await;
    insert_pending_submission(&ctx.store, "s1", &exam).await;

    let bad_requests = [
        json!({"submissionId": "s1"}),
        json!({"submissionId": "s1", "gradePercent": "ninety"}),
        json!({"submissionId": "s1", "gradePercent": 120}),
        json!({"submissionId": "s1", "payload": []}),
        json!({"submissionId": "s1", "payload": [{"questionId": "q1", "pointsAwarded": 11}]}),
        json!({"submissionId": "s1", "payload": [{"questionId": "q1", "pointsAwarded": -2}]}),
        json!({"submissionId": "s1", "payload": [{"questionId": "q9", "pointsAwarded": 1}]}),
        json!({"submissionId": "s1", "payload": [{"questionId": "q2", "pointsAwarded": 1}]}),
        json!({"gradePercent": 50}),
        json!({"submissionId": 5, "gradePercent": 50}),
        json!({"submissionId": "s1", "payload": "x"}),
        json!({"submissionId": "s1", "gradePercent": 50, "feedback": 3}),
    ];
    for body in bad_requests {
        let (status, response) = grade(&ctx, "/api/v1/assessments/exam/a1/grade", body.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}; response: {response}");
        assert_eq!(response["status"], 400);
        assert!(response["detail"].is_string(), "response: {response}");
    }

    let (status, _) = grade(
        &ctx,
        "/api/v1/assessments/exam/a1/grade",
        json!({"submissionId": "missing", "gradePercent": 50}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = grade(
        &ctx,
        "/api/v1/assessments/exam/zzz/grade",
        json!({"submissionId": "s1", "gradePercent": 50}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = grade(
        &ctx,
        "/api/v1/assessments/quiz/a1/grade",
        json!({"submissionId": "s1", "gradePercent": 50}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let stored = ctx.store.find_submission("s1").await.unwrap().unwrap();
    assert_eq!(stored.status, SubmissionStatus::Pending);
    assert!(stored.grade_percent.is_none());
    assert!(ctx.store.all_notifications().await.is_empty());
}

#[tokio::test]
async fn only_the_course_instructor_can_grade() {
    let ctx = test_support::setup_test_context().await;
    test_support::seed_course(&ctx).await;
    let exam = insert_assessment(&ctx.store, "a1", AssessmentKind::Exam, vec![]).await;
    insert_pending_submission(&ctx.store, "s1", &exam).await;
    test_support::enroll(&ctx.store, "e1", "c1", "u1").await;

    let (status, _) = send(
        &ctx,
        Method::POST,
        "/api/v1/assessments/exam/a1/grade",
        "u1",
        Some(json!({"submissionId": "s1", "gradePercent": 100})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(ctx.store.all_notifications().await.is_empty());
}

#[tokio::test]
async fn regrading_is_last_write_wins_and_notifies_each_time() {
    let ctx = test_support::setup_test_context().await;
    test_support::seed_course(&ctx).await;
    let assignment = insert_assessment(&ctx.store, "a1", AssessmentKind::Assignment, vec![]).await;
    insert_pending_submission(&ctx.store, "s1", &assignment).await;

    let body = json!({"submissionId": "s1", "gradePercent": 82.5, "feedback": "Solid"});
    let (_, first) = grade(&ctx, "/api/v1/assessments/assignment/a1/grade", body.clone()).await;
    let (_, second) = grade(&ctx, "/api/v1/assessments/assignment/a1/grade", body).await;

    assert_eq!(first["total_score"], second["total_score"]);
    assert_eq!(first["feedback"], second["feedback"]);
    assert_eq!(ctx.store.all_notifications().await.len(), 2);
}

#[tokio::test]
async fn students_submit_and_keyed_quizzes_grade_themselves() {
    let ctx = test_support::setup_test_context().await;
    test_support::seed_course(&ctx).await;
    test_support::enroll(&ctx.store, "e1", "c1", "u1").await;
    insert_assessment(
        &ctx.store,
        "a1",
        AssessmentKind::Quiz,
        vec![question("q1", 50.0, Some("Paris")), question("q2", 50.0, Some("4"))],
    )
    .await;

    let (status, body) = send(
        &ctx,
        Method::POST,
        "/api/v1/assessments/quizzes/a1/submissions",
        "u1",
        Some(json!({"answers": {"q1": " paris ", "q2": "5"}})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["status"], "graded");
    assert_eq!(body["auto_score"], 50.0);
    assert_eq!(body["grade_percent"], 50.0);
    assert_eq!(body["passed"], false);
    assert_eq!(body["results"][0]["correct"], true);
    assert_eq!(body["results"][1]["correct"], false);
    assert_eq!(ctx.store.all_notifications().await.len(), 1);

    let (status, _) = send(
        &ctx,
        Method::POST,
        "/api/v1/assessments/quiz/a1/submissions",
        "u2",
        Some(json!({"answers": {"q1": "Paris"}})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn late_and_early_assignment_submissions() {
    let ctx = test_support::setup_test_context().await;
    test_support::seed_course(&ctx).await;
    test_support::enroll(&ctx.store, "e1", "c1", "u1").await;

    let mut late = assessment("late", AssessmentKind::Assignment, vec![]);
    late.due_at = Some(primitive_now_utc() - Duration::days(1));
    ctx.store.insert_assessment(late).await.unwrap();

    let mut early = assessment("early", AssessmentKind::Assignment, vec![]);
    early.available_from = Some(primitive_now_utc() + Duration::days(1));
    ctx.store.insert_assessment(early).await.unwrap();

    let (status, body) = send(
        &ctx,
        Method::POST,
        "/api/v1/assessments/assignment/late/submissions",
        "u1",
        Some(json!({"content": "Finally done"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["status"], "late");

    let (status, body) = send(
        &ctx,
        Method::POST,
        "/api/v1/assessments/assignment/early/submissions",
        "u1",
        Some(json!({"content": "Too soon"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
}

#[tokio::test]
async fn answer_keys_are_hidden_from_students() {
    let ctx = test_support::setup_test_context().await;
    test_support::seed_course(&ctx).await;
    test_support::enroll(&ctx.store, "e1", "c1", "u1").await;
    insert_assessment(&ctx.store, "a1", AssessmentKind::Quiz, vec![question("q1", 100.0, Some("x"))])
        .await;

    let (status, student_view) =
        send(&ctx, Method::GET, "/api/v1/assessments/quiz/a1", "u1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(student_view["questions"][0].get("answer_key").is_none());

    let (status, teacher_view) =
        send(&ctx, Method::GET, "/api/v1/assessments/quiz/a1", "t1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(teacher_view["questions"][0]["answer_key"], "x");

    let (status, _) = send(&ctx, Method::GET, "/api/v1/assessments/quiz/a1", "u2", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn submission_listing_includes_student_names() {
    let ctx = test_support::setup_test_context().await;
    test_support::seed_course(&ctx).await;
    let assignment = insert_assessment(&ctx.store, "a1", AssessmentKind::Assignment, vec![]).await;
    insert_pending_submission(&ctx.store, "s1", &assignment).await;

    let (status, body) =
        send(&ctx, Method::GET, "/api/v1/assessments/assignment/a1/submissions", "t1", None).await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["student_name"], "Student One");

    let (status, _) =
        send(&ctx, Method::GET, "/api/v1/assessments/assignment/a1/submissions", "u1", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
