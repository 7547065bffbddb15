use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use sqlx::types::Json as SqlJson;

use crate::api::errors::ApiError;
use crate::api::guards::{
    load_course, require_author, require_course_instructor, require_course_member, CurrentUser,
};
use crate::api::validation::{validate_payload, JsonBody};
use crate::core::state::AppState;
use crate::core::time::{primitive_now_utc, to_primitive_utc};
use crate::db::models::{Assessment, Course, Enrollment, Question};
use crate::db::types::UserRole;
use crate::schemas::announcement::AnnouncementResponse;
use crate::schemas::assessment::{AssessmentCreate, AssessmentResponse};
use crate::schemas::course::{CourseCreate, CourseResponse, EnrollmentCreate, EnrollmentResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_course))
        .route("/:course_id/enrollments", post(enroll_student))
        .route("/:course_id/announcements", get(list_announcements))
        .route("/:course_id/assessments", post(create_assessment))
}

async fn create_course(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CourseCreate>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    require_author(&user)?;
    validate_payload(&payload)?;

    let title = payload.title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("Course title must not be empty".to_string()));
    }

    let instructor_id = match payload.instructor_id {
        Some(instructor_id) if user.role == UserRole::Admin => {
            let instructor = state.store().find_user(&instructor_id).await?;
            if !instructor.is_some_and(|instructor| instructor.role.can_author()) {
                return Err(ApiError::BadRequest(
                    "instructor_id must reference an instructor".to_string(),
                ));
            }
            instructor_id
        }
        _ => user.id.clone(),
    };

    let course = state
        .store()
        .insert_course(Course {
            id: state.ids().next_id(),
            title: title.to_string(),
            instructor_id,
            created_at: primitive_now_utc(),
        })
        .await?;

    tracing::info!(course_id = %course.id, instructor_id = %course.instructor_id, "Course created");
    Ok((StatusCode::CREATED, Json(CourseResponse::from_db(course))))
}

async fn enroll_student(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<EnrollmentCreate>,
) -> Result<(StatusCode, Json<EnrollmentResponse>), ApiError> {
    let course = load_course(&state, &course_id).await?;
    require_course_instructor(&user, &course)?;
    validate_payload(&payload)?;

    let student = state
        .store()
        .find_user(payload.student_id.trim())
        .await?
        .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))?;
    if student.role != UserRole::Student {
        return Err(ApiError::BadRequest("Only students can be enrolled".to_string()));
    }

    let enrollment = state
        .store()
        .insert_enrollment(Enrollment {
            id: state.ids().next_id(),
            course_id: course.id,
            student_id: student.id,
            enrolled_at: primitive_now_utc(),
        })
        .await?;

    tracing::info!(
        course_id = %enrollment.course_id,
        student_id = %enrollment.student_id,
        "Student enrolled"
    );
    Ok((StatusCode::CREATED, Json(EnrollmentResponse::from_db(enrollment))))
}

async fn list_announcements(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AnnouncementResponse>>, ApiError> {
    let course = load_course(&state, &course_id).await?;
    require_course_member(&state, &user, &course).await?;

    let announcements = state.announcements().list(&course.id).await?;
    Ok(Json(announcements.into_iter().map(AnnouncementResponse::from_db).collect()))
}

async fn create_assessment(
    Path(course_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<AssessmentCreate>,
) -> Result<(StatusCode, Json<AssessmentResponse>), ApiError> {
    let course = load_course(&state, &course_id).await?;
    require_course_instructor(&user, &course)?;
    validate_payload(&payload)?;
    payload.check_consistency().map_err(ApiError::BadRequest)?;

    let title = payload.title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }

    let questions = payload
        .questions
        .into_iter()
        .map(|question| Question {
            id: question.id.trim().to_string(),
            prompt: question.prompt,
            points: question.points,
            answer_key: question.answer_key.filter(|key| !key.trim().is_empty()),
        })
        .collect();

    let assessment = state
        .store()
        .insert_assessment(Assessment {
            id: state.ids().next_id(),
            course_id: course.id,
            kind: payload.kind,
            title: title.to_string(),
            description: payload.description,
            questions: SqlJson(questions),
            total_points: payload.total_points,
            passing_score: payload.passing_score,
            available_from: payload.available_from.map(to_primitive_utc),
            due_at: payload.due_at.map(to_primitive_utc),
            created_by: user.id,
            created_at: primitive_now_utc(),
        })
        .await?;

    tracing::info!(
        assessment_id = %assessment.id,
        course_id = %assessment.course_id,
        kind = assessment.kind.as_str(),
        "Assessment created"
    );
    Ok((StatusCode::CREATED, Json(AssessmentResponse::from_db(assessment, true))))
}
