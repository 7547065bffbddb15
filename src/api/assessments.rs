use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{
    load_course, require_course_instructor, require_course_member, CourseAccess, CurrentUser,
};
use crate::api::validation::{parse_kind, JsonBody};
use crate::core::state::AppState;
use crate::db::models::Assessment;
use crate::db::types::AssessmentKind;
use crate::schemas::assessment::AssessmentResponse;
use crate::schemas::grading::GradeRequest;
use crate::schemas::submission::{SubmissionCreate, SubmissionResponse};
use crate::services::submission_intake::SubmitCommand;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:kind/:assessment_id", get(get_assessment))
        .route("/:kind/:assessment_id/submissions", post(submit).get(list_submissions))
        .route("/:kind/:assessment_id/grade", post(grade_submission))
}

async fn load_assessment(
    state: &AppState,
    kind: AssessmentKind,
    assessment_id: &str,
) -> Result<Assessment, ApiError> {
    state
        .store()
        .find_assessment(assessment_id)
        .await?
        .filter(|assessment| assessment.kind == kind)
        .ok_or_else(|| ApiError::NotFound(format!("{} not found", capitalized(kind))))
}

fn capitalized(kind: AssessmentKind) -> &'static str {
    match kind {
        AssessmentKind::Assignment => "Assignment",
        AssessmentKind::Quiz => "Quiz",
        AssessmentKind::Exam => "Exam",
    }
}

async fn get_assessment(
    Path((kind, assessment_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<AssessmentResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let assessment = load_assessment(&state, kind, &assessment_id).await?;
    let course = load_course(&state, &assessment.course_id).await?;
    let access = require_course_member(&state, &user, &course).await?;

    Ok(Json(AssessmentResponse::from_db(assessment, access == CourseAccess::Instructor)))
}

async fn submit(
    Path((kind, assessment_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SubmissionCreate>,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    let kind = parse_kind(&kind)?;

    let submission = state
        .intake()
        .submit(SubmitCommand {
            kind,
            assessment_id,
            student_id: user.id.clone(),
            content: payload.content,
            answers: payload.answers,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(SubmissionResponse::from_db(submission, Some(user.display_name)))))
}

async fn list_submissions(
    Path((kind, assessment_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubmissionResponse>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let assessment = load_assessment(&state, kind, &assessment_id).await?;
    let course = load_course(&state, &assessment.course_id).await?;
    require_course_instructor(&user, &course)?;

    let submissions = state.store().list_submissions(&assessment.id).await?;
    let mut names: HashMap<String, Option<String>> = HashMap::new();
    let mut items = Vec::with_capacity(submissions.len());
    for submission in submissions {
        if !names.contains_key(&submission.student_id) {
            let name = state
                .store()
                .find_user(&submission.student_id)
                .await?
                .map(|student| student.display_name);
            names.insert(submission.student_id.clone(), name);
        }
        let name = names.get(&submission.student_id).cloned().flatten();
        items.push(SubmissionResponse::from_db(submission, name));
    }

    Ok(Json(items))
}

async fn grade_submission(
    Path((kind, assessment_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<GradeRequest>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let assessment = load_assessment(&state, kind, &assessment_id).await?;
    let course = load_course(&state, &assessment.course_id).await?;
    require_course_instructor(&user, &course)?;

    let command =
        payload.into_command(kind, assessment.id, user.id).map_err(ApiError::BadRequest)?;
    let submission = state.grading().record_grade(command).await?;

    let student_name =
        state.store().find_user(&submission.student_id).await?.map(|student| student.display_name);
    Ok(Json(SubmissionResponse::from_db(submission, student_name)))
}

#[cfg(test)]
mod tests;
