use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    routing::post,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{load_course, require_course_instructor, CurrentUser};
use crate::api::validation::JsonBody;
use crate::core::state::AppState;
use crate::schemas::announcement::{AnnouncementCreate, AnnouncementResponse};
use crate::services::announcements::AnnouncementService;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", post(create_announcement))
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

async fn read_form(mut multipart: Multipart) -> Result<AnnouncementCreate, ApiError> {
    let mut payload = AnnouncementCreate::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart data".to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        let value = field
            .text()
            .await
            .map_err(|_| ApiError::BadRequest(format!("Failed to read field '{name}'")))?;
        match name.as_str() {
            "course_id" | "courseId" => payload.course_id = Some(value),
            "title" => payload.title = Some(value),
            "message" => payload.message = Some(value),
            _ => {}
        }
    }
    Ok(payload)
}

/// Accepts a JSON body or a multipart form with the same field names.
async fn create_announcement(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    request: Request,
) -> Result<(StatusCode, Json<AnnouncementResponse>), ApiError> {
    let payload = if is_multipart(&request) {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        read_form(multipart).await?
    } else {
        let JsonBody(payload) = JsonBody::<AnnouncementCreate>::from_request(request, &state).await?;
        payload
    };

    let (course_id, title, message) = AnnouncementService::validate(&payload.into())?;
    let course = load_course(&state, &course_id).await?;
    require_course_instructor(&user, &course)?;

    let announcement = state.announcements().create(&user.id, course.id, title, message).await?;
    Ok((StatusCode::CREATED, Json(AnnouncementResponse::from_db(announcement))))
}
