use async_trait::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::db::types::AssessmentKind;

/// `Json<T>` whose rejections render as a 400 `ApiError`.
pub(crate) struct JsonBody<T>(pub(crate) T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

pub(crate) fn validate_payload(payload: &impl Validate) -> Result<(), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Accepts both `exam` and `exams` style path segments.
pub(crate) fn parse_kind(raw: &str) -> Result<AssessmentKind, ApiError> {
    match raw.to_ascii_lowercase().as_str() {
        "assignment" | "assignments" => Ok(AssessmentKind::Assignment),
        "quiz" | "quizzes" => Ok(AssessmentKind::Quiz),
        "exam" | "exams" => Ok(AssessmentKind::Exam),
        _ => Err(ApiError::NotFound(format!("Unknown assessment kind '{raw}'"))),
    }
}

pub(crate) fn clamp_limit(requested: Option<usize>, default: usize, max: usize) -> Result<usize, ApiError> {
    match requested {
        None => Ok(default),
        Some(0) => Err(ApiError::BadRequest("limit must be at least 1".to_string())),
        Some(limit) if limit > max => {
            Err(ApiError::BadRequest(format!("limit must be at most {max}")))
        }
        Some(limit) => Ok(limit),
    }
}
