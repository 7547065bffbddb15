use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::api::validation::{validate_payload, JsonBody};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::User;
use crate::schemas::user::{UserCreate, UserResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/me", get(me)).route("/", post(create_user))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from_db(user))
}

async fn create_user(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    validate_payload(&payload)?;

    let display_name = payload.display_name.trim();
    if display_name.is_empty() {
        return Err(ApiError::BadRequest("display_name must not be empty".to_string()));
    }
    let id = payload
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| state.ids().next_id());

    let user = state
        .store()
        .insert_user(User {
            id,
            display_name: display_name.to_string(),
            role: payload.role,
            is_active: payload.is_active,
            created_at: primitive_now_utc(),
        })
        .await?;

    tracing::info!(user_id = %user.id, role = ?user.role, created_by = %admin.id, "User created");
    Ok((StatusCode::CREATED, Json(UserResponse::from_db(user))))
}
