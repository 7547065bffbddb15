use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::validation::{clamp_limit, JsonBody};
use crate::core::state::AppState;
use crate::schemas::notification::{
    MarkAllReadResponse, NotificationListQuery, NotificationResponse, NotificationUpdate,
    UnreadCountResponse,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/read-all", post(mark_all_read))
        .route("/:notification_id", patch(update_notification))
}

async fn list_notifications(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let settings = state.settings().notifications();
    let limit = clamp_limit(query.limit, settings.default_page_limit, settings.max_page_limit)?;

    let notifications = state
        .store()
        .list_notifications(&user.id, query.unread_only.unwrap_or(false), limit)
        .await?;
    Ok(Json(notifications.into_iter().map(NotificationResponse::from_db).collect()))
}

async fn unread_count(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let unread = state.store().count_unread(&user.id).await?;
    Ok(Json(UnreadCountResponse { unread }))
}

/// Someone else's notification is reported as missing.
async fn update_notification(
    Path(notification_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NotificationUpdate>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let notification = state
        .store()
        .set_notification_read(&user.id, &notification_id, payload.read)
        .await?
        .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;

    Ok(Json(NotificationResponse::from_db(notification)))
}

async fn mark_all_read(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<MarkAllReadResponse>, ApiError> {
    let updated = state.store().mark_all_read(&user.id).await?;
    tracing::debug!(recipient_id = %user.id, updated, "Notifications marked as read");
    Ok(Json(MarkAllReadResponse { updated }))
}
