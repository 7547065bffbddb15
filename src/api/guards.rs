use async_trait::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::models::{Course, User};
use crate::db::types::UserRole;

pub(crate) struct CurrentUser(pub(crate) User);
pub(crate) struct CurrentAdmin(pub(crate) User);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CourseAccess {
    Instructor,
    Student,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let State(app_state) = State::<AppState>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to access application state"))?;

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let claims = security::verify_token(token, app_state.settings())
            .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

        let user = app_state
            .store()
            .find_user(&claims.sub)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load user"))?;

        let Some(user) = user else {
            return Err(ApiError::Unauthorized("User not found"));
        };

        if !user.is_active {
            return Err(ApiError::Unauthorized("Invalid authentication credentials"));
        }

        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if user.role == UserRole::Admin {
            Ok(CurrentAdmin(user))
        } else {
            Err(ApiError::Forbidden("Admin access required".to_string()))
        }
    }
}

pub(crate) fn require_author(user: &User) -> Result<(), ApiError> {
    if user.role.can_author() {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Instructor access required".to_string()))
    }
}

pub(crate) async fn load_course(state: &AppState, course_id: &str) -> Result<Course, ApiError> {
    state
        .store()
        .find_course(course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))
}

/// Admins and the course's own instructor.
pub(crate) fn require_course_instructor(user: &User, course: &Course) -> Result<(), ApiError> {
    if user.role == UserRole::Admin || course.instructor_id == user.id {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Not enough permissions for this course".to_string()))
    }
}

pub(crate) async fn require_course_member(
    state: &AppState,
    user: &User,
    course: &Course,
) -> Result<CourseAccess, ApiError> {
    if require_course_instructor(user, course).is_ok() {
        return Ok(CourseAccess::Instructor);
    }

    if state.store().is_enrolled(&course.id, &user.id).await? {
        return Ok(CourseAccess::Student);
    }

    Err(ApiError::Forbidden("Membership required for this course".to_string()))
}
