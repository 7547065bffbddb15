//! Persistence boundary.
//!
//! Services receive an `Arc<dyn Store>` at construction and never reach for a
//! concrete backend. `MemoryStore` keeps everything in process memory; `PgStore`
//! maps each call onto the query functions in `crate::repositories`.

pub(crate) mod memory;
pub(crate) mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::config::{Settings, StoreBackend};
use crate::db::models::{
    Announcement, Assessment, Course, Enrollment, Notification, Submission, User,
};

pub(crate) use memory::MemoryStore;
pub(crate) use postgres::PgStore;

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("duplicate {entity} id: {id}")]
    Duplicate { entity: &'static str, id: String },
    #[error("{entity} {id} does not exist")]
    Missing { entity: &'static str, id: String },
    #[error("store rejected write: {0}")]
    Rejected(String),
}

pub(crate) type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub(crate) trait Store: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    async fn find_user(&self, user_id: &str) -> StoreResult<Option<User>>;
    async fn insert_user(&self, user: User) -> StoreResult<User>;

    async fn find_course(&self, course_id: &str) -> StoreResult<Option<Course>>;
    async fn insert_course(&self, course: Course) -> StoreResult<Course>;

    async fn insert_enrollment(&self, enrollment: Enrollment) -> StoreResult<Enrollment>;
    async fn is_enrolled(&self, course_id: &str, student_id: &str) -> StoreResult<bool>;
    /// One entry per enrollment record, in enrollment order. Duplicates are kept.
    async fn list_student_ids(&self, course_id: &str) -> StoreResult<Vec<String>>;

    async fn find_assessment(&self, assessment_id: &str) -> StoreResult<Option<Assessment>>;
    async fn insert_assessment(&self, assessment: Assessment) -> StoreResult<Assessment>;

    async fn find_submission(&self, submission_id: &str) -> StoreResult<Option<Submission>>;
    async fn list_submissions(&self, assessment_id: &str) -> StoreResult<Vec<Submission>>;
    async fn insert_submission(&self, submission: Submission) -> StoreResult<Submission>;
    /// Replaces the stored record with the same id.
    async fn update_submission(&self, submission: &Submission) -> StoreResult<()>;

    async fn insert_announcement(&self, announcement: Announcement) -> StoreResult<Announcement>;
    /// Newest first.
    async fn list_announcements(&self, course_id: &str) -> StoreResult<Vec<Announcement>>;

    async fn insert_notification(&self, notification: Notification) -> StoreResult<Notification>;
    /// Newest first, at most `limit` entries.
    async fn list_notifications(
        &self,
        recipient_id: &str,
        unread_only: bool,
        limit: usize,
    ) -> StoreResult<Vec<Notification>>;
    async fn count_unread(&self, recipient_id: &str) -> StoreResult<u64>;
    /// `None` when the notification does not exist or belongs to someone else.
    async fn set_notification_read(
        &self,
        recipient_id: &str,
        notification_id: &str,
        read: bool,
    ) -> StoreResult<Option<Notification>>;
    async fn mark_all_read(&self, recipient_id: &str) -> StoreResult<u64>;
}

pub(crate) async fn from_settings(settings: &Settings) -> anyhow::Result<Arc<dyn Store>> {
    match settings.store().backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::default()))
        }
        StoreBackend::Postgres => {
            let pool = crate::db::connect(settings).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}
