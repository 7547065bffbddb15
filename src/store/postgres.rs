use async_trait::async_trait;
use sqlx::{Connection, PgPool};

use super::{Store, StoreError, StoreResult};
use crate::db::models::{
    Announcement, Assessment, Course, Enrollment, Notification, Submission, User,
};
use crate::repositories;

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub(crate) struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn insert_error(err: sqlx::Error, entity: &'static str, id: &str) -> StoreError {
    let is_duplicate = err
        .as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION);
    if is_duplicate {
        StoreError::Duplicate { entity, id: id.to_string() }
    } else {
        StoreError::Database(err)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.pool.acquire().await?;
        conn.ping().await?;
        Ok(())
    }

    async fn find_user(&self, user_id: &str) -> StoreResult<Option<User>> {
        Ok(repositories::users::find_by_id(&self.pool, user_id).await?)
    }

    async fn insert_user(&self, user: User) -> StoreResult<User> {
        repositories::users::create(&self.pool, &user)
            .await
            .map_err(|err| insert_error(err, "user", &user.id))
    }

    async fn find_course(&self, course_id: &str) -> StoreResult<Option<Course>> {
        Ok(repositories::courses::find_by_id(&self.pool, course_id).await?)
    }

    async fn insert_course(&self, course: Course) -> StoreResult<Course> {
        repositories::courses::create(&self.pool, &course)
            .await
            .map_err(|err| insert_error(err, "course", &course.id))
    }

    async fn insert_enrollment(&self, enrollment: Enrollment) -> StoreResult<Enrollment> {
        repositories::enrollments::create(&self.pool, &enrollment)
            .await
            .map_err(|err| insert_error(err, "enrollment", &enrollment.id))
    }

    async fn is_enrolled(&self, course_id: &str, student_id: &str) -> StoreResult<bool> {
        Ok(repositories::enrollments::exists(&self.pool, course_id, student_id).await?)
    }

    async fn list_student_ids(&self, course_id: &str) -> StoreResult<Vec<String>> {
        Ok(repositories::enrollments::list_student_ids(&self.pool, course_id).await?)
    }

    async fn find_assessment(&self, assessment_id: &str) -> StoreResult<Option<Assessment>> {
        Ok(repositories::assessments::find_by_id(&self.pool, assessment_id).await?)
    }

    async fn insert_assessment(&self, assessment: Assessment) -> StoreResult<Assessment> {
        repositories::assessments::create(&self.pool, &assessment)
            .await
            .map_err(|err| insert_error(err, "assessment", &assessment.id))
    }

    async fn find_submission(&self, submission_id: &str) -> StoreResult<Option<Submission>> {
        Ok(repositories::submissions::find_by_id(&self.pool, submission_id).await?)
    }

    async fn list_submissions(&self, assessment_id: &str) -> StoreResult<Vec<Submission>> {
        Ok(repositories::submissions::list_by_assessment(&self.pool, assessment_id).await?)
    }

    async fn insert_submission(&self, submission: Submission) -> StoreResult<Submission> {
        repositories::submissions::create(&self.pool, &submission)
            .await
            .map_err(|err| insert_error(err, "submission", &submission.id))
    }

    async fn update_submission(&self, submission: &Submission) -> StoreResult<()> {
        let touched = repositories::submissions::update_grading(&self.pool, submission).await?;
        if touched == 0 {
            return Err(StoreError::Missing { entity: "submission", id: submission.id.clone() });
        }
        Ok(())
    }

    async fn insert_announcement(&self, announcement: Announcement) -> StoreResult<Announcement> {
        repositories::announcements::create(&self.pool, &announcement)
            .await
            .map_err(|err| insert_error(err, "announcement", &announcement.id))
    }

    async fn list_announcements(&self, course_id: &str) -> StoreResult<Vec<Announcement>> {
        Ok(repositories::announcements::list_by_course(&self.pool, course_id).await?)
    }

    async fn insert_notification(&self, notification: Notification) -> StoreResult<Notification> {
        repositories::notifications::create(&self.pool, &notification)
            .await
            .map_err(|err| insert_error(err, "notification", &notification.id))
    }

    async fn list_notifications(
        &self,
        recipient_id: &str,
        unread_only: bool,
        limit: usize,
    ) -> StoreResult<Vec<Notification>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        Ok(repositories::notifications::list_for_recipient(
            &self.pool,
            recipient_id,
            unread_only,
            limit,
        )
        .await?)
    }

    async fn count_unread(&self, recipient_id: &str) -> StoreResult<u64> {
        let count = repositories::notifications::count_unread(&self.pool, recipient_id).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn set_notification_read(
        &self,
        recipient_id: &str,
        notification_id: &str,
        read: bool,
    ) -> StoreResult<Option<Notification>> {
        Ok(repositories::notifications::set_read(&self.pool, recipient_id, notification_id, read)
            .await?)
    }

    async fn mark_all_read(&self, recipient_id: &str) -> StoreResult<u64> {
        Ok(repositories::notifications::mark_all_read(&self.pool, recipient_id).await?)
    }
}
