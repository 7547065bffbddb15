#[cfg(test)]
use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Store, StoreError, StoreResult};
use crate::db::models::{
    Announcement, Assessment, Course, Enrollment, Notification, Submission, User,
};

#[derive(Default)]
pub(crate) struct MemoryStore {
    inner: RwLock<Collections>,
    #[cfg(test)]
    rejected_recipients: std::sync::Mutex<HashSet<String>>,
}

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    courses: Vec<Course>,
    enrollments: Vec<Enrollment>,
    assessments: Vec<Assessment>,
    submissions: Vec<Submission>,
    announcements: Vec<Announcement>,
    notifications: Vec<Notification>,
}

fn ensure_unique<T>(
    items: &[T],
    id: &str,
    entity: &'static str,
    id_of: impl Fn(&T) -> &str,
) -> StoreResult<()> {
    if items.iter().any(|item| id_of(item) == id) {
        return Err(StoreError::Duplicate { entity, id: id.to_string() });
    }
    Ok(())
}

impl MemoryStore {
    /// Makes every notification insert for `recipient_id` fail.
    #[cfg(test)]
    pub(crate) fn reject_notifications_for(&self, recipient_id: &str) {
        if let Ok(mut rejected) = self.rejected_recipients.lock() {
            rejected.insert(recipient_id.to_string());
        }
    }

    #[cfg(test)]
    pub(crate) async fn all_notifications(&self) -> Vec<Notification> {
        self.inner.read().await.notifications.clone()
    }

    #[cfg(test)]
    fn is_rejected(&self, recipient_id: &str) -> bool {
        self.rejected_recipients.lock().map(|set| set.contains(recipient_id)).unwrap_or(false)
    }

    #[cfg(not(test))]
    fn is_rejected(&self, _recipient_id: &str) -> bool {
        false
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        let _ = self.inner.read().await;
        Ok(())
    }

    async fn find_user(&self, user_id: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|user| user.id == user_id).cloned())
    }

    async fn insert_user(&self, user: User) -> StoreResult<User> {
        let mut inner = self.inner.write().await;
        ensure_unique(&inner.users, &user.id, "user", |item| &item.id)?;
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_course(&self, course_id: &str) -> StoreResult<Option<Course>> {
        let inner = self.inner.read().await;
        Ok(inner.courses.iter().find(|course| course.id == course_id).cloned())
    }

    async fn insert_course(&self, course: Course) -> StoreResult<Course> {
        let mut inner = self.inner.write().await;
        ensure_unique(&inner.courses, &course.id, "course", |item| &item.id)?;
        inner.courses.push(course.clone());
        Ok(course)
    }

    async fn insert_enrollment(&self, enrollment: Enrollment) -> StoreResult<Enrollment> {
        let mut inner = self.inner.write().await;
        ensure_unique(&inner.enrollments, &enrollment.id, "enrollment", |item| &item.id)?;
        inner.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn is_enrolled(&self, course_id: &str, student_id: &str) -> StoreResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .enrollments
            .iter()
            .any(|item| item.course_id == course_id && item.student_id == student_id))
    }

    async fn list_student_ids(&self, course_id: &str) -> StoreResult<Vec<String>> {
        let inner = self.inner.read().await;
        Ok(inner
            .enrollments
            .iter()
            .filter(|item| item.course_id == course_id)
            .map(|item| item.student_id.clone())
            .collect())
    }

    async fn find_assessment(&self, assessment_id: &str) -> StoreResult<Option<Assessment>> {
        let inner = self.inner.read().await;
        Ok(inner.assessments.iter().find(|item| item.id == assessment_id).cloned())
    }

    async fn insert_assessment(&self, assessment: Assessment) -> StoreResult<Assessment> {
        let mut inner = self.inner.write().await;
        ensure_unique(&inner.assessments, &assessment.id, "assessment", |item| &item.id)?;
        inner.assessments.push(assessment.clone());
        Ok(assessment)
    }

    async fn find_submission(&self, submission_id: &str) -> StoreResult<Option<Submission>> {
        let inner = self.inner.read().await;
        Ok(inner.submissions.iter().find(|item| item.id == submission_id).cloned())
    }

    async fn list_submissions(&self, assessment_id: &str) -> StoreResult<Vec<Submission>> {
        let inner = self.inner.read().await;
        Ok(inner
            .submissions
            .iter()
            .filter(|item| item.assessment_id == assessment_id)
            .cloned()
            .collect())
    }

    async fn insert_submission(&self, submission: Submission) -> StoreResult<Submission> {
        let mut inner = self.inner.write().await;
        ensure_unique(&inner.submissions, &submission.id, "submission", |item| &item.id)?;
        inner.submissions.push(submission.clone());
        Ok(submission)
    }

    async fn update_submission(&self, submission: &Submission) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let slot = inner
            .submissions
            .iter_mut()
            .find(|item| item.id == submission.id)
            .ok_or_else(|| StoreError::Missing {
                entity: "submission",
                id: submission.id.clone(),
            })?;
        *slot = submission.clone();
        Ok(())
    }

    async fn insert_announcement(&self, announcement: Announcement) -> StoreResult<Announcement> {
        let mut inner = self.inner.write().await;
        ensure_unique(&inner.announcements, &announcement.id, "announcement", |item| &item.id)?;
        inner.announcements.push(announcement.clone());
        Ok(announcement)
    }

    async fn list_announcements(&self, course_id: &str) -> StoreResult<Vec<Announcement>> {
        let inner = self.inner.read().await;
        let mut items: Vec<Announcement> = inner
            .announcements
            .iter()
            .rev()
            .filter(|item| item.course_id == course_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn insert_notification(&self, notification: Notification) -> StoreResult<Notification> {
        if self.is_rejected(&notification.recipient_id) {
            return Err(StoreError::Rejected(format!(
                "notifications for {} are disabled",
                notification.recipient_id
            )));
        }

        let mut inner = self.inner.write().await;
        ensure_unique(&inner.notifications, &notification.id, "notification", |item| &item.id)?;
        inner.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn list_notifications(
        &self,
        recipient_id: &str,
        unread_only: bool,
        limit: usize,
    ) -> StoreResult<Vec<Notification>> {
        let inner = self.inner.read().await;
        let mut items: Vec<Notification> = inner
            .notifications
            .iter()
            .rev()
            .filter(|item| item.recipient_id == recipient_id)
            .filter(|item| !unread_only || !item.is_read)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.truncate(limit);
        Ok(items)
    }

    async fn count_unread(&self, recipient_id: &str) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner
            .notifications
            .iter()
            .filter(|item| item.recipient_id == recipient_id && !item.is_read)
            .count() as u64)
    }

    async fn set_notification_read(
        &self,
        recipient_id: &str,
        notification_id: &str,
        read: bool,
    ) -> StoreResult<Option<Notification>> {
        let mut inner = self.inner.write().await;
        let Some(notification) = inner
            .notifications
            .iter_mut()
            .find(|item| item.id == notification_id && item.recipient_id == recipient_id)
        else {
            return Ok(None);
        };
        notification.is_read = read;
        Ok(Some(notification.clone()))
    }

    async fn mark_all_read(&self, recipient_id: &str) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        let mut updated = 0;
        for notification in inner
            .notifications
            .iter_mut()
            .filter(|item| item.recipient_id == recipient_id && !item.is_read)
        {
            notification.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }
}
