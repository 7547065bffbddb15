use std::sync::Arc;

use crate::core::ids::IdGenerator;
use crate::core::time::primitive_now_utc;
use crate::db::models::Announcement;
use crate::services::notifications::{NotificationEvent, NotificationFanout};
use crate::services::{ServiceError, ServiceResult};
use crate::store::Store;

#[derive(Debug, Clone, Default)]
pub(crate) struct CreateAnnouncement {
    pub(crate) course_id: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) message: Option<String>,
}

fn required(value: Option<&str>, field: &str) -> ServiceResult<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ServiceError::validation(format!("{field} is required")))
}

#[derive(Clone)]
pub(crate) struct AnnouncementService {
    store: Arc<dyn Store>,
    ids: Arc<dyn IdGenerator>,
    fanout: NotificationFanout,
}

impl AnnouncementService {
    pub(crate) fn new(
        store: Arc<dyn Store>,
        ids: Arc<dyn IdGenerator>,
        fanout: NotificationFanout,
    ) -> Self {
        Self { store, ids, fanout }
    }

    /// Field checks run before any lookup so a bad request never reaches the store.
    pub(crate) fn validate(request: &CreateAnnouncement) -> ServiceResult<(String, String, String)> {
        let course_id = required(request.course_id.as_deref(), "course_id")?;
        let title = required(request.title.as_deref(), "title")?;
        let message = required(request.message.as_deref(), "message")?;
        Ok((course_id, title, message))
    }

    pub(crate) async fn create(
        &self,
        author_id: &str,
        course_id: String,
        title: String,
        message: String,
    ) -> ServiceResult<Announcement> {
        if self.store.find_course(&course_id).await?.is_none() {
            return Err(ServiceError::not_found("Course not found"));
        }

        let announcement = self
            .store
            .insert_announcement(Announcement {
                id: self.ids.next_id(),
                course_id,
                author_id: author_id.to_string(),
                title,
                message,
                created_at: primitive_now_utc(),
            })
            .await?;

        let event = NotificationEvent::AnnouncementCreated {
            course_id: announcement.course_id.clone(),
            announcement_id: announcement.id.clone(),
            title: announcement.title.clone(),
            message: announcement.message.clone(),
        };
        if let Err(err) = self.fanout.notify(event).await {
            tracing::error!(
                error = %err,
                announcement_id = %announcement.id,
                "Failed to fan out announcement"
            );
        }

        Ok(announcement)
    }

    pub(crate) async fn list(&self, course_id: &str) -> ServiceResult<Vec<Announcement>> {
        Ok(self.store.list_announcements(course_id).await?)
    }
}
