use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::Announcement;
use crate::services::announcements::CreateAnnouncement;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AnnouncementCreate {
    #[serde(default, alias = "courseId")]
    pub(crate) course_id: Option<String>,
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) message: Option<String>,
}

impl From<AnnouncementCreate> for CreateAnnouncement {
    fn from(value: AnnouncementCreate) -> Self {
        Self { course_id: value.course_id, title: value.title, message: value.message }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AnnouncementResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) author_id: String,
    pub(crate) title: String,
    pub(crate) message: String,
    pub(crate) created_at: String,
}

impl AnnouncementResponse {
    pub(crate) fn from_db(announcement: Announcement) -> Self {
        Self {
            id: announcement.id,
            course_id: announcement.course_id,
            author_id: announcement.author_id,
            title: announcement.title,
            message: announcement.message,
            created_at: format_primitive(announcement.created_at),
        }
    }
}
