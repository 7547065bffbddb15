use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::Notification;
use crate::db::types::NotificationType;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NotificationListQuery {
    #[serde(default, alias = "unreadOnly")]
    pub(crate) unread_only: Option<bool>,
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NotificationUpdate {
    #[serde(alias = "isRead", alias = "is_read")]
    pub(crate) read: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct NotificationResponse {
    pub(crate) id: String,
    pub(crate) recipient_id: String,
    #[serde(rename = "type")]
    pub(crate) notification_type: NotificationType,
    pub(crate) title: String,
    pub(crate) message: String,
    pub(crate) read: bool,
    pub(crate) metadata: serde_json::Value,
    pub(crate) created_at: String,
}

impl NotificationResponse {
    pub(crate) fn from_db(notification: Notification) -> Self {
        Self {
            id: notification.id,
            recipient_id: notification.recipient_id,
            notification_type: notification.notification_type,
            title: notification.title,
            message: notification.message,
            read: notification.is_read,
            metadata: notification.metadata.0,
            created_at: format_primitive(notification.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UnreadCountResponse {
    pub(crate) unread: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct MarkAllReadResponse {
    pub(crate) updated: u64,
}
