use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;
use sqlx::types::Json;

use crate::core::ids::IdGenerator;
use crate::core::metrics;
use crate::core::time::primitive_now_utc;
use crate::db::models::Notification;
use crate::db::types::NotificationType;
use crate::services::ServiceResult;
use crate::store::Store;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NotificationEvent {
    GradePosted {
        student_id: String,
        course_id: String,
        assessment_id: String,
        submission_id: String,
        assessment_title: String,
        grade_percent: f64,
    },
    AnnouncementCreated {
        course_id: String,
        announcement_id: String,
        title: String,
        message: String,
    },
}

impl NotificationEvent {
    fn notification_type(&self) -> NotificationType {
        match self {
            Self::GradePosted { .. } => NotificationType::Grade,
            Self::AnnouncementCreated { .. } => NotificationType::Announcement,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct FanoutOutcome {
    pub(crate) delivered: Vec<Notification>,
    pub(crate) failed: Vec<String>,
}

/// First occurrence wins; later duplicates are dropped.
pub(crate) fn plan_recipients(student_ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(student_ids.len());
    student_ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

pub(crate) fn build_notifications(
    event: &NotificationEvent,
    recipients: &[String],
    ids: &dyn IdGenerator,
) -> Vec<Notification> {
    let (title, message, metadata) = match event {
        NotificationEvent::GradePosted {
            course_id,
            assessment_id,
            submission_id,
            assessment_title,
            grade_percent,
            ..
        } => (
            format!("Grade posted: {assessment_title}"),
            format!("Your submission for \"{assessment_title}\" was graded: {grade_percent}%"),
            json!({
                "course_id": course_id,
                "assessment_id": assessment_id,
                "submission_id": submission_id,
                "grade_percent": grade_percent,
            }),
        ),
        NotificationEvent::AnnouncementCreated { course_id, announcement_id, title, message } => (
            title.clone(),
            message.clone(),
            json!({
                "course_id": course_id,
                "announcement_id": announcement_id,
            }),
        ),
    };

    recipients
        .iter()
        .map(|recipient_id| Notification {
            id: ids.next_id(),
            recipient_id: recipient_id.clone(),
            notification_type: event.notification_type(),
            title: title.clone(),
            message: message.clone(),
            is_read: false,
            metadata: Json(metadata.clone()),
            created_at: primitive_now_utc(),
        })
        .collect()
}

#[derive(Clone)]
pub(crate) struct NotificationFanout {
    store: Arc<dyn Store>,
    ids: Arc<dyn IdGenerator>,
}

impl NotificationFanout {
    pub(crate) fn new(store: Arc<dyn Store>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { store, ids }
    }

    /// Persists one notification per recipient of `event`.
    ///
    /// Only the recipient lookup can fail the call; individual inserts that
    /// fail are logged and reported in `FanoutOutcome::failed`.
    pub(crate) async fn notify(&self, event: NotificationEvent) -> ServiceResult<FanoutOutcome> {
        let recipients = match &event {
            NotificationEvent::GradePosted { student_id, .. } => vec![student_id.clone()],
            NotificationEvent::AnnouncementCreated { course_id, .. } => {
                plan_recipients(self.store.list_student_ids(course_id).await?)
            }
        };

        let notification_type = event.notification_type();
        let mut outcome = FanoutOutcome::default();
        for notification in build_notifications(&event, &recipients, self.ids.as_ref()) {
            let recipient_id = notification.recipient_id.clone();
            match self.store.insert_notification(notification).await {
                Ok(stored) => outcome.delivered.push(stored),
                Err(err) => {
                    tracing::error!(
                        error = %err,
                        recipient_id = %recipient_id,
                        notification_type = notification_type.as_str(),
                        "Failed to store notification"
                    );
                    metrics::notification_failed(notification_type);
                    outcome.failed.push(recipient_id);
                }
            }
        }

        metrics::notifications_created(notification_type, outcome.delivered.len());
        tracing::info!(
            notification_type = notification_type.as_str(),
            delivered = outcome.delivered.len(),
            failed = outcome.failed.len(),
            "Notification fan-out finished"
        );

        Ok(outcome)
    }
}
