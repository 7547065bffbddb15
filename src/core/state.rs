use std::sync::Arc;

use crate::core::{config::Settings, ids::IdGenerator};
use crate::services::announcements::AnnouncementService;
use crate::services::grading::GradingService;
use crate::services::notifications::NotificationFanout;
use crate::services::submission_intake::SubmissionIntake;
use crate::store::Store;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    store: Arc<dyn Store>,
    ids: Arc<dyn IdGenerator>,
    grading: GradingService,
    intake: SubmissionIntake,
    announcements: AnnouncementService,
}

impl AppState {
    pub(crate) fn new(settings: Settings, store: Arc<dyn Store>, ids: Arc<dyn IdGenerator>) -> Self {
        let fanout = NotificationFanout::new(store.clone(), ids.clone());
        let grading = GradingService::new(
            store.clone(),
            fanout.clone(),
            settings.grading().max_feedback_chars,
        );
        let intake = SubmissionIntake::new(store.clone(), ids.clone(), grading.clone());
        let announcements = AnnouncementService::new(store.clone(), ids.clone(), fanout);

        Self {
            inner: Arc::new(InnerState { settings, store, ids, grading, intake, announcements }),
        }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    pub(crate) fn ids(&self) -> &dyn IdGenerator {
        self.inner.ids.as_ref()
    }

    pub(crate) fn grading(&self) -> &GradingService {
        &self.inner.grading
    }

    pub(crate) fn intake(&self) -> &SubmissionIntake {
        &self.inner.intake
    }

    pub(crate) fn announcements(&self) -> &AnnouncementService {
        &self.inner.announcements
    }
}
