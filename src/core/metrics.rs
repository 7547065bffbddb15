use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;
use crate::db::types::{AssessmentKind, NotificationType};

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn grade_recorded(kind: AssessmentKind, mode: &'static str) {
    metrics::counter!(
        "grades_recorded_total",
        "kind" => kind.as_str(),
        "mode" => mode
    )
    .increment(1);
}

pub(crate) fn notifications_created(notification_type: NotificationType, count: usize) {
    metrics::counter!(
        "notifications_created_total",
        "type" => notification_type.as_str()
    )
    .increment(count as u64);
}

pub(crate) fn notification_failed(notification_type: NotificationType) {
    metrics::counter!(
        "notification_failures_total",
        "type" => notification_type.as_str()
    )
    .increment(1);
}
