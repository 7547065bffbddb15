pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;
pub(crate) mod store;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use crate::core::{config::Settings, ids::UuidIds, security, state::AppState, telemetry};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let store = store::from_settings(&settings).await?;
    let state = AppState::new(settings, store, Arc::new(UuidIds));

    if let Err(err) = core::bootstrap::ensure_admin(&state).await {
        tracing::error!(error = %err, "Failed to ensure default admin");
    }
    let app = api::router::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        store = state.settings().store().backend.as_str(),
        "Courseflow API listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(core::shutdown::shutdown_signal()).await?;
    tracing::info!("Courseflow API stopped");

    Ok(())
}

/// Signs an access token for `user_id` with the configured secret.
///
/// Identity is owned by an upstream provider; this exists for operators and
/// local development.
pub fn issue_token(user_id: &str, expires_in_minutes: Option<i64>) -> anyhow::Result<String> {
    dotenvy::dotenv().ok();

    let user_id = user_id.trim();
    if user_id.is_empty() {
        anyhow::bail!("user id must not be empty");
    }

    let settings = Settings::load()?;
    let token = security::create_access_token(
        user_id,
        &settings,
        expires_in_minutes.map(time::Duration::minutes),
    )?;
    Ok(token)
}
