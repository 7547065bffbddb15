pub(crate) mod models;
pub(crate) mod types;

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};

use crate::core::config::Settings;

/// Opens the pool and applies embedded migrations before handing it out.
pub(crate) async fn connect(settings: &Settings) -> Result<PgPool, sqlx::Error> {
    let database = settings.database();
    let options: PgConnectOptions = database.database_url().parse()?;
    let options = options
        .application_name(&settings.api().project_name)
        .log_slow_statements(tracing::log::LevelFilter::Warn, Duration::from_millis(500));

    let pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .test_before_acquire(true)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!(
        host = %database.postgres_server,
        max_connections = database.max_connections,
        "PostgreSQL store ready"
    );

    Ok(pool)
}
