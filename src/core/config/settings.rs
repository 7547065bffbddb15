use super::parsing::{
    env_flag, env_number, env_optional, env_or_default, env_positive, parse_cors_origins,
    parse_environment, parse_store_backend,
};
use super::secret::load_or_create_secret_key;
use super::types::{
    AdminSettings, ApiSettings, ConfigError, CorsSettings, DatabaseSettings, GradingSettings,
    NotificationSettings, RuntimeSettings, SecuritySettings, ServerHost, ServerPort,
    ServerSettings, Settings, StoreBackend, StoreSettings, TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("COURSEFLOW_HOST", "0.0.0.0");
        let port = env_or_default("COURSEFLOW_PORT", "8000");

        let environment = parse_environment(
            env_optional("COURSEFLOW_ENV").or_else(|| env_optional("ENVIRONMENT")),
        );
        let strict_config = env_flag("COURSEFLOW_STRICT_CONFIG") || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Courseflow API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let secret_key = match env_optional("SECRET_KEY") {
            Some(value) => value,
            None => load_or_create_secret_key(),
        };

        let access_token_expire_minutes = env_number("ACCESS_TOKEN_EXPIRE_MINUTES", 10080_u64)?;
        let algorithm = env_or_default("ALGORITHM", "HS256");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let backend = parse_store_backend(env_optional("COURSEFLOW_STORE"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = env_number("POSTGRES_PORT", 5432_u16)?;
        let postgres_user = env_or_default("POSTGRES_USER", "courseflow");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "courseflow");
        let database_url = env_optional("DATABASE_URL");
        let max_connections = env_number("POSTGRES_MAX_CONNECTIONS", 20_u32)?;

        let max_feedback_chars = env_positive("MAX_FEEDBACK_CHARS", 5000)?;

        let default_page_limit = env_positive("NOTIFICATION_PAGE_LIMIT", 50)?;
        let max_page_limit = env_positive("NOTIFICATION_MAX_PAGE_LIMIT", 200)?;

        let first_admin_id = env_or_default("FIRST_ADMIN_ID", "");
        let first_admin_name = env_or_default("FIRST_ADMIN_NAME", "Platform Admin");

        let log_level = env_or_default("COURSEFLOW_LOG_LEVEL", "info");
        let json = env_flag("COURSEFLOW_LOG_JSON");
        let prometheus_enabled = env_flag("PROMETHEUS_ENABLED");

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            security: SecuritySettings { secret_key, access_token_expire_minutes, algorithm },
            cors: CorsSettings { origins: cors_origins },
            store: StoreSettings { backend },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
                max_connections,
            },
            grading: GradingSettings { max_feedback_chars },
            notifications: NotificationSettings { default_page_limit, max_page_limit },
            admin: AdminSettings { first_admin_id, first_admin_name },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;

        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn store(&self) -> &StoreSettings {
        &self.store
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn grading(&self) -> &GradingSettings {
        &self.grading
    }

    pub(crate) fn notifications(&self) -> &NotificationSettings {
        &self.notifications
    }

    pub(crate) fn admin(&self) -> &AdminSettings {
        &self.admin
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.notifications.default_page_limit > self.notifications.max_page_limit {
            return Err(ConfigError::InvalidValue {
                field: "NOTIFICATION_PAGE_LIMIT",
                value: self.notifications.default_page_limit.to_string(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.store.backend == StoreBackend::Postgres
            && self.database.database_url.is_none()
            && self.database.postgres_password.is_empty()
        {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn defaults_select_memory_store() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();

        let settings = Settings::load().expect("settings");
        assert_eq!(settings.store().backend, StoreBackend::Memory);
        assert_eq!(settings.api().api_v1_str, "/api/v1");
        assert_eq!(settings.notifications().default_page_limit, 50);
        assert_eq!(settings.grading().max_feedback_chars, 5000);
    }

    #[tokio::test]
    async fn strict_postgres_requires_password() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("COURSEFLOW_STORE", "postgres");
        std::env::set_var("COURSEFLOW_STRICT_CONFIG", "1");
        std::env::remove_var("DATABASE_URL");
        std::env::remove_var("POSTGRES_PASSWORD");

        let result = Settings::load();

        std::env::remove_var("COURSEFLOW_STORE");
        std::env::set_var("COURSEFLOW_STRICT_CONFIG", "0");

        assert!(matches!(result, Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"))));
    }

    #[tokio::test]
    async fn page_limit_cannot_exceed_maximum() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("NOTIFICATION_PAGE_LIMIT", "500");

        let result = Settings::load();

        std::env::remove_var("NOTIFICATION_PAGE_LIMIT");

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { field: "NOTIFICATION_PAGE_LIMIT", .. })
        ));
    }
}
