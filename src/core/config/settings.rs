use super::parsing::{
    env_optional, env_or_default, normalize_base_url, parse_bool, parse_cors_origins,
    parse_environment, parse_u16, parse_u32, parse_u64,
};
use super::types::{
    ApiSettings, ConfigError, CorsSettings, DatabaseSettings, IdentitySettings,
    QuestionBankSettings, RuntimeSettings, ServerHost, ServerPort, ServerSettings, Settings,
    TelemetrySettings,
};

const DEFAULT_QUESTION_BANK_URL: &str = "http://localhost:8082/api";

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("RESULTS_HOST", "0.0.0.0");
        let port = env_or_default("RESULTS_PORT", "8083");

        let environment =
            parse_environment(env_optional("RESULTS_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("RESULTS_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Quiz Results API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_prefix = env_or_default("API_PREFIX", "/api");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "quiz_results");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "quiz_results");
        let database_url = env_optional("DATABASE_URL");
        let max_connections = parse_u32(
            "DATABASE_MAX_CONNECTIONS",
            env_or_default("DATABASE_MAX_CONNECTIONS", "20"),
        )?;

        let question_bank_url = env_optional("QUESTION_BANK_URL");
        let question_bank_url_explicit = question_bank_url.is_some();
        let question_bank_url = normalize_base_url(
            question_bank_url.unwrap_or_else(|| DEFAULT_QUESTION_BANK_URL.to_string()),
        );
        let question_bank_timeout = parse_u64(
            "QUESTION_BANK_TIMEOUT_SECONDS",
            env_or_default("QUESTION_BANK_TIMEOUT_SECONDS", "5"),
        )?;
        let question_bank_connect_timeout = parse_u64(
            "QUESTION_BANK_CONNECT_TIMEOUT_SECONDS",
            env_or_default("QUESTION_BANK_CONNECT_TIMEOUT_SECONDS", "2"),
        )?;

        let user_id_header = env_or_default("USER_ID_HEADER", "x-user-id").to_ascii_lowercase();

        let log_level = env_or_default("RESULTS_LOG_LEVEL", "info");
        let json =
            env_optional("RESULTS_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_prefix },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
                max_connections,
            },
            question_bank: QuestionBankSettings {
                base_url: question_bank_url,
                base_url_explicit: question_bank_url_explicit,
                timeout_seconds: question_bank_timeout,
                connect_timeout_seconds: question_bank_connect_timeout,
            },
            identity: IdentitySettings { user_id_header },
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

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn question_bank(&self) -> &QuestionBankSettings {
        &self.question_bank
    }

    pub(crate) fn identity(&self) -> &IdentitySettings {
        &self.identity
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.question_bank.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "QUESTION_BANK_TIMEOUT_SECONDS",
                value: "0".to_string(),
            });
        }

        if self.question_bank.connect_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "QUESTION_BANK_CONNECT_TIMEOUT_SECONDS",
                value: "0".to_string(),
            });
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "DATABASE_MAX_CONNECTIONS",
                value: "0".to_string(),
            });
        }

        if !self.api.api_prefix.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "API_PREFIX",
                value: self.api.api_prefix.clone(),
            });
        }

        if self.identity.user_id_header.is_empty()
            || axum::http::HeaderName::from_bytes(self.identity.user_id_header.as_bytes()).is_err()
        {
            return Err(ConfigError::InvalidValue {
                field: "USER_ID_HEADER",
                value: self.identity.user_id_header.clone(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }
        if !self.question_bank.base_url_explicit {
            return Err(ConfigError::MissingSecret("QUESTION_BANK_URL"));
        }

        Ok(())
    }

    /// Fixed settings for in-process router tests; never reads the environment.
    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        use super::types::Environment;

        Self {
            server: ServerSettings {
                host: ServerHost("127.0.0.1".to_string()),
                port: ServerPort(8083),
            },
            runtime: RuntimeSettings { environment: Environment::Test, strict_config: false },
            api: ApiSettings {
                project_name: "Quiz Results API".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                api_prefix: "/api".to_string(),
            },
            cors: CorsSettings { origins: vec!["http://localhost:3000".to_string()] },
            database: DatabaseSettings {
                postgres_server: "localhost".to_string(),
                postgres_port: 5432,
                postgres_user: "quiz_results_test".to_string(),
                postgres_password: "quiz_results_test".to_string(),
                postgres_db: "quiz_results_test".to_string(),
                database_url: None,
                max_connections: 1,
            },
            question_bank: QuestionBankSettings {
                base_url: "http://127.0.0.1:9".to_string(),
                base_url_explicit: true,
                timeout_seconds: 1,
                connect_timeout_seconds: 1,
            },
            identity: IdentitySettings { user_id_header: "x-user-id".to_string() },
            telemetry: TelemetrySettings {
                log_level: "error".to_string(),
                json: false,
                prometheus_enabled: false,
            },
        }
    }

    #[cfg(test)]
    pub(crate) fn with_prometheus_enabled(mut self) -> Self {
        self.telemetry.prometheus_enabled = true;
        self
    }
}
