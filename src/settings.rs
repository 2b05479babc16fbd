use crate::common::env::FromEnv;
use std::env;
use std::net::IpAddr;
use std::ops::Deref;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::Level;
use uuid::Uuid;

pub struct AppSettings {
    pub app_component: String,
    pub level: Level,
    pub app_host: IpAddr,
    pub app_port: u16,

    pub database_url: Option<String>,
    pub db_max_connections: usize,
    pub db_wait_timeout: Duration,

    pub redis_url: Option<String>,
    pub redis_max_connections: usize,
    pub redis_connection_timeout: Duration,
    pub redis_response_timeout: Duration,
    pub redis_wait_timeout: Duration,

    /// Match to attach the overlay to. A new one is created when unset.
    pub match_id: Option<Uuid>,
}

impl AppSettings {
    pub fn load_from_env() -> anyhow::Result<Self> {
        let _ = dotenv::dotenv();

        let app_component = env::var("APP_COMPONENT").unwrap_or_else(|_| "api".to_owned());
        let level = Level::from_env_or("LOG_LEVEL", Level::INFO)?;
        let app_host = IpAddr::from_env("APP_HOST")?;
        let app_port = u16::from_env("APP_PORT")?;

        let database_url = String::from_env_opt("DATABASE_URL")?;
        let db_max_connections = usize::from_env_or("DB_MAX_CONNECTIONS", 5)?;
        let db_wait_timeout_secs = u64::from_env_or("DB_WAIT_TIMEOUT_SECS", 5)?;
        let db_wait_timeout = Duration::from_secs(db_wait_timeout_secs);

        let redis_url = String::from_env_opt("REDIS_URL")?;
        let redis_max_connections = usize::from_env_or("REDIS_MAX_CONNECTIONS", 5)?;
        let redis_connection_timeout_secs = u64::from_env_or("REDIS_CONNECTION_TIMEOUT_SECS", 5)?;
        let redis_connection_timeout = Duration::from_secs(redis_connection_timeout_secs);
        let redis_response_timeout_secs = u64::from_env_or("REDIS_RESPONSE_TIMEOUT_SECS", 5)?;
        let redis_response_timeout = Duration::from_secs(redis_response_timeout_secs);
        let redis_wait_timeout_secs = u64::from_env_or("REDIS_WAIT_TIMEOUT_SECS", 5)?;
        let redis_wait_timeout = Duration::from_secs(redis_wait_timeout_secs);

        let match_id = Uuid::from_env_opt("MATCH_ID")?;

        Ok(AppSettings {
            app_component,
            level,
            app_port,
            app_host,

            database_url,
            db_max_connections,
            db_wait_timeout,

            redis_url,
            redis_max_connections,
            redis_connection_timeout,
            redis_response_timeout,
            redis_wait_timeout,

            match_id,
        })
    }

    /// Persistence and live sync need both the database and redis.
    pub fn backend_enabled(&self) -> bool {
        self.database_url.is_some() && self.redis_url.is_some()
    }

    pub fn get() -> &'static AppSettings {
        settings()
    }
}

pub fn settings() -> &'static AppSettings {
    static SETTINGS: LazyLock<AppSettings> =
        LazyLock::new(|| AppSettings::load_from_env().expect("Failed to load settings"));
    SETTINGS.deref()
}
