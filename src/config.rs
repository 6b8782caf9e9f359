use serde::Deserialize;
use tracing::warn;

const DEFAULT_SESSION_DAYS: i64 = 7;
/// Ten years.
const MAX_SESSION_DAYS: i64 = 3650;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub max_age_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let session = SessionConfig {
            max_age_days: session_days(env_or("SESSION_MAX_AGE_DAYS", DEFAULT_SESSION_DAYS)),
        };
        Ok(Self {
            database_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("APP_PORT", 3333),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            session,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn session_days(days: i64) -> i64 {
    if (1..=MAX_SESSION_DAYS).contains(&days) {
        days
    } else {
        warn!(days, "SESSION_MAX_AGE_DAYS out of range, using default");
        DEFAULT_SESSION_DAYS
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
