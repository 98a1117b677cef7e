//! Runtime configuration loaded from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! `main` loads `.env` (if present) through `dotenvy`, then builds one
//! `AppConfig` that is shared by routes and background tasks. Every knob has
//! a default so the service starts with no environment at all; without
//! `DATABASE_URL` it runs purely in memory.

use time::{Date, OffsetDateTime, UtcOffset};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_FLUSH_INTERVAL_MS: u64 = 500;
const DEFAULT_MAX_PARTICIPANTS: usize = 100;
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Postgres connection string. `None` disables persistence.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    /// Delay between persistence flush cycles.
    pub flush_interval_ms: u64,
    /// Participants allowed per poll.
    pub max_participants: usize,
    /// Origin used to build share links, without trailing slash.
    pub public_base_url: String,
    /// Offset used to decide what "today" is for candidate dates.
    pub utc_offset_hours: i8,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            max_participants: DEFAULT_MAX_PARTICIPANTS,
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_owned(),
            utc_offset_hours: 0,
        }
    }
}

impl AppConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let public_base_url = env_nonempty("PUBLIC_BASE_URL")
            .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();

        Self {
            port: env_parse("PORT", DEFAULT_PORT),
            database_url: env_nonempty("DATABASE_URL"),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            flush_interval_ms: env_parse("POLL_FLUSH_INTERVAL_MS", DEFAULT_FLUSH_INTERVAL_MS),
            max_participants: env_parse("MAX_PARTICIPANTS", DEFAULT_MAX_PARTICIPANTS),
            public_base_url,
            utc_offset_hours: env_parse::<i8>("UTC_OFFSET_HOURS", 0).clamp(-23, 23),
        }
    }

    #[must_use]
    pub fn offset(&self) -> UtcOffset {
        UtcOffset::from_hms(self.utc_offset_hours, 0, 0).unwrap_or(UtcOffset::UTC)
    }

    /// Current instant in the configured offset.
    #[must_use]
    pub fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset())
    }

    #[must_use]
    pub fn today(&self) -> Date {
        self.now().date()
    }

    /// Absolute link to a poll's page.
    #[must_use]
    pub fn share_url(&self, poll_id: uuid::Uuid) -> String {
        format!("{}/poll/{poll_id}", self.public_base_url)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
