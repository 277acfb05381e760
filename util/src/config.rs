//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. It provides
//! thread-safe access and mutation for testing or overrides in runtime environments.

use chrono::FixedOffset;
use std::env;
use std::sync::{OnceLock, RwLock};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_duration_minutes: u64,
    /// Offset of the civil timezone used for attendance day/window arithmetic,
    /// in minutes east of UTC. The original deployment ran in CAT (+02:00).
    pub timezone_offset_minutes: i32,
    /// Seconds a queued scanner command may wait before the sweep drops it.
    pub scanner_command_ttl_seconds: u64,
    /// Seconds a device may stay silent before it is reported offline.
    pub scanner_offline_after_seconds: u64,
    /// Seconds a cached stats snapshot stays valid.
    pub stats_cache_ttl_seconds: u64,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Every value has a development default; panics only on values that are
    /// present but improperly formatted.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "rollcall".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "api=info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "api.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "data/rollcall.db".into()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".into())
                .parse()
                .unwrap(),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into()),
            jwt_duration_minutes: env::var("JWT_DURATION_MINUTES")
                .unwrap_or("60".into())
                .parse()
                .unwrap(),
            timezone_offset_minutes: env::var("TIMEZONE_OFFSET_MINUTES")
                .unwrap_or("120".into())
                .parse()
                .unwrap(),
            scanner_command_ttl_seconds: env::var("SCANNER_COMMAND_TTL_SECONDS")
                .unwrap_or("300".into())
                .parse()
                .unwrap(),
            scanner_offline_after_seconds: env::var("SCANNER_OFFLINE_AFTER_SECONDS")
                .unwrap_or("300".into())
                .parse()
                .unwrap(),
            stats_cache_ttl_seconds: env::var("STATS_CACHE_TTL_SECONDS")
                .unwrap_or("30".into())
                .parse()
                .unwrap(),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock cannot be acquired.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock.write().unwrap();
            *guard = AppConfig::from_env();
        }
    }

    /// Generic internal setter for any field in the config.
    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_database_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.database_path = value.into());
    }

    pub fn set_jwt_secret(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.jwt_secret = value.into());
    }

    pub fn set_timezone_offset_minutes(value: i32) {
        AppConfig::set_field(|cfg| cfg.timezone_offset_minutes = value);
    }

    pub fn set_stats_cache_ttl_seconds(value: u64) {
        AppConfig::set_field(|cfg| cfg.stats_cache_ttl_seconds = value);
    }
}

// --- Free accessor functions used throughout the workspace ---

pub fn env() -> String {
    AppConfig::global().env.clone()
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn database_path() -> String {
    AppConfig::global().database_path.clone()
}

pub fn host() -> String {
    AppConfig::global().host.clone()
}

pub fn port() -> u16 {
    AppConfig::global().port
}

pub fn jwt_secret() -> String {
    AppConfig::global().jwt_secret.clone()
}

pub fn jwt_duration_minutes() -> u64 {
    AppConfig::global().jwt_duration_minutes
}

/// The fixed civil timezone all attendance dates and exam windows are
/// computed in. Exposed as configuration rather than a hardcoded zone.
pub fn civil_timezone() -> FixedOffset {
    let minutes = AppConfig::global().timezone_offset_minutes;
    FixedOffset::east_opt(minutes * 60).expect("TIMEZONE_OFFSET_MINUTES out of range")
}

pub fn scanner_command_ttl_seconds() -> u64 {
    AppConfig::global().scanner_command_ttl_seconds
}

pub fn scanner_offline_after_seconds() -> u64 {
    AppConfig::global().scanner_offline_after_seconds
}

pub fn stats_cache_ttl_seconds() -> u64 {
    AppConfig::global().stats_cache_ttl_seconds
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn defaults_apply_when_env_is_unset() {
        AppConfig::reset();
        assert_eq!(project_name(), "rollcall");
        assert_eq!(port(), 5000);
        assert_eq!(civil_timezone().local_minus_utc(), 120 * 60);
        assert_eq!(stats_cache_ttl_seconds(), 30);
    }

    #[test]
    #[serial]
    fn setters_override_until_reset() {
        AppConfig::set_timezone_offset_minutes(0);
        assert_eq!(civil_timezone().local_minus_utc(), 0);

        AppConfig::reset();
        assert_eq!(civil_timezone().local_minus_utc(), 120 * 60);
    }
}
