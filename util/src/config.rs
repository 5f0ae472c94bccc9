//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. It provides
//! thread-safe access and mutation for testing or overrides in runtime environments.

use std::env;
use std::str::FromStr;
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
    pub problem_bank_path: String,
    pub sandbox_url: String,
    pub sandbox_language: String,
    pub sandbox_language_version: String,
    pub sandbox_compile_timeout_ms: u64,
    pub sandbox_run_timeout_ms: u64,
    pub sandbox_request_timeout_secs: u64,
    pub evaluation_step_delay_ms: u64,
    pub room_code_length: usize,
    pub room_mutation_max_retries: u32,
    pub battle_duration_seconds: i64,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

/// Reads `key` and parses it, falling back to `default` when unset or malformed.
fn parsed_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Ignoring malformed config value");
            default
        }),
        Err(_) => default,
    }
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Every key has a development default except `JWT_SECRET`, which falls back
    /// to an insecure placeholder outside of production only.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if app_env != "production" => "dev-only-secret".into(),
            Err(_) => panic!("JWT_SECRET is required in production"),
        };

        Self {
            env: app_env,
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "code-clash".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "api=info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "api.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "data/code_clash.db".into()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: parsed_or("PORT", 5001),
            jwt_secret,
            problem_bank_path: env::var("PROBLEM_BANK_PATH")
                .unwrap_or_else(|_| "data/problem_bank.json".into()),
            sandbox_url: env::var("SANDBOX_URL")
                .unwrap_or_else(|_| "https://emkc.org/api/v2/piston".into()),
            sandbox_language: env::var("SANDBOX_LANGUAGE").unwrap_or_else(|_| "python".into()),
            sandbox_language_version: env::var("SANDBOX_LANGUAGE_VERSION")
                .unwrap_or_else(|_| "3.10.0".into()),
            sandbox_compile_timeout_ms: parsed_or("SANDBOX_COMPILE_TIMEOUT_MS", 10_000),
            sandbox_run_timeout_ms: parsed_or("SANDBOX_RUN_TIMEOUT_MS", 3_000),
            sandbox_request_timeout_secs: parsed_or("SANDBOX_REQUEST_TIMEOUT_SECS", 30),
            evaluation_step_delay_ms: parsed_or("EVALUATION_STEP_DELAY_MS", 500),
            room_code_length: parsed_or("ROOM_CODE_LENGTH", 6),
            room_mutation_max_retries: parsed_or("ROOM_MUTATION_MAX_RETRIES", 8),
            battle_duration_seconds: parsed_or("BATTLE_DURATION_SECONDS", 30 * 60),
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
            let mut guard = lock
                .write()
                .expect("Failed to acquire AppConfig write lock");
            *guard = AppConfig::from_env();
        }
    }

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

    pub fn set_problem_bank_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.problem_bank_path = value.into());
    }

    pub fn set_sandbox_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.sandbox_url = value.into());
    }

    pub fn set_evaluation_step_delay_ms(value: u64) {
        AppConfig::set_field(|cfg| cfg.evaluation_step_delay_ms = value);
    }

    pub fn set_room_code_length(value: usize) {
        AppConfig::set_field(|cfg| cfg.room_code_length = value);
    }

    pub fn set_battle_duration_seconds(value: i64) {
        AppConfig::set_field(|cfg| cfg.battle_duration_seconds = value);
    }
}

// --- Free accessors, so call sites read `config::port()` ---

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

pub fn problem_bank_path() -> String {
    AppConfig::global().problem_bank_path.clone()
}

pub fn sandbox_url() -> String {
    AppConfig::global().sandbox_url.clone()
}

pub fn sandbox_language() -> String {
    AppConfig::global().sandbox_language.clone()
}

pub fn sandbox_language_version() -> String {
    AppConfig::global().sandbox_language_version.clone()
}

pub fn sandbox_compile_timeout_ms() -> u64 {
    AppConfig::global().sandbox_compile_timeout_ms
}

pub fn sandbox_run_timeout_ms() -> u64 {
    AppConfig::global().sandbox_run_timeout_ms
}

pub fn sandbox_request_timeout_secs() -> u64 {
    AppConfig::global().sandbox_request_timeout_secs
}

pub fn evaluation_step_delay_ms() -> u64 {
    AppConfig::global().evaluation_step_delay_ms
}

pub fn room_code_length() -> usize {
    AppConfig::global().room_code_length
}

pub fn room_mutation_max_retries() -> u32 {
    AppConfig::global().room_mutation_max_retries
}

pub fn battle_duration_seconds() -> i64 {
    AppConfig::global().battle_duration_seconds
}
