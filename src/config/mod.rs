use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub store: StoreConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub session: SessionConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub environment: String,
    pub rust_log: String,
}

// Настройки удалённого хранилища броней
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

// Настройки Circuit Breaker
#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub timeout_seconds: u64,
}

// Настройки клиентской сессии
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub success_notice_ttl_ms: u64,
    pub mutation_policy: MutationPolicy,
}

/// What happens to a second update/delete for a booking id whose previous
/// change has not completed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationPolicy {
    /// Wait behind the pending change; changes apply in the order they were issued.
    #[default]
    Queue,
    /// Fail immediately with a concurrent-mutation error.
    Reject,
}

impl FromStr for MutationPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "queue" => Ok(MutationPolicy::Queue),
            "reject" => Ok(MutationPolicy::Reject),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

impl SessionConfig {
    pub fn success_notice_ttl(&self) -> Duration {
        Duration::from_millis(self.success_notice_ttl_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            success_notice_ttl_ms: 3000,
            mutation_policy: MutationPolicy::Queue,
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            app: AppConfig {
                environment: text("ENVIRONMENT", "development"),
                rust_log: text("RUST_LOG", "flight_booking_client=info"),
            },
            store: StoreConfig {
                base_url: text("BOOKING_API_URL", "http://localhost:8000")
                    .trim_end_matches('/')
                    .to_string(),
                timeout_seconds: parsed(&lookup, "BOOKING_API_TIMEOUT_SECONDS", 30)?,
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: parsed(&lookup, "CIRCUIT_BREAKER_FAILURE_THRESHOLD", 5)?,
                timeout_seconds: parsed(&lookup, "CIRCUIT_BREAKER_TIMEOUT_SECONDS", 60)?,
            },
            session: SessionConfig {
                success_notice_ttl_ms: parsed(&lookup, "SUCCESS_NOTICE_TTL_MS", 3000)?,
                mutation_policy: parsed(&lookup, "MUTATION_POLICY", MutationPolicy::Queue)?,
            },
        })
    }
}

fn parsed<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
