use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::infra::retry::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, RetryPolicy};

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat:free";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8080";

const CONFIG_DIR_NAME: &str = "crisis-desk";
const CONFIG_FILE_NAME: &str = "config.json";

const ENV_API_KEY: &str = "OPENROUTER_API_KEY";
const ENV_ENDPOINT: &str = "CRISIS_DESK_ENDPOINT";
const ENV_MODEL: &str = "CRISIS_DESK_MODEL";
const ENV_TIMEOUT_SECS: &str = "CRISIS_DESK_TIMEOUT_SECS";
const ENV_MAX_ATTEMPTS: &str = "CRISIS_DESK_MAX_ATTEMPTS";
const ENV_RETRY_DELAY_SECS: &str = "CRISIS_DESK_RETRY_DELAY_SECS";
const ENV_LISTEN: &str = "CRISIS_DESK_LISTEN";

/// Fully resolved settings for one server process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub listen: SocketAddr,
}

impl AppConfig {
    /// Stored config file, then environment variables on top.
    pub fn load() -> AppResult<Self> {
        let stored = StoredConfig::load()?;
        Self::resolve(&stored, |key| env::var(key).ok())
    }

    pub fn resolve(
        stored: &StoredConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let layered = |key: &str, file: &Option<String>| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .or_else(|| file.clone())
        };

        let timeout = layered(ENV_TIMEOUT_SECS, &stored.timeout_secs)
            .map(|raw| parse_timeout_secs(&raw).map_err(|err| in_setting(ENV_TIMEOUT_SECS, err)))
            .transpose()?;
        let max_attempts = layered(ENV_MAX_ATTEMPTS, &stored.max_attempts)
            .map(|raw| parse_max_attempts(&raw).map_err(|err| in_setting(ENV_MAX_ATTEMPTS, err)))
            .transpose()?;
        let retry_delay = layered(ENV_RETRY_DELAY_SECS, &stored.retry_delay_secs)
            .map(|raw| {
                parse_retry_delay_secs(&raw).map_err(|err| in_setting(ENV_RETRY_DELAY_SECS, err))
            })
            .transpose()?;
        let listen = layered(ENV_LISTEN, &stored.listen)
            .map(|raw| parse_listen(&raw).map_err(|err| in_setting(ENV_LISTEN, err)))
            .transpose()?;

        Ok(Self {
            api_key: layered(ENV_API_KEY, &stored.api_key),
            endpoint: layered(ENV_ENDPOINT, &stored.endpoint)
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            model: layered(ENV_MODEL, &stored.model).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: timeout.unwrap_or(DEFAULT_TIMEOUT),
            retry: RetryPolicy::new(
                max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
                retry_delay.unwrap_or(DEFAULT_RETRY_DELAY),
            ),
            listen: match listen {
                Some(addr) => addr,
                None => parse_listen(DEFAULT_LISTEN)?,
            },
        })
    }
}

/// Per-attempt timeout. Zero would fail every attempt before it starts.
pub fn parse_timeout_secs(raw: &str) -> AppResult<Duration> {
    match parse_number::<u64>("request timeout", raw)? {
        0 => Err(AppError::Configuration(
            "request timeout must be at least 1 second".to_string(),
        )),
        secs => Ok(Duration::from_secs(secs)),
    }
}

pub fn parse_max_attempts(raw: &str) -> AppResult<u32> {
    match parse_number::<u32>("attempts per stage", raw)? {
        0 => Err(AppError::Configuration(
            "attempts per stage must be at least 1".to_string(),
        )),
        attempts => Ok(attempts),
    }
}

/// Zero is allowed: retry immediately.
pub fn parse_retry_delay_secs(raw: &str) -> AppResult<Duration> {
    parse_number::<u64>("retry delay", raw).map(Duration::from_secs)
}

pub fn parse_listen(value: &str) -> AppResult<SocketAddr> {
    value
        .trim()
        .parse()
        .map_err(|err| AppError::Configuration(format!("invalid listen address '{value}': {err}")))
}

fn parse_number<T>(what: &str, raw: &str) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|err| AppError::Configuration(format!("invalid {what} '{raw}': {err}")))
}

fn in_setting(name: &str, err: AppError) -> AppError {
    match err {
        AppError::Configuration(message) => AppError::Configuration(format!("{name}: {message}")),
        other => other,
    }
}

/// Values persisted by `config init`. Everything is optional; unset values
/// fall back to the environment or built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_delay_secs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listen: Option<String>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        let path = config_file_path()?;
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        let path = config_file_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write config: {err}")))?;
        fs::write(&path, data)?;
        Ok(())
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or_else(|| {
            AppError::Configuration("could not determine the user config directory".to_string())
        })
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn falls_back_to_defaults() {
        let config = AppConfig::resolve(&StoredConfig::default(), env_of(&[])).unwrap();
        assert_eq!(config.api_key, None);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.retry, RetryPolicy::new(3, Duration::from_secs(2)));
        assert_eq!(config.listen, "127.0.0.1:8080".parse().unwrap());
    }

    #[test]
    fn environment_overrides_stored_values() {
        let stored = StoredConfig {
            api_key: Some("stored-key".to_string()),
            model: Some("stored/model".to_string()),
            max_attempts: Some("5".to_string()),
            ..StoredConfig::default()
        };
        let config = AppConfig::resolve(
            &stored,
            env_of(&[(ENV_API_KEY, "env-key"), (ENV_TIMEOUT_SECS, "30")]),
        )
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("env-key"));
        assert_eq!(config.model, "stored/model");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retry.max_attempts(), 5);
    }

    #[test]
    fn blank_environment_values_are_ignored() {
        let stored = StoredConfig {
            api_key: Some("stored-key".to_string()),
            ..StoredConfig::default()
        };
        let config = AppConfig::resolve(&stored, env_of(&[(ENV_API_KEY, "  ")])).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("stored-key"));
    }

    #[test]
    fn rejects_invalid_numbers() {
        let err =
            AppConfig::resolve(&StoredConfig::default(), env_of(&[(ENV_TIMEOUT_SECS, "ten")]))
                .unwrap_err();
        assert!(matches!(err, AppError::Configuration(message) if message.contains(ENV_TIMEOUT_SECS)));
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = AppConfig::resolve(&StoredConfig::default(), env_of(&[(ENV_TIMEOUT_SECS, "0")]))
            .unwrap_err();
        assert!(
            matches!(err, AppError::Configuration(message) if message.contains(ENV_TIMEOUT_SECS) && message.contains("at least 1 second"))
        );
    }

    #[test]
    fn zero_retry_delay_is_allowed() {
        let config = AppConfig::resolve(
            &StoredConfig::default(),
            env_of(&[(ENV_RETRY_DELAY_SECS, "0")]),
        )
        .unwrap();
        assert_eq!(config.retry.delay(), Duration::ZERO);
    }

    #[test]
    fn setting_parsers_trim_and_check_ranges() {
        assert_eq!(parse_timeout_secs(" 15 ").unwrap(), Duration::from_secs(15));
        assert!(parse_timeout_secs("-1").is_err());
        assert_eq!(parse_max_attempts("4").unwrap(), 4);
        assert!(parse_max_attempts("abc").is_err());
        assert_eq!(parse_listen(" 0.0.0.0:9000 ").unwrap(), "0.0.0.0:9000".parse().unwrap());
        assert!(parse_listen("localhost").is_err());
    }

    #[test]
    fn rejects_zero_attempts() {
        let err = AppConfig::resolve(&StoredConfig::default(), env_of(&[(ENV_MAX_ATTEMPTS, "0")]))
            .unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn stored_config_omits_unset_fields() {
        let stored = StoredConfig {
            model: Some("m".to_string()),
            ..StoredConfig::default()
        };
        assert_eq!(serde_json::to_string(&stored).unwrap(), r#"{"model":"m"}"#);
        let parsed: StoredConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, StoredConfig::default());
    }
}
