use std::env;
use std::fs;
use std::path::PathBuf;

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use crate::deadline::DeadlinePolicy;

const DEFAULT_CONFIG_FILE: &str = "ptoflow.toml";
const DEFAULT_DATABASE_URL: &str = "sqlite://ptoflow.db";
const DEFAULT_MANAGER_EMAIL: &str = "pto-approvals@example.com";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub policy: PolicyConfig,
    pub notify: NotifyConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct PolicyConfig {
    pub vacation_lead_days: i64,
    pub sick_lead_days: i64,
}

impl PolicyConfig {
    pub fn deadline_policy(&self) -> DeadlinePolicy {
        DeadlinePolicy {
            vacation_lead_days: self.vacation_lead_days,
            sick_lead_days: self.sick_lead_days,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NotifyConfig {
    /// The single manager address every manager-directed notice goes to.
    pub manager_email: String,
    pub relay_url: Option<String>,
    pub relay_token: Option<SecretString>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    database: RawDatabase,
    #[serde(default)]
    policy: RawPolicy,
    #[serde(default)]
    notify: RawNotify,
    #[serde(default)]
    logging: RawLogging,
}

#[derive(Debug, Default, Deserialize)]
struct RawDatabase {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPolicy {
    vacation_lead_days: Option<i64>,
    sick_lead_days: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawNotify {
    manager_email: Option<String>,
    relay_url: Option<String>,
    relay_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLogging {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let path = options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let raw = if path.exists() {
            let contents = fs::read_to_string(&path)
                .map_err(|source| ConfigError::ReadFile { path: path.clone(), source })?;
            toml::from_str::<RawConfig>(&contents)
                .map_err(|source| ConfigError::ParseFile { path: path.clone(), source })?
        } else if options.require_file {
            return Err(ConfigError::MissingConfigFile(path));
        } else {
            RawConfig::default()
        };

        let config = Self::from_raw(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let database = DatabaseConfig {
            url: env_override("PTOFLOW_DATABASE_URL")
                .or(raw.database.url)
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            max_connections: raw.database.max_connections.unwrap_or(5),
            timeout_secs: raw.database.timeout_secs.unwrap_or(30),
        };

        let policy = PolicyConfig {
            vacation_lead_days: parsed_env_override("PTOFLOW_VACATION_LEAD_DAYS")?
                .or(raw.policy.vacation_lead_days)
                .unwrap_or(14),
            sick_lead_days: parsed_env_override("PTOFLOW_SICK_LEAD_DAYS")?
                .or(raw.policy.sick_lead_days)
                .unwrap_or(1),
        };

        let notify = NotifyConfig {
            manager_email: env_override("PTOFLOW_MANAGER_EMAIL")
                .or(raw.notify.manager_email)
                .unwrap_or_else(|| DEFAULT_MANAGER_EMAIL.to_string()),
            relay_url: env_override("PTOFLOW_RELAY_URL").or(raw.notify.relay_url),
            relay_token: env_override("PTOFLOW_RELAY_TOKEN")
                .or(raw.notify.relay_token)
                .map(SecretString::from),
        };

        let logging = LoggingConfig {
            level: env_override("PTOFLOW_LOG_LEVEL")
                .or(raw.logging.level)
                .unwrap_or_else(|| "info".to_string()),
            format: raw.logging.format.unwrap_or(LogFormat::Compact),
        };

        Ok(Self { database, policy, notify, logging })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Validation("database.url must not be empty".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.policy.vacation_lead_days < 0 || self.policy.sick_lead_days < 0 {
            return Err(ConfigError::Validation(
                "policy lead days must not be negative".to_string(),
            ));
        }
        if !self.notify.manager_email.contains('@') {
            return Err(ConfigError::Validation(format!(
                "notify.manager_email `{}` is not an address",
                self.notify.manager_email
            )));
        }
        Ok(())
    }
}

fn env_override(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parsed_env_override(key: &str) -> Result<Option<i64>, ConfigError> {
    match env_override(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value }),
    }
}
