use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::extraction::{anthropic, bedrock};

const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Required environment variable '{0}' is not set")]
    Missing(&'static str),

    #[error("Invalid value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    Bedrock,
    Anthropic,
}

impl FromStr for ModelProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bedrock" => Ok(Self::Bedrock),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(format!("unknown provider '{other}' (expected bedrock or anthropic)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    DynamoDb,
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dynamodb" => Ok(Self::DynamoDb),
            "postgres" => Ok(Self::Postgres),
            other => Err(format!("unknown store '{other}' (expected dynamodb or postgres)")),
        }
    }
}

/// A value that must never appear in logs.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Process-wide configuration, read once at startup from the environment.
/// Any error here stops the process before it accepts events.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bucket the service is expected to receive uploads from.
    pub bucket_name: String,
    pub table_name: String,
    pub aws_region: Option<String>,
    /// Override for S3-compatible stores (MinIO, LocalStack).
    pub s3_endpoint: Option<String>,
    pub model_provider: ModelProvider,
    pub model_id: String,
    pub anthropic_api_key: Option<Secret>,
    pub result_store: StoreBackend,
    pub database_url: Option<Secret>,
    pub invocation_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let model_provider =
            parse_or(get("MODEL_PROVIDER"), "MODEL_PROVIDER", ModelProvider::Bedrock)?;
        let anthropic_api_key = match model_provider {
            ModelProvider::Anthropic => Some(Secret(require("ANTHROPIC_API_KEY")?)),
            ModelProvider::Bedrock => None,
        };
        let model_id = get("MODEL_ID").unwrap_or_else(|| match model_provider {
            ModelProvider::Bedrock => bedrock::DEFAULT_MODEL_ID.to_string(),
            ModelProvider::Anthropic => anthropic::DEFAULT_MODEL_ID.to_string(),
        });

        let result_store =
            parse_or(get("RESULT_STORE"), "RESULT_STORE", StoreBackend::DynamoDb)?;
        let database_url = match result_store {
            StoreBackend::Postgres => Some(Secret(require("DATABASE_URL")?)),
            StoreBackend::DynamoDb => None,
        };

        let timeout_secs: u64 = parse_or(
            get("INVOCATION_TIMEOUT_SECS"),
            "INVOCATION_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "INVOCATION_TIMEOUT_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Config {
            bucket_name: require("BUCKET_NAME")?,
            table_name: require("TABLE_NAME")?,
            aws_region: get("AWS_REGION"),
            s3_endpoint: get("S3_ENDPOINT"),
            model_provider,
            model_id,
            anthropic_api_key,
            result_store,
            database_url,
            invocation_timeout: Duration::from_secs(timeout_secs),
            port: parse_or(get("PORT"), "PORT", 8080)?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
    }
}
