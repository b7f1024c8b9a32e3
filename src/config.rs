use std::collections::HashMap;
use thiserror::Error;

/// Settings shared by the contacts API and the quotes site.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub secret_key: String,
    pub access_token_ttl_minutes: i64,
    pub rate_limit_enabled: bool,
}

/// Settings for the one-off quotes seeder.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub database_path: String,
    pub fixtures_dir: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8000")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = required(&env_map, "DATABASE_PATH")?;

        let secret_key = required(&env_map, "SECRET_KEY")?;
        if secret_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "SECRET_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let access_token_ttl_minutes = env_map
            .get("ACCESS_TOKEN_TTL_MINUTES")
            .map(|s| s.as_str())
            .unwrap_or("60")
            .parse::<i64>()
            .ok()
            .filter(|m| *m > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "ACCESS_TOKEN_TTL_MINUTES".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?;

        let rate_limit_enabled = match env_map
            .get("RATE_LIMIT_ENABLED")
            .map(|s| s.to_ascii_lowercase())
            .as_deref()
            .unwrap_or("true")
        {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            other => {
                return Err(ConfigError::InvalidValue(
                    "RATE_LIMIT_ENABLED".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        Ok(Config {
            port,
            database_path,
            secret_key,
            access_token_ttl_minutes,
            rate_limit_enabled,
        })
    }
}

impl SeedConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        Ok(SeedConfig {
            database_path: required(&env_map, "DATABASE_PATH")?,
            fixtures_dir: env_map
                .get("FIXTURES_DIR")
                .cloned()
                .unwrap_or_else(|| ".".to_string()),
        })
    }
}

fn required(env_map: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    env_map
        .get(key)
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnv(key.to_string()))
}
