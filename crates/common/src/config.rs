//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Joke submission rules.
    #[serde(default)]
    pub jokes: JokeConfig,
    /// Chat delivery settings.
    #[serde(default)]
    pub chats: ChatConfig,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (`sqlite://...` or `postgres://...`).
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Joke submission rules.
#[derive(Debug, Clone, Deserialize)]
pub struct JokeConfig {
    /// Minimum number of characters a submitted joke must have.
    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,
    /// Language assigned to new jokes when none is chosen.
    #[serde(default = "default_language")]
    pub default_language: String,
}

/// Defaults and limits for per-chat delivery settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Seconds between two jokes for a freshly registered chat.
    #[serde(default = "default_schedule")]
    pub default_schedule: i32,
    /// Smallest schedule a chat may choose.
    #[serde(default = "default_min_schedule")]
    pub min_schedule: i32,
    /// Largest schedule a chat may choose.
    #[serde(default = "default_max_schedule")]
    pub max_schedule: i32,
}

const fn default_max_connections() -> u32 {
    10
}

const fn default_min_connections() -> u32 {
    1
}

const fn default_min_content_length() -> usize {
    30
}

fn default_language() -> String {
    "en".to_string()
}

const fn default_schedule() -> i32 {
    600
}

const fn default_min_schedule() -> i32 {
    60
}

const fn default_max_schedule() -> i32 {
    86_400
}

impl Default for JokeConfig {
    fn default() -> Self {
        Self {
            min_content_length: default_min_content_length(),
            default_language: default_language(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_schedule: default_schedule(),
            min_schedule: default_min_schedule(),
            max_schedule: default_max_schedule(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `JOKEBOT_ENV`)
    /// 4. Environment variables with `JOKEBOT_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("JOKEBOT_ENV").unwrap_or_else(|_| "development".to_string());
        tracing::debug!(env = %env, "Loading configuration");

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("JOKEBOT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("JOKEBOT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Build a configuration with default settings for the given database.
    #[must_use]
    pub fn default_for_url(url: impl Into<String>) -> Self {
        Self {
            database: DatabaseConfig {
                url: url.into(),
                max_connections: default_max_connections(),
                min_connections: default_min_connections(),
            },
            jokes: JokeConfig::default(),
            chats: ChatConfig::default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_for_url() {
        let config = Config::default_for_url("sqlite::memory:");
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jokes.min_content_length, 30);
        assert_eq!(config.jokes.default_language, "en");
        assert_eq!(config.chats.default_schedule, 600);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                "[database]\nurl = \"postgres://localhost/jokebot\"\n\n[chats]\nmin_schedule = 120\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.database.url, "postgres://localhost/jokebot");
        assert_eq!(config.database.min_connections, 1);
        assert_eq!(config.chats.min_schedule, 120);
        assert_eq!(config.chats.max_schedule, 86_400);
        assert_eq!(config.jokes.min_content_length, 30);
    }

    #[test]
    fn test_missing_database_url_fails() {
        let result: Result<Config, _> = config::Config::builder()
            .add_source(config::File::from_str("[jokes]\n", config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize();

        assert!(result.is_err());
    }
}
