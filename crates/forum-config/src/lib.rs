//! # forum-config
//!
//! Layered configuration loading for the forum using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`FORUM_*` prefix, `__` as separator)
//! 2. Project-level `./forum.toml`
//! 3. User-level `~/.config/forum/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `FORUM_SERVER__PORT` -> `server.port`, `FORUM_DATABASE__PATH` -> `database.path`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use forum_config::ForumConfig;
//!
//! let config = ForumConfig::load_with_dotenv().expect("config");
//! println!("listening on {}", config.server.address());
//! ```

mod auth;
mod database;
mod error;
mod general;
mod server;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use server::ServerConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project-local config file name.
pub const LOCAL_CONFIG_FILE: &str = "forum.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ForumConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl ForumConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`load_with_dotenv`](Self::load_with_dotenv)
    /// if you need `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be parsed or a value fails
    /// [`validate`](Self::validate).
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// A missing `.env` is fine; an unreadable or malformed one is not.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` for a bad `.env` file, otherwise the
    /// same as [`load`](Self::load).
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests and the binary can layer extra providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("FORUM_").split("__"))
    }

    /// Reject values no part of the server can run with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.page_size == 0 {
            return Err(ConfigError::invalid("general.page_size", "must be at least 1"));
        }
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::invalid("database.path", "must not be empty"));
        }
        if self.auth.cookie_name.trim().is_empty() {
            return Err(ConfigError::invalid("auth.cookie_name", "must not be empty"));
        }
        if self.auth.session_ttl_hours == 0 {
            return Err(ConfigError::invalid(
                "auth.session_ttl_hours",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("forum").join("config.toml"))
    }
}
