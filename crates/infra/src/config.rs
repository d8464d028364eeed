//! Settings loaded from `contaerp.toml` and `CONTAERP_*` environment variables.
//!
//! ```toml
//! database_url = "postgres://localhost/contaerp"
//! max_connections = 5
//! page_size = 50
//!
//! [defaults]
//! coddivisa = "EUR"
//! codserie = "A"
//! ```
//!
//! Environment variables override the file: `CONTAERP_DATABASE_URL`,
//! `CONTAERP_PAGE_SIZE`, `CONTAERP_DEFAULTS__CODDIVISA`, ...

use std::path::Path;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use contaerp_core::Defaults;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/contaerp";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_PAGE_SIZE: i64 = 50;
const CONFIG_FILE: &str = "contaerp";
const ENV_PREFIX: &str = "CONTAERP";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database_url: String,
    pub max_connections: u32,
    /// Rows per page returned by the paginated finders.
    pub page_size: i64,
    pub defaults: Defaults,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            page_size: DEFAULT_PAGE_SIZE,
            defaults: Defaults::default(),
        }
    }
}

/// Connection parameters handed to `PostgresDatabase::connect`.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

impl Settings {
    /// Load `contaerp.toml` from the working directory (optional) and the
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let builder = Config::builder().add_source(File::from(path).required(false));
        Self::build(builder)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.check()
    }

    fn check(mut self) -> Result<Self, ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::Message("database_url must not be empty".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Message("max_connections must be at least 1".to_string()));
        }
        if self.page_size <= 0 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        Ok(self)
    }

    pub fn database(&self) -> DatabaseSettings {
        DatabaseSettings {
            url: self.database_url.clone(),
            max_connections: self.max_connections,
        }
    }
}
