use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use database::{PgSettings, StoreOptions};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use todo_core::TodoError;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DatabaseConfig {
    /// Store URL (`sqlite://path`, `:memory:` or `postgres://...`); wins over the parts below
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Database name on the PostgreSQL server
    pub name: String,
    /// Connection timeout in seconds
    pub connect_timeout: u64,
    /// Per-statement timeout in seconds
    pub statement_timeout: u64,
    /// Create the `todos` table at startup if it is missing
    pub init_schema: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SessionConfig {
    /// Prompt printed before each REPL line
    pub prompt: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (pretty, json, compact)
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
    Compact,
}

/// Where the store lives, resolved from [`DatabaseConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    /// `sqlite://path` or an in-memory database
    Sqlite(String),
    /// `postgres://` or `postgresql://` URL
    PostgresUrl(String),
    /// Discrete host/port/credential settings
    Postgres(PgSettings),
}

impl StoreTarget {
    /// Human-readable location with credentials left out
    pub fn describe(&self) -> String {
        match self {
            StoreTarget::Sqlite(url) => url.clone(),
            StoreTarget::PostgresUrl(url) => {
                let location = url.rsplit('@').next().unwrap_or(url);
                let location = location
                    .trim_start_matches("postgresql://")
                    .trim_start_matches("postgres://");
                format!("postgres://{location}")
            }
            StoreTarget::Postgres(settings) => format!(
                "postgres://{}@{}:{}/{}",
                settings.user, settings.host, settings.port, settings.database
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UrlKind {
    Sqlite,
    Postgres,
}

fn classify_url(url: &str) -> Option<UrlKind> {
    if url == ":memory:" || url.starts_with("sqlite://") || url == "sqlite::memory:" {
        Some(UrlKind::Sqlite)
    } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        Some(UrlKind::Postgres)
    } else {
        None
    }
}

impl Config {
    /// Load the embedded defaults layered with `TODO__SECTION__KEY` and standard variables
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Like [`from_env`](Self::from_env) with a configuration file between defaults and environment
    pub fn from_file(path: &str) -> Result<Self> {
        Self::load(Some(path))
    }

    fn load(config_file: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder().add_source(File::from_str(
            include_str!("../config/default.toml"),
            FileFormat::Toml,
        ));

        if let Some(path) = config_file {
            builder = builder.add_source(File::with_name(path).format(FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("TODO")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .context("Failed to build configuration")?;

        let mut result: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        result.apply_standard_env_vars(|key| env::var(key).ok())?;

        Ok(result)
    }

    /// Apply DATABASE_URL, the libpq-style PG* variables and LOG_LEVEL
    ///
    /// Empty values are treated as unset.
    pub fn apply_standard_env_vars<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(database_url) = var("DATABASE_URL") {
            self.database.url = Some(database_url);
        }
        if let Some(host) = var("PGHOST") {
            self.database.host = host;
        }
        if let Some(port) = var("PGPORT") {
            self.database.port = port
                .parse()
                .with_context(|| format!("PGPORT must be a port number, got '{port}'"))?;
        }
        if let Some(user) = var("PGUSER") {
            self.database.user = Some(user);
        }
        if let Some(password) = var("PGPASSWORD") {
            self.database.password = Some(password);
        }
        if let Some(name) = var("PGDATABASE") {
            self.database.name = name;
        }
        if let Some(log_level) = var("LOG_LEVEL") {
            self.logging.level = log_level;
        }

        Ok(())
    }

    /// Resolve where the store lives
    ///
    /// A URL wins over discrete settings. Without a URL a user name is required.
    pub fn store_target(&self) -> todo_core::Result<StoreTarget> {
        if let Some(url) = &self.database.url {
            return match classify_url(url) {
                Some(UrlKind::Sqlite) => Ok(StoreTarget::Sqlite(url.clone())),
                Some(UrlKind::Postgres) => Ok(StoreTarget::PostgresUrl(url.clone())),
                None => Err(TodoError::Configuration(format!(
                    "unsupported database URL '{url}'"
                ))),
            };
        }

        let user = self
            .database
            .user
            .clone()
            .filter(|user| !user.is_empty())
            .ok_or_else(|| {
                TodoError::Configuration(
                    "no store configured: set DATABASE_URL, or PGUSER with PGHOST/PGDATABASE"
                        .to_string(),
                )
            })?;

        Ok(StoreTarget::Postgres(PgSettings {
            host: self.database.host.clone(),
            port: self.database.port,
            user,
            password: self.database.password.clone(),
            database: self.database.name.clone(),
        }))
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            connect_timeout: Duration::from_secs(self.database.connect_timeout),
            statement_timeout: Duration::from_secs(self.database.statement_timeout),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(anyhow::anyhow!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                ));
            }
        }

        if let Some(url) = &self.database.url {
            if classify_url(url).is_none() {
                return Err(anyhow::anyhow!(
                    "Unsupported database URL: {}. Expected sqlite://, :memory:, postgres:// or postgresql://",
                    url
                ));
            }
        }

        if self.database.port == 0 {
            return Err(anyhow::anyhow!("Database port cannot be 0"));
        }

        if self.database.connect_timeout == 0 || self.database.statement_timeout == 0 {
            return Err(anyhow::anyhow!(
                "Database timeouts must be greater than 0 seconds"
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: None,
                host: "localhost".to_string(),
                port: 5432,
                user: None,
                password: None,
                name: "todo".to_string(),
                connect_timeout: 10,
                statement_timeout: 30,
                init_schema: false,
            },
            session: SessionConfig {
                prompt: "todo> ".to_string(),
            },
            logging: LoggingConfig {
                level: "warn".to_string(),
                format: LogFormat::Compact,
            },
        }
    }
}
