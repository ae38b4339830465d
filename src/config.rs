//! Application configuration management.
//!
//! Configuration is read from environment variables with `envy`, after an
//! optional `.env` file has been loaded with `dotenvy`.

use serde::Deserialize;

/// Errors raised while loading configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable could not be parsed into its expected type.
    #[error("Invalid environment: {0}")]
    Env(#[from] envy::Error),

    /// Neither `POOLER_URL` nor `DATABASE_URL` is set.
    #[error("POOLER_URL or DATABASE_URL must be set")]
    MissingDatabaseUrl,
}

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `POOLER_URL` (optional): connection pooler URL, preferred when present
/// - `DATABASE_URL` (optional): direct PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `DB_MAX_CONNECTIONS` (optional): pool size, defaults to 5
/// - `DB_ACQUIRE_TIMEOUT_SECS` (optional): seconds a request may wait for a
///   pooled connection, defaults to 5
///
/// One of `POOLER_URL` / `DATABASE_URL` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pooler_url: Option<String>,

    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,
}

fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first if it exists.
    ///
    /// # Errors
    ///
    /// - a variable cannot be parsed (e.g. a non-numeric `SERVER_PORT`)
    /// - no connection string is configured
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = envy::from_env::<Config>()?;
        config.validate()
    }

    /// Build a configuration from explicit `(KEY, value)` pairs.
    #[cfg(test)]
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.connection_url().is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        Ok(self)
    }

    /// Connection string the pool should use.
    ///
    /// The pooler URL wins over the direct database URL. Blank values are
    /// ignored.
    pub fn connection_url(&self) -> Option<&str> {
        [self.pooler_url.as_deref(), self.database_url.as_deref()]
            .into_iter()
            .flatten()
            .find(|url| !url.trim().is_empty())
    }
}
