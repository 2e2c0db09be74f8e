use std::env;
use std::time::Duration;
use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database: DatabaseConfig,
    pub environment: Environment,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Parsed `DATABASE_URL`. `tokio_postgres::Config` redacts the password in `Debug`.
    pub connection: tokio_postgres::Config,
    pub max_connections: usize,
    pub connection_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Environment {
    Local,
    Production,
}

impl Config {
    /// Reads the configuration from the process environment.
    /// Call `dotenvy::dotenv()` beforehand to pick up a local `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        if port == 0 {
            anyhow::bail!("PORT must be greater than 0");
        }

        let database = DatabaseConfig::from_lookup(&lookup)?;
        let environment = Environment::parse(lookup("ENV").as_deref());

        Ok(Config {
            port,
            database,
            environment,
        })
    }
}

impl DatabaseConfig {
    /// `DATABASE_URL` と任意のプール設定を読み込む。
    /// 接続文字列のリテラルなフォールバックは持たない。
    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL")
            .context("DATABASE_URL environment variable is required")?;

        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<usize>()
            .context("DATABASE_MAX_CONNECTIONS must be a valid number")?;

        let connection_timeout_secs = lookup("DATABASE_CONNECTION_TIMEOUT")
            .unwrap_or_else(|| "30".to_string())
            .parse::<u64>()
            .context("DATABASE_CONNECTION_TIMEOUT must be a valid number of seconds")?;

        Self::from_url(&url, max_connections, Duration::from_secs(connection_timeout_secs))
    }

    /// Parses a PostgreSQL connection string (URL or `key=value` form) and validates the pool settings.
    /// `mysql://` などの他エンジンの URL はここでパースエラーになる。
    pub fn from_url(url: &str, max_connections: usize, connection_timeout: Duration) -> Result<Self> {
        let connection = url
            .parse::<tokio_postgres::Config>()
            .context("DATABASE_URL is not a valid PostgreSQL connection string")?;

        let config = DatabaseConfig {
            connection,
            max_connections,
            connection_timeout,
        };
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            anyhow::bail!("Max connections must be greater than 0");
        }

        if self.connection_timeout.is_zero() {
            anyhow::bail!("Connection timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Environment {
    pub fn from_env() -> Self {
        Self::parse(env::var("ENV").ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("local") {
            "production" | "prod" => Environment::Production,
            _ => Environment::Local,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}
