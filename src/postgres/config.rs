use async_trait::async_trait;
use deadpool_postgres::{Config as PgConfig, PoolConfig, Runtime};
use serde::Deserialize;
use tokio_postgres::NoTls;

use crate::error::SqlRepositoryError;
use crate::executor::Connector;

use super::connection::PostgresHandle;

const DEFAULT_POOL_SIZE: usize = 16;

/// Connection settings for a Postgres server.
///
/// Deserializes from the usual JSON connection file:
///
/// ```rust
/// # use sql_repository::postgres::PostgresOptions;
/// let opts: PostgresOptions = serde_json::from_str(
///     r#"{"host": "localhost", "port": 5432, "user": "app", "password": "pw", "db": "music"}"#,
/// )
/// .unwrap();
/// assert_eq!(opts.dbname.as_deref(), Some("music"));
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostgresOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    #[serde(alias = "db")]
    pub dbname: Option<String>,
    pub pool_size: Option<usize>,
}

impl PostgresOptions {
    /// Check that every connection field is present.
    ///
    /// # Errors
    /// Returns `SqlRepositoryError::ConfigError` naming the first missing field.
    pub fn validate(&self) -> Result<(), SqlRepositoryError> {
        let required = [
            ("dbname", self.dbname.is_some()),
            ("host", self.host.is_some()),
            ("port", self.port.is_some()),
            ("user", self.user.is_some()),
            ("password", self.password.is_some()),
        ];
        if let Some((field, _)) = required.iter().find(|(_, present)| !present) {
            return Err(SqlRepositoryError::ConfigError(format!("{field} is required")));
        }
        if self.pool_size == Some(0) {
            return Err(SqlRepositoryError::ConfigError(
                "pool_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn to_pg_config(&self) -> PgConfig {
        let mut cfg = PgConfig::new();
        cfg.host.clone_from(&self.host);
        cfg.port = self.port;
        cfg.user.clone_from(&self.user);
        cfg.password.clone_from(&self.password);
        cfg.dbname.clone_from(&self.dbname);
        cfg.pool = Some(PoolConfig::new(self.pool_size.unwrap_or(DEFAULT_POOL_SIZE)));
        cfg
    }
}

/// Builds a deadpool-postgres pool and hands out [`PostgresHandle`]s.
#[derive(Clone)]
pub struct PostgresConnector {
    handle: PostgresHandle,
}

impl PostgresConnector {
    /// Validate `opts` and create the pool. No connection is opened until first use.
    ///
    /// # Errors
    /// Returns `SqlRepositoryError::ConfigError` if required fields are missing or
    /// `SqlRepositoryError::ConnectionError` if pool creation fails.
    pub fn new(opts: &PostgresOptions) -> Result<Self, SqlRepositoryError> {
        opts.validate()?;
        let pool = opts
            .to_pg_config()
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| {
                SqlRepositoryError::ConnectionError(format!("Failed to create Postgres pool: {e}"))
            })?;
        tracing::debug!(
            host = opts.host.as_deref().unwrap_or_default(),
            dbname = opts.dbname.as_deref().unwrap_or_default(),
            "postgres pool ready"
        );
        Ok(Self {
            handle: PostgresHandle::new(pool),
        })
    }
}

impl std::fmt::Debug for PostgresConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresConnector").finish_non_exhaustive()
    }
}

#[async_trait]
impl Connector for PostgresConnector {
    type Connection = PostgresHandle;

    async fn get_connection(&self) -> Result<PostgresHandle, SqlRepositoryError> {
        Ok(self.handle.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> PostgresOptions {
        PostgresOptions {
            host: Some("localhost".into()),
            port: Some(5432),
            user: Some("app".into()),
            password: Some("pw".into()),
            dbname: Some("music".into()),
            pool_size: None,
        }
    }

    #[test]
    fn complete_options_validate() {
        assert!(full().validate().is_ok());
        let cfg = full().to_pg_config();
        assert_eq!(cfg.pool.map(|p| p.max_size), Some(DEFAULT_POOL_SIZE));
    }

    #[test]
    fn missing_field_is_named() {
        let opts = PostgresOptions {
            user: None,
            ..full()
        };
        assert!(matches!(
            opts.validate(),
            Err(SqlRepositoryError::ConfigError(msg)) if msg == "user is required"
        ));
    }

    #[tokio::test]
    async fn connector_builds_without_connecting() {
        assert!(PostgresConnector::new(&full()).is_ok());
        assert!(PostgresConnector::new(&PostgresOptions::default()).is_err());
    }
}
