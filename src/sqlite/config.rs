use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bb8::{ManageConnection, Pool};
use tokio::sync::Mutex;

use crate::error::SqlRepositoryError;
use crate::executor::Connector;

use super::connection::{SqliteHandle, run_blocking};

/// A rusqlite connection shared between the pool and blocking workers.
pub type SharedSqliteConnection = Arc<Mutex<rusqlite::Connection>>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Options for configuring a `SQLite` pool.
#[derive(Debug, Clone)]
pub struct SqliteOptions {
    pub db_path: String,
    /// Refuse to open a database file that does not exist yet.
    pub require_existing: bool,
    pub pool_size: u32,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            db_path,
            require_existing: true,
            pool_size: 4,
        }
    }

    #[must_use]
    pub fn builder(db_path: String) -> SqliteOptionsBuilder {
        SqliteOptionsBuilder::new(db_path)
    }

    fn is_in_memory(&self) -> bool {
        self.db_path.is_empty()
            || self.db_path == ":memory:"
            || self.db_path.starts_with("file:")
    }

    fn validate(&self) -> Result<(), SqlRepositoryError> {
        if self.pool_size == 0 {
            return Err(SqlRepositoryError::ConfigError(
                "pool_size must be at least 1".to_string(),
            ));
        }
        if self.require_existing && !self.is_in_memory() && !Path::new(&self.db_path).exists() {
            return Err(SqlRepositoryError::ConfigError(format!(
                "failed to locate database file {}",
                self.db_path
            )));
        }
        Ok(())
    }
}

/// Fluent builder for `SQLite` options.
///
/// Note that every pooled connection to `:memory:` opens its own private database; use
/// `pool_size(1)` or a shared-cache `file:` URI for in-memory work.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            opts: SqliteOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn require_existing(mut self, require_existing: bool) -> Self {
        self.opts.require_existing = require_existing;
        self
    }

    #[must_use]
    pub fn pool_size(mut self, pool_size: u32) -> Self {
        self.opts.pool_size = pool_size;
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }

    /// Build a connector for these options.
    ///
    /// # Errors
    ///
    /// Returns `SqlRepositoryError` if validation, pool creation or the initial pragma fails.
    pub async fn build(self) -> Result<SqliteConnector, SqlRepositoryError> {
        SqliteConnector::new(self.finish()).await
    }
}

/// bb8 manager for rusqlite connections.
#[derive(Debug, Clone)]
pub struct SqliteManager {
    db_path: String,
}

impl SqliteManager {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self { db_path }
    }
}

impl ManageConnection for SqliteManager {
    type Connection = SharedSqliteConnection;
    type Error = rusqlite::Error;

    #[allow(clippy::manual_async_fn)]
    fn connect(&self) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send {
        let path = self.db_path.clone();
        async move {
            let conn = rusqlite::Connection::open(&path)?;
            conn.busy_timeout(BUSY_TIMEOUT)?;
            Ok(Arc::new(Mutex::new(conn)))
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn is_valid(
        &self,
        conn: &mut Self::Connection,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        let handle = Arc::clone(conn);
        async move {
            let guard = handle.lock().await;
            guard.query_row("SELECT 1", [], |_| Ok(()))
        }
    }

    /// A connection handed back mid-transaction is discarded; closing it rolls back.
    fn has_broken(&self, conn: &mut Self::Connection) -> bool {
        conn.try_lock().is_ok_and(|guard| !guard.is_autocommit())
    }
}

/// Opens a pooled `SQLite` database and hands out [`SqliteHandle`]s.
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    handle: SqliteHandle,
}

impl SqliteConnector {
    /// Validate `opts`, create the pool and switch the database to WAL mode.
    ///
    /// # Errors
    /// Returns `SqlRepositoryError::ConfigError` for a missing file when
    /// `require_existing` is set, or `SqlRepositoryError::ConnectionError` if pool creation
    /// or the connection test fails.
    pub async fn new(opts: SqliteOptions) -> Result<Self, SqlRepositoryError> {
        opts.validate()?;

        let pool = Pool::builder()
            .max_size(opts.pool_size)
            .build(SqliteManager::new(opts.db_path.clone()))
            .await
            .map_err(|e| {
                SqlRepositoryError::ConnectionError(format!("Failed to create SQLite pool: {e}"))
            })?;

        {
            let conn = pool.get().await.map_err(|e| {
                SqlRepositoryError::ConnectionError(format!("sqlite checkout error: {e}"))
            })?;
            run_blocking(Arc::clone(&*conn), |guard| {
                guard
                    .pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                        row.get::<_, String>(0)
                    })
                    .map_err(SqlRepositoryError::SqliteError)
            })
            .await?;
        }

        tracing::debug!(db_path = %opts.db_path, pool_size = opts.pool_size, "sqlite pool ready");
        Ok(Self {
            handle: SqliteHandle::new(pool),
        })
    }

    #[must_use]
    pub fn builder(db_path: String) -> SqliteOptionsBuilder {
        SqliteOptionsBuilder::new(db_path)
    }
}

#[async_trait]
impl Connector for SqliteConnector {
    type Connection = SqliteHandle;

    async fn get_connection(&self) -> Result<SqliteHandle, SqlRepositoryError> {
        Ok(self.handle.clone())
    }
}
