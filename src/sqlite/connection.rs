use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bb8::{Pool, PooledConnection};

use crate::error::SqlRepositoryError;
use crate::executor::DatabaseExecutor;
use crate::named::PlaceholderStyle;
use crate::results::ResultSet;
use crate::types::RowValues;

use super::config::{SharedSqliteConnection, SqliteManager};
use super::params::Params;
use super::query::build_result_set;
use super::transaction::SqliteTx;

pub(crate) type SqlitePooledConnection = PooledConnection<'static, SqliteManager>;

/// Run `func` against the connection on the blocking thread pool.
pub(crate) async fn run_blocking<F, R>(
    conn: SharedSqliteConnection,
    func: F,
) -> Result<R, SqlRepositoryError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, SqlRepositoryError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await
    .map_err(|e| SqlRepositoryError::ExecutionError(format!("sqlite spawn_blocking join error: {e}")))?
}

/// Cloneable handle over the `SQLite` pool.
///
/// Every call checks a connection out for its own duration; transactions keep theirs until
/// commit or rollback.
#[derive(Clone)]
pub struct SqliteHandle {
    pool: Pool<SqliteManager>,
}

impl SqliteHandle {
    pub(crate) fn new(pool: Pool<SqliteManager>) -> Self {
        Self { pool }
    }

    pub(crate) async fn checkout(&self) -> Result<SqlitePooledConnection, SqlRepositoryError> {
        self.pool
            .get_owned()
            .await
            .map_err(|e| SqlRepositoryError::ConnectionError(format!("sqlite checkout error: {e}")))
    }
}

impl fmt::Debug for SqliteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.pool.state();
        f.debug_struct("SqliteHandle")
            .field("connections", &state.connections)
            .field("idle_connections", &state.idle_connections)
            .finish()
    }
}

#[async_trait]
impl DatabaseExecutor for SqliteHandle {
    type Tx = SqliteTx;

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Sqlite
    }

    async fn execute_select(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlRepositoryError> {
        let conn = self.checkout().await?;
        let sql = query.to_owned();
        let params = Params::convert(params);
        run_blocking(Arc::clone(&*conn), move |guard| {
            let mut stmt = guard.prepare_cached(&sql)?;
            build_result_set(&mut stmt, &params)
        })
        .await
    }

    async fn begin_transaction(&self) -> Result<SqliteTx, SqlRepositoryError> {
        SqliteTx::begin(self.checkout().await?).await
    }
}
