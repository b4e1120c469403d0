use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::SqlRepositoryError;
use crate::executor::{DmlOutcome, TransactionExecutor};
use crate::types::RowValues;

use super::connection::{SqlitePooledConnection, run_blocking};
use super::params::Params;

const ROLLBACK_BUSY_RETRIES: &[Duration] = &[
    Duration::from_millis(10),
    Duration::from_millis(25),
    Duration::from_millis(50),
];

/// Transaction handle that owns a pooled `SQLite` connection until completion.
///
/// Dropping it without commit or rollback returns the connection mid-transaction; the pool
/// then discards it and closing the connection rolls the work back.
#[derive(Debug)]
pub struct SqliteTx {
    conn: SqlitePooledConnection,
}

impl SqliteTx {
    pub(crate) async fn begin(conn: SqlitePooledConnection) -> Result<Self, SqlRepositoryError> {
        run_blocking(Arc::clone(&*conn), |guard| {
            guard.execute_batch("BEGIN").map_err(SqlRepositoryError::SqliteError)
        })
        .await?;
        Ok(Self { conn })
    }

    async fn batch(&self, sql: &'static str) -> Result<(), SqlRepositoryError> {
        run_blocking(Arc::clone(&*self.conn), move |guard| {
            guard.execute_batch(sql).map_err(SqlRepositoryError::SqliteError)
        })
        .await
    }
}

fn is_busy(err: &SqlRepositoryError) -> bool {
    matches!(
        err,
        SqlRepositoryError::SqliteError(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::DatabaseBusy
    )
}

#[async_trait]
impl TransactionExecutor for SqliteTx {
    async fn execute_dml(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<DmlOutcome, SqlRepositoryError> {
        let sql = query.to_owned();
        let params = Params::convert(params);
        run_blocking(Arc::clone(&*self.conn), move |guard| {
            let mut stmt = guard.prepare_cached(&sql)?;
            let rows = stmt.execute(&params.as_refs()[..])?;
            Ok(DmlOutcome {
                rows_affected: u64::try_from(rows).ok(),
                last_insert_id: Some(guard.last_insert_rowid()),
            })
        })
        .await
    }

    async fn commit(self) -> Result<(), SqlRepositoryError> {
        self.batch("COMMIT").await
    }

    async fn rollback(self) -> Result<(), SqlRepositoryError> {
        for delay in ROLLBACK_BUSY_RETRIES {
            match self.batch("ROLLBACK").await {
                Err(e) if is_busy(&e) => {
                    tracing::debug!(?delay, "sqlite busy during rollback; retrying");
                    tokio::time::sleep(*delay).await;
                }
                other => return other,
            }
        }
        self.batch("ROLLBACK").await
    }
}
