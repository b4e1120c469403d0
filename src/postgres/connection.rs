use async_trait::async_trait;
use deadpool_postgres::{Object, Pool};

use crate::error::SqlRepositoryError;
use crate::executor::DatabaseExecutor;
use crate::results::ResultSet;
use crate::types::RowValues;

use super::params::Params;
use super::query::build_result_set_from_statement;
use super::transaction::PostgresTx;

/// Cloneable handle over the Postgres pool. Placeholders are `$n`.
#[derive(Clone)]
pub struct PostgresHandle {
    pool: Pool,
}

impl PostgresHandle {
    pub(crate) fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn checkout(&self) -> Result<Object, SqlRepositoryError> {
        Ok(self.pool.get().await?)
    }
}

impl std::fmt::Debug for PostgresHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("PostgresHandle")
            .field("size", &status.size)
            .field("available", &status.available)
            .finish()
    }
}

#[async_trait]
impl DatabaseExecutor for PostgresHandle {
    type Tx = PostgresTx;

    async fn execute_select(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlRepositoryError> {
        let client = self.checkout().await?;
        let stmt = client.prepare_cached(query).await.map_err(|e| {
            SqlRepositoryError::ExecutionError(format!("postgres prepare error: {e}"))
        })?;
        let converted = Params::convert(params);
        let rows = client
            .query(&stmt, converted.as_refs())
            .await
            .map_err(|e| SqlRepositoryError::ExecutionError(format!("postgres select error: {e}")))?;
        build_result_set_from_statement(&stmt, &rows)
    }

    async fn begin_transaction(&self) -> Result<PostgresTx, SqlRepositoryError> {
        PostgresTx::begin(self.checkout().await?).await
    }
}
