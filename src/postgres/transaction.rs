use async_trait::async_trait;
use deadpool_postgres::Object;

use crate::error::SqlRepositoryError;
use crate::executor::{DmlOutcome, TransactionExecutor};
use crate::types::RowValues;

use super::params::Params;

/// Transaction on one pooled Postgres client.
///
/// If the handle is dropped before commit or rollback succeeds, the client is detached from
/// the pool instead of being recycled; closing it makes the server roll back.
pub struct PostgresTx {
    client: Option<Object>,
    done: bool,
}

impl PostgresTx {
    pub(crate) async fn begin(client: Object) -> Result<Self, SqlRepositoryError> {
        client.batch_execute("BEGIN").await?;
        Ok(Self {
            client: Some(client),
            done: false,
        })
    }

    fn client(&self) -> Result<&Object, SqlRepositoryError> {
        self.client.as_ref().ok_or_else(|| {
            SqlRepositoryError::ExecutionError("Postgres transaction already completed".into())
        })
    }

    async fn finish(mut self, sql: &str) -> Result<(), SqlRepositoryError> {
        self.client()?.batch_execute(sql).await?;
        self.done = true;
        Ok(())
    }
}

impl Drop for PostgresTx {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Some(client) = self.client.take() {
            tracing::warn!("postgres transaction dropped before completion; detaching client");
            drop(Object::take(client));
        }
    }
}

#[async_trait]
impl TransactionExecutor for PostgresTx {
    async fn execute_dml(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<DmlOutcome, SqlRepositoryError> {
        let client = self.client()?;
        let stmt = client.prepare_cached(query).await?;
        let converted = Params::convert(params);
        let rows = client.execute(&stmt, converted.as_refs()).await?;
        Ok(DmlOutcome {
            rows_affected: Some(rows),
            last_insert_id: None,
        })
    }

    async fn commit(self) -> Result<(), SqlRepositoryError> {
        self.finish("COMMIT").await
    }

    async fn rollback(self) -> Result<(), SqlRepositoryError> {
        self.finish("ROLLBACK").await
    }
}
