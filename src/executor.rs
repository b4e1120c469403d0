//! Capabilities the repository consumes from a database engine.

use async_trait::async_trait;

use crate::error::SqlRepositoryError;
use crate::named::PlaceholderStyle;
use crate::results::ResultSet;
use crate::types::RowValues;

/// What the engine reported after a DML statement. `None` means it could not say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DmlOutcome {
    pub rows_affected: Option<u64>,
    pub last_insert_id: Option<i64>,
}

/// A handle that can run queries and open transactions.
#[async_trait]
pub trait DatabaseExecutor: Send + Sync {
    type Tx: TransactionExecutor;

    /// Positional marker syntax the engine expects.
    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Postgres
    }

    /// Prepare `query`, run it with `params`, and drain the cursor.
    ///
    /// The statement and cursor are released before this returns, on success and on error.
    async fn execute_select(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlRepositoryError>;

    /// Begin a transaction on a connection dedicated to it until commit or rollback.
    async fn begin_transaction(&self) -> Result<Self::Tx, SqlRepositoryError>;
}

/// An open transaction.
#[async_trait]
pub trait TransactionExecutor: Send {
    /// Executes a single DML statement (INSERT, UPDATE, DELETE, etc.).
    async fn execute_dml(
        &mut self,
        query: &str,
        params: &[RowValues],
    ) -> Result<DmlOutcome, SqlRepositoryError>;

    async fn commit(self) -> Result<(), SqlRepositoryError>;

    async fn rollback(self) -> Result<(), SqlRepositoryError>;
}

/// Source of ready-to-use database handles.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: DatabaseExecutor;

    async fn get_connection(&self) -> Result<Self::Connection, SqlRepositoryError>;
}
