use tracing::{debug, error, warn};

use crate::error::SqlRepositoryError;
use crate::executor::{Connector, DatabaseExecutor, DmlOutcome, TransactionExecutor};
use crate::named::{NormalizedQuery, normalize_with_style};
use crate::results::RowMap;
use crate::types::{NamedParams, RowValues};

/// Result of [`Repository::execute`].
///
/// Either field is [`ExecutionOutcome::UNKNOWN`] when the engine could not report it,
/// which keeps a legitimate `0` distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub rows_affected: i64,
    pub last_insert_id: i64,
}

impl ExecutionOutcome {
    pub const UNKNOWN: i64 = -1;

    fn from_dml(outcome: DmlOutcome) -> Self {
        let rows_affected = match outcome.rows_affected.map(i64::try_from) {
            Some(Ok(n)) => n,
            Some(Err(_)) | None => {
                warn!("rows affected unavailable from engine");
                Self::UNKNOWN
            }
        };
        let last_insert_id = outcome.last_insert_id.unwrap_or_else(|| {
            debug!("last insert id unavailable from engine");
            Self::UNKNOWN
        });
        Self {
            rows_affected,
            last_insert_id,
        }
    }
}

/// Runs queries and maps each row through a caller-supplied function.
///
/// The mapping function receives a [`RowMap`] and returns the mapped value; the first
/// mapping error aborts the call and no partial results are returned.
///
/// ```rust,no_run
/// use sql_repository::prelude::*;
///
/// struct Artist {
///     id: i64,
///     name: String,
/// }
///
/// fn artist(r: &mut RowMap) -> Result<Artist, SqlRepositoryError> {
///     let a = Artist {
///         id: r.int64("ArtistId"),
///         name: r.string("Name"),
///     };
///     r.err()?;
///     Ok(a)
/// }
///
/// # async fn demo() -> Result<(), SqlRepositoryError> {
/// let connector = SqliteConnector::new(SqliteOptions::new("chinook.sqlite".into())).await?;
/// let repo = Repository::from_connector(&connector).await?;
///
/// let params = NamedParams::new().bind("ids", vec![1_i64, 2, 3]);
/// let artists = repo
///     .map_rows_named(
///         "select Name, ArtistId from Artist where ArtistId in (:ids) order by Name",
///         &params,
///         artist,
///     )
///     .await?;
/// # let _ = artists;
/// # Ok(()) }
/// ```
#[derive(Debug, Clone)]
pub struct Repository<E> {
    executor: E,
}

impl<E: DatabaseExecutor> Repository<E> {
    #[must_use]
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Build a repository over a connection obtained from `connector`.
    ///
    /// # Errors
    /// Propagates the connector's error.
    pub async fn from_connector<C>(connector: &C) -> Result<Self, SqlRepositoryError>
    where
        C: Connector<Connection = E>,
    {
        Ok(Self::new(connector.get_connection().await?))
    }

    #[must_use]
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Rewrite named placeholders for this repository's engine.
    ///
    /// # Errors
    /// Returns the normalizer's parameter errors.
    pub fn normalize(
        &self,
        query: &str,
        args: &NamedParams,
    ) -> Result<NormalizedQuery, SqlRepositoryError> {
        normalize_with_style(query, args, self.executor.placeholder_style()).inspect_err(|e| {
            error!(query, error = %e, "substitution of named parameters failed");
        })
    }

    /// Run `query` with positional `args` and map every row.
    ///
    /// # Errors
    /// Returns the engine error (prepare, query or value extraction) or the first error
    /// returned by `map`.
    pub async fn map_rows<T, F>(
        &self,
        query: &str,
        args: &[RowValues],
        mut map: F,
    ) -> Result<Vec<T>, SqlRepositoryError>
    where
        F: FnMut(&mut RowMap) -> Result<T, SqlRepositoryError>,
    {
        let result_set = self
            .executor
            .execute_select(query, args)
            .await
            .inspect_err(|e| error!(query, error = %e, "error executing query"))?;

        let mut results = Vec::with_capacity(result_set.len());
        for mut row in result_set.into_row_maps() {
            let mapped = map(&mut row)
                .inspect_err(|e| error!(query, error = %e, "error mapping row"))?;
            results.push(mapped);
        }

        debug!(query, rows = results.len(), "map_rows complete");
        Ok(results)
    }

    /// [`Repository::map_rows`] with `:name` placeholders.
    ///
    /// # Errors
    /// Returns parameter errors before anything is executed, then as `map_rows`.
    pub async fn map_rows_named<T, F>(
        &self,
        query: &str,
        args: &NamedParams,
        map: F,
    ) -> Result<Vec<T>, SqlRepositoryError>
    where
        F: FnMut(&mut RowMap) -> Result<T, SqlRepositoryError>,
    {
        let normalized = self.normalize(query, args)?;
        self.map_rows(&normalized.sql, &normalized.params, map).await
    }

    /// Run `query` and map at most one row.
    ///
    /// Zero rows is `Ok(None)`, not an error.
    ///
    /// # Errors
    /// Returns [`SqlRepositoryError::TooManyRows`] when more than one row comes back, or
    /// any error from [`Repository::map_rows`].
    pub async fn map_row<T, F>(
        &self,
        query: &str,
        args: &[RowValues],
        map: F,
    ) -> Result<Option<T>, SqlRepositoryError>
    where
        F: FnMut(&mut RowMap) -> Result<T, SqlRepositoryError>,
    {
        let mut results = self.map_rows(query, args, map).await?;
        if results.len() > 1 {
            error!(
                query,
                rows = results.len(),
                "map_row expected 0 or 1 rows"
            );
            return Err(SqlRepositoryError::TooManyRows(results.len()));
        }
        debug!(query, rows = results.len(), "map_row complete");
        Ok(results.pop())
    }

    /// [`Repository::map_row`] with `:name` placeholders.
    ///
    /// # Errors
    /// Returns parameter errors before anything is executed, then as `map_row`.
    pub async fn map_row_named<T, F>(
        &self,
        query: &str,
        args: &NamedParams,
        map: F,
    ) -> Result<Option<T>, SqlRepositoryError>
    where
        F: FnMut(&mut RowMap) -> Result<T, SqlRepositoryError>,
    {
        let normalized = self.normalize(query, args)?;
        self.map_row(&normalized.sql, &normalized.params, map).await
    }

    /// Execute one DML statement inside its own transaction.
    ///
    /// A failed statement is rolled back, never committed. Metadata the engine cannot
    /// supply is reported as [`ExecutionOutcome::UNKNOWN`] rather than as an error.
    ///
    /// # Errors
    /// Returns `ExecutionError` wrapping the begin, exec or commit failure.
    pub async fn execute(
        &self,
        query: &str,
        args: &[RowValues],
    ) -> Result<ExecutionOutcome, SqlRepositoryError> {
        let mut tx = self.executor.begin_transaction().await.map_err(|e| {
            error!(query, error = %e, "unable to begin a transaction");
            SqlRepositoryError::ExecutionError(format!("execute failed to begin transaction: {e}"))
        })?;

        let exec = tx.execute_dml(query, args).await;
        let outcome = match exec {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(query, error = %e, "execute failed; rolling back");
                if let Err(rollback_err) = tx.rollback().await {
                    error!(query, error = %rollback_err, "rollback after failed execute also failed");
                }
                return Err(SqlRepositoryError::ExecutionError(format!(
                    "execute failed on exec: {e}"
                )));
            }
        };

        tx.commit().await.map_err(|e| {
            error!(query, error = %e, "error executing commit");
            SqlRepositoryError::ExecutionError(format!("execute failed during commit: {e}"))
        })?;

        Ok(ExecutionOutcome::from_dml(outcome))
    }

    /// [`Repository::execute`] with `:name` placeholders. Lists expand as in queries.
    ///
    /// # Errors
    /// Returns parameter errors before a transaction is opened, then as `execute`.
    pub async fn execute_named(
        &self,
        query: &str,
        args: &NamedParams,
    ) -> Result<ExecutionOutcome, SqlRepositoryError> {
        let normalized = self.normalize(query, args)?;
        self.execute(&normalized.sql, &normalized.params).await
    }
}
