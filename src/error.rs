use thiserror::Error;

use crate::results::RowReadError;

#[derive(Debug, Error)]
pub enum SqlRepositoryError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PoolErrorPostgres(#[from] deadpool_postgres::PoolError),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    /// A `:name` token in the query text has no bound argument.
    #[error("parameter '{name}' not found in named arguments")]
    UnresolvedParameter { name: String },

    /// The distinct placeholders in the text disagree with the supplied arguments.
    #[error("received {arguments} arguments and only replaced {replaced}")]
    ArgumentCountMismatch { arguments: usize, replaced: usize },

    #[error("parameter '{0}' is bound to an empty list")]
    EmptyListParameter(String),

    #[error(transparent)]
    ColumnRead(#[from] RowReadError),

    #[error("expected 0 or 1 rows, query produced {0}")]
    TooManyRows(usize),

    #[error("Other database error: {0}")]
    Other(String),
}
