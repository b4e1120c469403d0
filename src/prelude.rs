//! Convenient imports for common functionality.
//!
//! ```rust
//! use sql_repository::prelude::*;
//! ```

pub use crate::error::SqlRepositoryError;
pub use crate::executor::{Connector, DatabaseExecutor, DmlOutcome, TransactionExecutor};
pub use crate::named::{NormalizedQuery, PlaceholderStyle, normalize, normalize_with_style};
pub use crate::repository::{ExecutionOutcome, Repository};
pub use crate::results::{ColumnReadError, ResultSet, RowMap, RowReadError};
pub use crate::types::{NamedArg, NamedParams, RowValues};

#[cfg(feature = "postgres")]
pub use crate::postgres::{PostgresConnector, PostgresHandle, PostgresOptions, PostgresTx};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteConnector, SqliteHandle, SqliteOptions, SqliteOptionsBuilder, SqliteTx};
