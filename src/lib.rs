//! Thin async repository helpers over `rusqlite` and `tokio-postgres`.
//!
//! Queries take either positional [`RowValues`] or `:name` placeholders bound through
//! [`NamedParams`]; list arguments expand in place, so `where id in (:ids)` works with any
//! number of ids. Each row is handed to a caller-supplied mapping function as a [`RowMap`],
//! whose typed accessors record conversion problems instead of failing on the first one.
//!
//! ```rust,no_run
//! use sql_repository::prelude::*;
//!
//! # async fn demo() -> Result<(), SqlRepositoryError> {
//! let connector = SqliteOptions::builder("music.sqlite".into()).build().await?;
//! let repo = Repository::from_connector(&connector).await?;
//!
//! let names = repo
//!     .map_rows_named(
//!         "select Name from Artist where ArtistId in (:ids)",
//!         &NamedParams::new().bind("ids", vec![1_i64, 2]),
//!         |row| {
//!             let name = row.string("Name");
//!             row.err()?;
//!             Ok(name)
//!         },
//!     )
//!     .await?;
//! # let _ = names;
//! # Ok(()) }
//! ```

pub mod coercion;
pub mod error;
pub mod executor;
pub mod named;
pub mod prelude;
pub mod repository;
pub mod results;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use error::SqlRepositoryError;
pub use executor::{Connector, DatabaseExecutor, DmlOutcome, TransactionExecutor};
pub use named::{NormalizedQuery, PlaceholderStyle, normalize, normalize_with_style};
pub use repository::{ExecutionOutcome, Repository};
pub use results::{ColumnReadError, ResultSet, RowMap, RowReadError};
pub use types::{NamedArg, NamedParams, RowValues};
