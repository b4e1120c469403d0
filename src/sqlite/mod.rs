// SQLite module - rusqlite behind a bb8 pool
//
// - config: options, pool manager and connector
// - connection: pooled handle implementing `DatabaseExecutor`
// - params: parameter conversion between repository and SQLite types
// - query: result extraction and building
// - transaction: transaction handle implementing `TransactionExecutor`

pub mod config;
pub mod connection;
pub mod params;
pub mod query;
pub mod transaction;

pub use config::{
    SharedSqliteConnection, SqliteConnector, SqliteManager, SqliteOptions, SqliteOptionsBuilder,
};
pub use connection::SqliteHandle;
pub use params::Params;
pub use query::build_result_set;
pub use transaction::SqliteTx;
