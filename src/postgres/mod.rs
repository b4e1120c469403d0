// PostgreSQL module - tokio-postgres behind a deadpool pool
//
// - config: serde options and the connector
// - connection: pooled handle implementing `DatabaseExecutor`
// - params: `ToSql` for repository values
// - query: result extraction and building
// - transaction: transaction handle implementing `TransactionExecutor`

pub mod config;
pub mod connection;
pub mod params;
pub mod query;
pub mod transaction;

pub use config::{PostgresConnector, PostgresOptions};
pub use connection::PostgresHandle;
pub use params::Params;
pub use query::{build_result_set_from_statement, postgres_extract_value};
pub use transaction::PostgresTx;
