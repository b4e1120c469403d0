use rusqlite::ToSql;
use rusqlite::types::Value;

use crate::types::RowValues;

/// Convert a single `RowValues` to a rusqlite `Value`.
///
/// Booleans are stored as `0`/`1`, timestamps as `YYYY-MM-DD HH:MM:SS[.fff]` text and JSON
/// as its serialized text.
#[must_use]
pub fn row_value_to_sqlite_value(value: &RowValues) -> Value {
    match value {
        RowValues::Int8(i) => Value::Integer(i64::from(*i)),
        RowValues::Int16(i) => Value::Integer(i64::from(*i)),
        RowValues::Int32(i) => Value::Integer(i64::from(*i)),
        RowValues::Int64(i) => Value::Integer(*i),
        RowValues::Float32(f) => Value::Real(f64::from(*f)),
        RowValues::Float64(f) => Value::Real(*f),
        RowValues::Text(s) => Value::Text(s.clone()),
        RowValues::Bool(b) => Value::Integer(i64::from(*b)),
        RowValues::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
        RowValues::JSON(jval) => Value::Text(jval.to_string()),
        RowValues::Blob(bytes) => Value::Blob(bytes.clone()),
        RowValues::Null => Value::Null,
    }
}

/// Owned `SQLite` parameters, ready to move onto a blocking worker.
#[derive(Debug, Clone, Default)]
pub struct Params(pub Vec<Value>);

impl Params {
    #[must_use]
    pub fn convert(params: &[RowValues]) -> Self {
        Params(params.iter().map(row_value_to_sqlite_value).collect())
    }

    #[must_use]
    pub fn as_values(&self) -> &[Value] {
        &self.0
    }

    /// Borrowed params slice suitable for rusqlite execution.
    #[must_use]
    pub fn as_refs(&self) -> Vec<&dyn ToSql> {
        self.0.iter().map(|v| v as &dyn ToSql).collect()
    }
}
