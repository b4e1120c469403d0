use rusqlite::Statement;
use rusqlite::types::Value;

use crate::error::SqlRepositoryError;
use crate::results::ResultSet;
use crate::types::RowValues;

use super::params::Params;

/// Extract a `RowValues` from a `SQLite` row.
///
/// `SQLite` reports storage classes only, so integers come back as `Int64` and reals as
/// `Float64`; the row accessors narrow them on read.
///
/// # Errors
///
/// Returns `SqlRepositoryError::SqliteError` if the column cannot be read.
pub fn sqlite_extract_value(row: &rusqlite::Row, idx: usize) -> Result<RowValues, SqlRepositoryError> {
    let value: Value = row.get(idx)?;
    Ok(match value {
        Value::Null => RowValues::Null,
        Value::Integer(i) => RowValues::Int64(i),
        Value::Real(f) => RowValues::Float64(f),
        Value::Text(s) => RowValues::Text(s),
        Value::Blob(b) => RowValues::Blob(b),
    })
}

/// Run a prepared statement and drain its rows into a [`ResultSet`].
///
/// # Errors
/// Returns `SqlRepositoryError` if binding, stepping or value extraction fails.
pub fn build_result_set(stmt: &mut Statement<'_>, params: &Params) -> Result<ResultSet, SqlRepositoryError> {
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let col_count = column_names.len();
    let mut result_set = ResultSet::with_capacity(column_names, 10);

    let param_refs = params.as_refs();
    let mut rows = stmt.query(&param_refs[..])?;
    while let Some(row) = rows.next()? {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(sqlite_extract_value(row, i)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}
