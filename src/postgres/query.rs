use chrono::NaiveDateTime;
use serde_json::Value;
use tokio_postgres::Statement;
use tokio_postgres::types::Type;

use crate::error::SqlRepositoryError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Extracts a `RowValues` from a `tokio_postgres` row at the given index.
///
/// Column types without a dedicated variant are read as text.
///
/// # Errors
/// Returns `SqlRepositoryError::PostgresError` if the column cannot be read.
pub fn postgres_extract_value(
    row: &tokio_postgres::Row,
    idx: usize,
) -> Result<RowValues, SqlRepositoryError> {
    let ty = row.columns()[idx].type_().clone();
    let value = match ty {
        Type::INT2 => row.try_get::<_, Option<i16>>(idx)?.map(RowValues::Int16),
        Type::INT4 => row.try_get::<_, Option<i32>>(idx)?.map(RowValues::Int32),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.map(RowValues::Int64),
        Type::FLOAT4 => row.try_get::<_, Option<f32>>(idx)?.map(RowValues::Float32),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.map(RowValues::Float64),
        Type::BOOL => row.try_get::<_, Option<bool>>(idx)?.map(RowValues::Bool),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)?
            .map(RowValues::Timestamp),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<chrono::DateTime<chrono::Utc>>>(idx)?
            .map(|dt| RowValues::Timestamp(dt.naive_utc())),
        Type::JSON | Type::JSONB => row.try_get::<_, Option<Value>>(idx)?.map(RowValues::JSON),
        Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(idx)?.map(RowValues::Blob),
        _ => row.try_get::<_, Option<String>>(idx)?.map(RowValues::Text),
    };
    Ok(value.unwrap_or(RowValues::Null))
}

/// Build a result set using statement metadata for column names, so an empty result
/// still reports its columns.
///
/// # Errors
/// Returns errors from row value extraction.
pub fn build_result_set_from_statement(
    stmt: &Statement,
    rows: &[tokio_postgres::Row],
) -> Result<ResultSet, SqlRepositoryError> {
    let column_names: Vec<String> = stmt
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect();
    let column_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(column_names, rows.len());
    for row in rows {
        let mut row_values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            row_values.push(postgres_extract_value(row, idx)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}
