use std::error::Error;

use chrono::{NaiveDate, NaiveDateTime};
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use tokio_util::bytes;

use crate::coercion::{to_float, to_integer};
use crate::types::RowValues;

/// Borrowed Postgres parameters for one call.
pub struct Params<'a> {
    references: Vec<&'a (dyn ToSql + Sync)>,
}

impl<'a> Params<'a> {
    #[must_use]
    pub fn convert(params: &'a [RowValues]) -> Params<'a> {
        let references = params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        Params { references }
    }

    #[must_use]
    pub fn as_refs(&self) -> &[&(dyn ToSql + Sync)] {
        &self.references
    }
}

fn bind_error(value: &RowValues, ty: &Type) -> Box<dyn Error + Sync + Send> {
    format!("cannot bind {} value to postgres type {ty}", value.type_name()).into()
}

fn timestamp_to_sql(
    dt: NaiveDateTime,
    ty: &Type,
    out: &mut bytes::BytesMut,
) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
    match *ty {
        Type::TIMESTAMPTZ => dt.and_utc().to_sql(ty, out),
        Type::DATE => dt.date().to_sql(ty, out),
        _ => dt.to_sql(ty, out),
    }
}

/// Integer and float values are sized to the parameter type the server inferred, so an
/// `Int64` argument can bind an `int4` column and vice versa when the value fits.
/// Timestamps bind to `timestamp`, `timestamptz` (read as UTC) and `date`; text in
/// `YYYY-MM-DD[ HH:MM:SS[.fff]]` form binds to those types too.
impl ToSql for RowValues {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            RowValues::Int8(_) | RowValues::Int16(_) | RowValues::Int32(_) | RowValues::Int64(_) => {
                let v: i64 = to_integer(self).ok_or_else(|| bind_error(self, ty))?;
                match *ty {
                    Type::CHAR => i8::try_from(v)?.to_sql(ty, out),
                    Type::INT2 => i16::try_from(v)?.to_sql(ty, out),
                    Type::INT4 => i32::try_from(v)?.to_sql(ty, out),
                    _ => v.to_sql(ty, out),
                }
            }
            RowValues::Float32(_) | RowValues::Float64(_) => {
                let v: f64 = to_float(self).ok_or_else(|| bind_error(self, ty))?;
                match *ty {
                    #[allow(clippy::cast_possible_truncation)]
                    Type::FLOAT4 => (v as f32).to_sql(ty, out),
                    _ => v.to_sql(ty, out),
                }
            }
            RowValues::Text(s) => match *ty {
                Type::DATE => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .ok()
                    .or_else(|| self.as_timestamp().map(|dt| dt.date()))
                    .ok_or_else(|| bind_error(self, ty))?
                    .to_sql(ty, out),
                Type::TIMESTAMP | Type::TIMESTAMPTZ => {
                    let dt = self.as_timestamp().ok_or_else(|| bind_error(self, ty))?;
                    timestamp_to_sql(dt, ty, out)
                }
                _ => s.to_sql(ty, out),
            },
            RowValues::Bool(b) => b.to_sql(ty, out),
            RowValues::Timestamp(dt) => timestamp_to_sql(*dt, ty, out),
            RowValues::JSON(jsval) => jsval.to_sql(ty, out),
            RowValues::Blob(bytes) => bytes.to_sql(ty, out),
            RowValues::Null => Ok(IsNull::Yes),
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::CHAR
                | Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::TEXT
                | Type::VARCHAR
                | Type::BPCHAR
                | Type::NAME
                | Type::BOOL
                | Type::TIMESTAMP
                | Type::TIMESTAMPTZ
                | Type::DATE
                | Type::JSON
                | Type::JSONB
                | Type::BYTEA
        )
    }

    to_sql_checked!();
}
