use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::coercion::{FloatType, IntegerType, to_bool, to_float, to_integer};
use crate::types::RowValues;

/// One failed typed read against a [`RowMap`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColumnReadError {
    #[error("key '{key}' does not exist in row map")]
    MissingColumn { key: String },

    #[error("cannot convert key '{key}' value '{value:?}' to '{target}'")]
    Conversion {
        key: String,
        value: RowValues,
        target: &'static str,
    },
}

/// Every [`ColumnReadError`] recorded by one row, in access order.
#[derive(Debug, Clone, PartialEq)]
pub struct RowReadError(pub Vec<ColumnReadError>);

impl fmt::Display for RowReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RowReadError {}

/// Typed access over one decoded row.
///
/// Accessors never fail on the spot. A missing column or a stored value of the wrong
/// shape records a [`ColumnReadError`] and yields the zero value, so a mapping function
/// can read every column and check once:
///
/// ```rust
/// use sql_repository::prelude::*;
///
/// struct Album {
///     id: i64,
///     title: String,
/// }
///
/// fn map_album(r: &mut RowMap) -> Result<Album, SqlRepositoryError> {
///     let album = Album {
///         id: r.int64("AlbumId"),
///         title: r.string("Title"),
///     };
///     r.err()?;
///     Ok(album)
/// }
///
/// let mut row = RowMap::new(
///     vec!["AlbumId".into(), "Title".into()],
///     vec![RowValues::Int64(1), RowValues::Text("Let There Be Rock".into())],
/// );
/// let album = map_album(&mut row).unwrap();
/// assert_eq!(album.id, 1);
/// assert_eq!(album.title, "Let There Be Rock");
/// ```
#[derive(Debug, Clone)]
pub struct RowMap {
    column_names: Arc<Vec<String>>,
    column_index: Arc<HashMap<String, usize>>,
    values: Vec<RowValues>,
    errors: Vec<ColumnReadError>,
}

impl RowMap {
    /// Build a decoder from parallel column-name and value sequences.
    ///
    /// Extra names or extra values beyond the shorter sequence are ignored.
    #[must_use]
    pub fn new(column_names: Vec<String>, values: Vec<RowValues>) -> Self {
        let column_index = column_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self::from_shared(Arc::new(column_names), Arc::new(column_index), values)
    }

    pub(crate) fn from_shared(
        column_names: Arc<Vec<String>>,
        column_index: Arc<HashMap<String, usize>>,
        values: Vec<RowValues>,
    ) -> Self {
        Self {
            column_names,
            column_index,
            values,
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.column_names
    }

    /// Raw stored value for `key`. Does not record errors.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RowValues> {
        self.column_index
            .get(key)
            .and_then(|&idx| self.values.get(idx))
    }

    /// Whether `key` holds NULL. A missing column is recorded and reported as not null.
    pub fn is_null(&mut self, key: &str) -> bool {
        self.lookup(key).is_some_and(RowValues::is_null)
    }

    /// Collapse the recorded errors. `Ok(())` when every access succeeded.
    ///
    /// # Errors
    /// Returns a [`RowReadError`] holding every failed access so far.
    pub fn err(&self) -> Result<(), RowReadError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(RowReadError(self.errors.clone()))
        }
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[ColumnReadError] {
        &self.errors
    }

    fn lookup(&mut self, key: &str) -> Option<&RowValues> {
        match self.column_index.get(key).copied() {
            Some(idx) if idx < self.values.len() => Some(&self.values[idx]),
            _ => {
                self.errors.push(ColumnReadError::MissingColumn {
                    key: key.to_owned(),
                });
                None
            }
        }
    }

    /// Look `key` up and convert it, recording a conversion error on `None`.
    fn read<T: Default>(
        &mut self,
        key: &str,
        target: &'static str,
        convert: impl FnOnce(&RowValues) -> Option<T>,
    ) -> T {
        let Some(value) = self.lookup(key) else {
            return T::default();
        };
        match convert(value) {
            Some(v) => v,
            None => {
                let value = value.clone();
                self.errors.push(ColumnReadError::Conversion {
                    key: key.to_owned(),
                    value,
                    target,
                });
                T::default()
            }
        }
    }

    fn integer<T: IntegerType>(&mut self, key: &str) -> T {
        self.read(key, T::TYPE_NAME, to_integer::<T>)
    }

    fn float<T: FloatType>(&mut self, key: &str) -> T {
        self.read(key, T::TYPE_NAME, to_float::<T>)
    }

    /// Text columns only. Other shapes record an error and yield `""`.
    pub fn string(&mut self, key: &str) -> String {
        self.read(key, "string", |v| v.as_text().map(str::to_owned))
    }

    pub fn int64(&mut self, key: &str) -> i64 {
        self.integer(key)
    }

    /// Wider stored integers are truncated to 32 bits.
    pub fn int32(&mut self, key: &str) -> i32 {
        self.integer(key)
    }

    pub fn int16(&mut self, key: &str) -> i16 {
        self.integer(key)
    }

    pub fn int8(&mut self, key: &str) -> i8 {
        self.integer(key)
    }

    pub fn float64(&mut self, key: &str) -> f64 {
        self.float(key)
    }

    pub fn float32(&mut self, key: &str) -> f32 {
        self.float(key)
    }

    /// Integer columns read as `value != 0`; native booleans pass through.
    pub fn bool(&mut self, key: &str) -> bool {
        self.read(key, "bool", to_bool)
    }

    /// Blob columns only. Other shapes record an error and yield an empty vector.
    pub fn bytes(&mut self, key: &str) -> Vec<u8> {
        self.read(key, "bytes", |v| v.as_blob().map(<[u8]>::to_vec))
    }

    /// Native timestamps, or text in `YYYY-MM-DD HH:MM:SS[.fff]` form.
    pub fn timestamp(&mut self, key: &str) -> NaiveDateTime {
        self.read(key, "timestamp", RowValues::as_timestamp)
    }

    /// Native JSON, or text that parses as JSON.
    pub fn json(&mut self, key: &str) -> JsonValue {
        self.read(key, "json", RowValues::as_json)
    }
}
