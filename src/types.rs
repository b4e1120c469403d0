use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

/// Values stored in a decoded row or bound as positional parameters.
///
/// Integer and float widths are kept as the engine reported them so the row decoder can
/// widen or narrow on request:
/// ```rust
/// use sql_repository::prelude::*;
///
/// let params = vec![
///     RowValues::Int64(1),
///     RowValues::Text("alice".into()),
///     RowValues::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    /// Text/string value
    Text(String),
    /// Boolean value (engines without a boolean type store 0/1 integers)
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
    /// NULL value
    Null,
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // Try "YYYY-MM-DD HH:MM:SS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt);
            }
            // Try "YYYY-MM-DD HH:MM:SS.SSS"
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    #[must_use]
    pub fn as_json(&self) -> Option<JsonValue> {
        match self {
            RowValues::JSON(value) => Some(value.clone()),
            RowValues::Text(s) => serde_json::from_str(s).ok(),
            _ => None,
        }
    }

    /// Short name of the stored shape, used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            RowValues::Int8(_) => "int8",
            RowValues::Int16(_) => "int16",
            RowValues::Int32(_) => "int32",
            RowValues::Int64(_) => "int64",
            RowValues::Float32(_) => "float32",
            RowValues::Float64(_) => "float64",
            RowValues::Text(_) => "string",
            RowValues::Bool(_) => "bool",
            RowValues::Timestamp(_) => "timestamp",
            RowValues::JSON(_) => "json",
            RowValues::Blob(_) => "bytes",
            RowValues::Null => "null",
        }
    }
}

macro_rules! row_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for RowValues {
                fn from(value: $ty) -> Self {
                    RowValues::$variant(value)
                }
            }
        )*
    };
}

row_value_from! {
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    bool => Bool,
    String => Text,
    NaiveDateTime => Timestamp,
    JsonValue => JSON,
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_owned())
    }
}

impl<T: Into<RowValues>> From<Option<T>> for RowValues {
    fn from(value: Option<T>) -> Self {
        value.map_or(RowValues::Null, Into::into)
    }
}

/// Shape of one named argument, decided when the argument is bound.
///
/// A `List` occupies one positional slot per element, which is how `IN (:ids)` expands.
#[derive(Debug, Clone, PartialEq)]
pub enum NamedArg {
    Scalar(RowValues),
    List(Vec<RowValues>),
}

impl NamedArg {
    /// Number of positional slots this argument occupies.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        match self {
            NamedArg::Scalar(_) => 1,
            NamedArg::List(values) => values.len(),
        }
    }
}

impl From<RowValues> for NamedArg {
    fn from(value: RowValues) -> Self {
        NamedArg::Scalar(value)
    }
}

impl From<Vec<RowValues>> for NamedArg {
    fn from(values: Vec<RowValues>) -> Self {
        NamedArg::List(values)
    }
}

macro_rules! named_arg_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for NamedArg {
                fn from(value: $ty) -> Self {
                    NamedArg::Scalar(value.into())
                }
            }

            impl From<Vec<$ty>> for NamedArg {
                fn from(values: Vec<$ty>) -> Self {
                    NamedArg::List(values.into_iter().map(Into::into).collect())
                }
            }
        )*
    };
}

named_arg_from!(i8, i16, i32, i64, f32, f64, bool, String, &str, NaiveDateTime);

/// Named arguments for `:name` placeholders.
///
/// Keys are stored without the leading `:`, so `":id"` and `"id"` bind the same
/// placeholder. Insertion order is kept for diagnostics.
///
/// ```rust
/// use sql_repository::prelude::*;
///
/// let params = NamedParams::new()
///     .bind(":artist", 3_i32)
///     .bind("ids", vec![1_i64, 2, 3]);
/// assert_eq!(params.len(), 2);
/// assert_eq!(params.get("artist"), Some(&NamedArg::Scalar(RowValues::Int32(3))));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedParams {
    entries: Vec<(String, NamedArg)>,
}

impl NamedParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` to `name`, replacing any earlier binding of the same name.
    #[must_use]
    pub fn bind(mut self, name: &str, value: impl Into<NamedArg>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<NamedArg>) {
        let key = bare_name(name);
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key.to_owned(), value));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&NamedArg> {
        let key = bare_name(name);
        self.entries
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<NamedArg>> FromIterator<(K, V)> for NamedParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = NamedParams::new();
        for (name, value) in iter {
            params.insert(name.as_ref(), value);
        }
        params
    }
}

fn bare_name(name: &str) -> &str {
    name.strip_prefix(':').unwrap_or(name)
}
