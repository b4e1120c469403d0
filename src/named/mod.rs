//! Rewrite `:name` placeholders into positional markers.
//!
//! Tokenization splits on whitespace and commas, not a SQL lexer: a placeholder must start
//! its own token (optionally opened by `(` or `[`, and followed by punctuation such as `)`
//! or a `::type` cast). Names are Unicode letters, digits and `_`. Placeholders inside
//! string literals are not supported.

use std::collections::HashMap;
use std::fmt::Write;

use crate::error::SqlRepositoryError;
use crate::types::{NamedArg, NamedParams, RowValues};

mod tokenizer;

use tokenizer::{parse_placeholder, tokens};

/// Positional marker syntax to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderStyle {
    /// PostgreSQL-style placeholders like `$1`.
    #[default]
    Postgres,
    /// SQLite-style placeholders like `?1`.
    Sqlite,
}

impl PlaceholderStyle {
    fn sigil(self) -> char {
        match self {
            PlaceholderStyle::Postgres => '$',
            PlaceholderStyle::Sqlite => '?',
        }
    }
}

/// Positional query text plus its flattened arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedQuery {
    pub sql: String,
    pub params: Vec<RowValues>,
}

/// One distinct placeholder name and the slot run it owns.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParamEntry<'a> {
    pub(crate) name: &'a str,
    /// 1-based index of the first slot.
    pub(crate) position: usize,
    pub(crate) value: &'a NamedArg,
    pub(crate) slot_count: usize,
}

/// Name → slot run, built by one forward scan of the query text.
#[derive(Debug, Default)]
pub(crate) struct SlotTable<'a> {
    entries: Vec<ParamEntry<'a>>,
    by_name: HashMap<&'a str, usize>,
}

impl<'a> SlotTable<'a> {
    fn get(&self, name: &str) -> Option<&ParamEntry<'a>> {
        self.by_name.get(name).map(|&idx| &self.entries[idx])
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Rewrite `:name` placeholders as `$n` markers.
///
/// ```rust
/// use sql_repository::prelude::*;
///
/// let params = NamedParams::new().bind("a", 7_i64).bind("bs", vec![1_i64, 2]);
/// let q = normalize("select * from t where a = :a and b in (:bs)", &params)?;
/// assert_eq!(q.sql, "select * from t where a = $1 and b in ($2, $3)");
/// assert_eq!(
///     q.params,
///     vec![RowValues::Int64(7), RowValues::Int64(1), RowValues::Int64(2)]
/// );
/// # Ok::<(), SqlRepositoryError>(())
/// ```
///
/// # Errors
/// See [`normalize_with_style`].
pub fn normalize(sql: &str, params: &NamedParams) -> Result<NormalizedQuery, SqlRepositoryError> {
    normalize_with_style(sql, params, PlaceholderStyle::Postgres)
}

/// Rewrite `:name` placeholders into `style` markers and flatten the arguments to match.
///
/// Every occurrence of one name shares that name's slot run. A list argument of length
/// N occupies N consecutive slots.
///
/// # Errors
/// - [`SqlRepositoryError::UnresolvedParameter`] when a placeholder has no argument.
/// - [`SqlRepositoryError::EmptyListParameter`] when a placeholder is bound to an empty list.
/// - [`SqlRepositoryError::ArgumentCountMismatch`] when arguments are left unused.
pub fn normalize_with_style(
    sql: &str,
    params: &NamedParams,
    style: PlaceholderStyle,
) -> Result<NormalizedQuery, SqlRepositoryError> {
    let toks = tokens(sql);
    let table = named_parameters(&toks, params)?;
    let rewritten = substitute(sql, &toks, &table, style)?;
    if table.len() != params.len() {
        return Err(SqlRepositoryError::ArgumentCountMismatch {
            arguments: params.len(),
            replaced: table.len(),
        });
    }
    let flat = flatten_args(&table);
    tracing::trace!(
        sql = %rewritten,
        names = ?table.entries.iter().map(|e| e.name).collect::<Vec<_>>(),
        params = flat.len(),
        "normalized named parameters"
    );
    Ok(NormalizedQuery {
        sql: rewritten,
        params: flat,
    })
}

/// First pass: assign each distinct name its first slot and slot count.
fn named_parameters<'a>(
    toks: &[(usize, &'a str)],
    params: &'a NamedParams,
) -> Result<SlotTable<'a>, SqlRepositoryError> {
    let mut table = SlotTable::default();
    let mut position = 1;

    for placeholder in toks.iter().filter_map(|&(_, tok)| parse_placeholder(tok)) {
        if table.by_name.contains_key(placeholder.name) {
            continue;
        }
        let value = params.get(placeholder.name).ok_or_else(|| {
            SqlRepositoryError::UnresolvedParameter {
                name: placeholder.name.to_owned(),
            }
        })?;
        let slot_count = value.slot_count();
        if slot_count == 0 {
            return Err(SqlRepositoryError::EmptyListParameter(
                placeholder.name.to_owned(),
            ));
        }
        table
            .by_name
            .insert(placeholder.name, table.entries.len());
        table.entries.push(ParamEntry {
            name: placeholder.name,
            position,
            value,
            slot_count,
        });
        position += slot_count;
    }

    Ok(table)
}

/// Second pass: splice each placeholder's markers into the text.
///
/// Text outside placeholder tokens is copied through unchanged.
fn substitute(
    sql: &str,
    toks: &[(usize, &str)],
    table: &SlotTable<'_>,
    style: PlaceholderStyle,
) -> Result<String, SqlRepositoryError> {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut copied_to = 0;

    for &(start, tok) in toks {
        let Some(placeholder) = parse_placeholder(tok) else {
            continue;
        };
        let entry =
            table
                .get(placeholder.name)
                .ok_or_else(|| SqlRepositoryError::UnresolvedParameter {
                    name: placeholder.name.to_owned(),
                })?;

        out.push_str(&sql[copied_to..start]);
        out.push_str(placeholder.prefix);
        for slot in 0..entry.slot_count {
            if slot > 0 {
                out.push_str(", ");
            }
            // writing to a String cannot fail
            let _ = write!(out, "{}{}", style.sigil(), entry.position + slot);
        }
        out.push_str(placeholder.suffix);
        copied_to = start + tok.len();
    }
    out.push_str(&sql[copied_to..]);

    Ok(out)
}

/// Positional arguments in slot order, lists expanded element by element.
fn flatten_args(table: &SlotTable<'_>) -> Vec<RowValues> {
    let mut entries: Vec<&ParamEntry<'_>> = table.entries.iter().collect();
    entries.sort_by_key(|e| e.position);

    let mut out = Vec::with_capacity(entries.iter().map(|e| e.slot_count).sum());
    for entry in entries {
        match entry.value {
            NamedArg::Scalar(v) => out.push(v.clone()),
            NamedArg::List(values) => out.extend(values.iter().cloned()),
        }
    }
    out
}
