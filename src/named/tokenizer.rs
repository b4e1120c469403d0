/// A `:name` placeholder found inside one token.
///
/// `prefix` and `suffix` are the token text around the placeholder, e.g. `(` and `)`
/// in `(:ids)` or `::int` in `:id::int`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Placeholder<'a> {
    pub(super) prefix: &'a str,
    pub(super) name: &'a str,
    pub(super) suffix: &'a str,
}

fn is_delimiter(ch: char) -> bool {
    ch.is_whitespace() || ch == ','
}

/// Split on whitespace and commas, keeping each token's byte offset into `sql`.
///
/// Delimiters are never part of a token, so `(:a,:b)` yields `(:a` and `:b)`.
pub(super) fn tokens(sql: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = None;
    for (idx, ch) in sql.char_indices() {
        if is_delimiter(ch) {
            if let Some(s) = start.take() {
                out.push((s, &sql[s..idx]));
            }
        } else if start.is_none() {
            start = Some(idx);
        }
    }
    if let Some(s) = start {
        out.push((s, &sql[s..]));
    }
    out
}

fn is_opening(ch: char) -> bool {
    matches!(ch, '(' | '[')
}

/// Unicode letters and digits, plus `_`.
fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Parse a token as a placeholder: optional opening punctuation, `:`, then a name.
pub(super) fn parse_placeholder(token: &str) -> Option<Placeholder<'_>> {
    let body_start = token.find(|c: char| !is_opening(c))?;
    let (prefix, body) = token.split_at(body_start);
    let after_sigil = body.strip_prefix(':')?;
    let name_len = after_sigil
        .find(|c: char| !is_name_char(c))
        .unwrap_or(after_sigil.len());
    if name_len == 0 {
        return None;
    }
    let (name, suffix) = after_sigil.split_at(name_len);
    Some(Placeholder {
        prefix,
        name,
        suffix,
    })
}
