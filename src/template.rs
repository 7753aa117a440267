use std::collections::{BTreeSet, HashMap};

use crate::error::PgShimError;
use crate::ident::SqlIdent;
use crate::query::ComposedQuery;
use crate::types::SqlValue;

/// One mapping entry for [`compose`]: what a `{name}` placeholder becomes.
#[derive(Debug, Clone)]
pub enum TemplateArg {
    /// Substituted inline as a quoted identifier.
    Ident(SqlIdent),
    /// Bound as a `$N` query parameter; never placed into the SQL text.
    Value(SqlValue),
}

impl TemplateArg {
    /// Shorthand for an identifier entry.
    #[must_use]
    pub fn ident(ident: impl Into<SqlIdent>) -> Self {
        TemplateArg::Ident(ident.into())
    }

    /// Shorthand for a value entry.
    #[must_use]
    pub fn value(value: SqlValue) -> Self {
        TemplateArg::Value(value)
    }
}

/// Scanner state while walking template text.
#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment(u32),
    DollarQuoted(String),
}

/// Compose a `{name}` template into an executable statement.
///
/// Each mapping entry states what its placeholder becomes:
/// [`TemplateArg::Ident`] renders inline as a quoted identifier;
/// [`TemplateArg::Value`] becomes a `$N` driver placeholder with the value
/// carried alongside the text, so literals are bound, never concatenated.
///
/// The placeholder and mapping key sets must match exactly. Any
/// disagreement fails with [`PgShimError::TemplateMismatch`] listing both
/// sides, before anything touches a database.
///
/// Placeholder names follow `[A-Za-z_][A-Za-z0-9_]*`; `{{` and `}}` are
/// literal braces. Text inside quoted strings, comments, and dollar-quoted
/// blocks is never treated as a placeholder. A placeholder repeated in the
/// template reuses its first `$N` ordinal.
///
/// ```rust
/// use pg_shim::prelude::*;
///
/// let query = compose(
///     "SELECT DISTINCT {tile} FROM {index}",
///     &[
///         ("tile", TemplateArg::ident("col")),
///         ("index", TemplateArg::ident(("myschema", "mytable"))),
///     ],
/// )?;
/// assert_eq!(query.sql(), r#"SELECT DISTINCT "col" FROM "myschema"."mytable""#);
/// # Ok::<(), pg_shim::PgShimError>(())
/// ```
///
/// # Errors
///
/// [`PgShimError::TemplateParse`] for malformed template text;
/// [`PgShimError::TemplateMismatch`] when the key sets disagree.
pub fn compose(
    template: &str,
    args: &[(&str, TemplateArg)],
) -> Result<ComposedQuery, PgShimError> {
    let mut entries: HashMap<&str, &TemplateArg> = HashMap::with_capacity(args.len());
    let mut duplicates: Vec<String> = Vec::new();
    for (name, arg) in args {
        if entries.insert(name, arg).is_some() {
            duplicates.push((*name).to_string());
        }
    }

    let chars: Vec<char> = template.chars().collect();
    let mut out = String::with_capacity(template.len());
    let mut params: Vec<SqlValue> = Vec::new();
    let mut ordinals: HashMap<String, usize> = HashMap::new();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut missing: BTreeSet<String> = BTreeSet::new();
    let mut state = State::Normal;
    let mut idx = 0;

    while idx < chars.len() {
        let c = chars[idx];
        match state {
            State::Normal => match c {
                '\'' => {
                    state = State::SingleQuoted;
                    out.push(c);
                    idx += 1;
                }
                '"' => {
                    state = State::DoubleQuoted;
                    out.push(c);
                    idx += 1;
                }
                '{' => {
                    if chars.get(idx + 1) == Some(&'{') {
                        out.push('{');
                        idx += 2;
                    } else {
                        let (name, after) = scan_placeholder(&chars, idx)?;
                        match entries.get(name.as_str()) {
                            Some(TemplateArg::Ident(ident)) => {
                                out.push_str(&ident.to_string());
                            }
                            Some(TemplateArg::Value(value)) => {
                                let ordinal = match ordinals.get(&name) {
                                    Some(&n) => n,
                                    None => {
                                        params.push(value.clone());
                                        let n = params.len();
                                        ordinals.insert(name.clone(), n);
                                        n
                                    }
                                };
                                out.push('$');
                                out.push_str(&ordinal.to_string());
                            }
                            None => {
                                missing.insert(name.clone());
                            }
                        }
                        seen.insert(name);
                        idx = after;
                    }
                }
                '}' => {
                    if chars.get(idx + 1) == Some(&'}') {
                        out.push('}');
                        idx += 2;
                    } else {
                        return Err(PgShimError::TemplateParse(format!(
                            "unmatched '}}' at offset {idx}"
                        )));
                    }
                }
                _ if is_line_comment_start(&chars, idx) => {
                    state = State::LineComment;
                    out.push(c);
                    idx += 1;
                }
                _ if is_block_comment_start(&chars, idx) => {
                    state = State::BlockComment(1);
                    out.push('/');
                    out.push('*');
                    idx += 2;
                }
                '$' => {
                    if let Some((tag, advance)) = try_start_dollar_quote(&chars, idx) {
                        // advance sits on the closing '$' of the opening delimiter
                        for ch in &chars[idx..=advance] {
                            out.push(*ch);
                        }
                        state = State::DollarQuoted(tag);
                        idx = advance + 1;
                    } else {
                        out.push(c);
                        idx += 1;
                    }
                }
                _ => {
                    out.push(c);
                    idx += 1;
                }
            },
            State::SingleQuoted => {
                if c == '\'' && chars.get(idx + 1) == Some(&'\'') {
                    out.push('\'');
                    out.push('\'');
                    idx += 2;
                } else {
                    if c == '\'' {
                        state = State::Normal;
                    }
                    out.push(c);
                    idx += 1;
                }
            }
            State::DoubleQuoted => {
                if c == '"' && chars.get(idx + 1) == Some(&'"') {
                    out.push('"');
                    out.push('"');
                    idx += 2;
                } else {
                    if c == '"' {
                        state = State::Normal;
                    }
                    out.push(c);
                    idx += 1;
                }
            }
            State::LineComment => {
                if c == '\n' {
                    state = State::Normal;
                }
                out.push(c);
                idx += 1;
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(&chars, idx) {
                    state = State::BlockComment(depth + 1);
                    out.push('/');
                    out.push('*');
                    idx += 2;
                } else if is_block_comment_end(&chars, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    out.push('*');
                    out.push('/');
                    idx += 2;
                } else {
                    out.push(c);
                    idx += 1;
                }
            }
            State::DollarQuoted(ref tag) => {
                if c == '$' && matches_tag(&chars, idx, tag) {
                    let close_len = tag.len() + 2;
                    for ch in &chars[idx..idx + close_len] {
                        out.push(*ch);
                    }
                    state = State::Normal;
                    idx += close_len;
                } else {
                    out.push(c);
                    idx += 1;
                }
            }
        }
    }

    let mut unused: Vec<String> = args
        .iter()
        .map(|(name, _)| (*name).to_string())
        .filter(|name| !seen.contains(name))
        .collect();
    unused.extend(duplicates);
    unused.sort();
    unused.dedup();
    let missing: Vec<String> = missing.into_iter().collect();

    if !missing.is_empty() || !unused.is_empty() {
        return Err(PgShimError::TemplateMismatch { missing, unused });
    }

    Ok(ComposedQuery::from_parts(out, params))
}

/// Read a placeholder name starting at the `{` at `open`. Returns the name
/// and the index just past the closing `}`.
fn scan_placeholder(chars: &[char], open: usize) -> Result<(String, usize), PgShimError> {
    let mut idx = open + 1;
    let mut name = String::new();
    while idx < chars.len() {
        let c = chars[idx];
        if c == '}' {
            if name.is_empty() {
                return Err(PgShimError::TemplateParse(format!(
                    "empty placeholder at offset {open}"
                )));
            }
            return Ok((name, idx + 1));
        }
        let valid = if name.is_empty() {
            c.is_ascii_alphabetic() || c == '_'
        } else {
            c.is_ascii_alphanumeric() || c == '_'
        };
        if !valid {
            return Err(PgShimError::TemplateParse(format!(
                "invalid character {c:?} in placeholder at offset {open}"
            )));
        }
        name.push(c);
        idx += 1;
    }
    Err(PgShimError::TemplateParse(format!(
        "unterminated placeholder at offset {open}"
    )))
}

fn is_line_comment_start(chars: &[char], idx: usize) -> bool {
    chars.get(idx) == Some(&'-') && chars.get(idx + 1) == Some(&'-')
}

fn is_block_comment_start(chars: &[char], idx: usize) -> bool {
    chars.get(idx) == Some(&'/') && chars.get(idx + 1) == Some(&'*')
}

fn is_block_comment_end(chars: &[char], idx: usize) -> bool {
    chars.get(idx) == Some(&'*') && chars.get(idx + 1) == Some(&'/')
}

fn try_start_dollar_quote(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut idx = start + 1;
    while idx < chars.len() && chars[idx] != '$' {
        let c = chars[idx];
        if !(c.is_ascii_alphanumeric() || c == '_') {
            return None;
        }
        idx += 1;
    }

    if idx < chars.len() && chars[idx] == '$' {
        let tag: String = chars[start + 1..idx].iter().collect();
        Some((tag, idx))
    } else {
        None
    }
}

fn matches_tag(chars: &[char], idx: usize, tag: &str) -> bool {
    let tag_len = tag.chars().count();
    let end = idx + 1 + tag_len;
    chars.get(end) == Some(&'$')
        && chars
            .get(idx + 1..end)
            .is_some_and(|slice| slice.iter().copied().eq(tag.chars()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_idents_inline_and_binds_values() {
        let query = compose(
            "SELECT {col} FROM {table} WHERE id = {id}",
            &[
                ("col", TemplateArg::ident("name")),
                ("table", TemplateArg::ident(("s", "t"))),
                ("id", TemplateArg::value(SqlValue::Int(42))),
            ],
        )
        .unwrap();

        assert_eq!(query.sql(), r#"SELECT "name" FROM "s"."t" WHERE id = $1"#);
        assert_eq!(query.params(), &[SqlValue::Int(42)]);
    }

    #[test]
    fn repeated_value_placeholder_reuses_its_ordinal() {
        let query = compose(
            "SELECT {a} WHERE {a} = {b} OR {b} = {a}",
            &[
                ("a", TemplateArg::value(SqlValue::Int(1))),
                ("b", TemplateArg::value(SqlValue::Int(2))),
            ],
        )
        .unwrap();

        assert_eq!(query.sql(), "SELECT $1 WHERE $1 = $2 OR $2 = $1");
        assert_eq!(query.params(), &[SqlValue::Int(1), SqlValue::Int(2)]);
    }

    #[test]
    fn reports_missing_and_unused_keys_sorted() {
        let err = compose(
            "SELECT {b}, {a} FROM t",
            &[
                ("z", TemplateArg::ident("x")),
                ("m", TemplateArg::ident("y")),
            ],
        )
        .unwrap_err();

        match err {
            PgShimError::TemplateMismatch { missing, unused } => {
                assert_eq!(missing, vec!["a".to_string(), "b".to_string()]);
                assert_eq!(unused, vec!["m".to_string(), "z".to_string()]);
            }
            other => panic!("expected TemplateMismatch, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_keys_count_as_unused() {
        let err = compose(
            "SELECT {a}",
            &[
                ("a", TemplateArg::value(SqlValue::Int(1))),
                ("a", TemplateArg::value(SqlValue::Int(2))),
            ],
        )
        .unwrap_err();

        match err {
            PgShimError::TemplateMismatch { missing, unused } => {
                assert!(missing.is_empty());
                assert_eq!(unused, vec!["a".to_string()]);
            }
            other => panic!("expected TemplateMismatch, got {other:?}"),
        }
    }

    #[test]
    fn skips_placeholders_inside_literals_and_comments() {
        let query = compose(
            "select '{a}', {a} -- {b}\n/* {c} */ from t where x = {a}",
            &[("a", TemplateArg::value(SqlValue::Int(5)))],
        )
        .unwrap();

        assert_eq!(
            query.sql(),
            "select '{a}', $1 -- {b}\n/* {c} */ from t where x = $1"
        );
        assert_eq!(query.params(), &[SqlValue::Int(5)]);
    }

    #[test]
    fn skips_dollar_quoted_blocks() {
        let query = compose(
            "$foo$ {a} $foo$ where x = {a}",
            &[("a", TemplateArg::value(SqlValue::Int(9)))],
        )
        .unwrap();

        assert_eq!(query.sql(), "$foo$ {a} $foo$ where x = $1");
    }

    #[test]
    fn skips_anonymous_dollar_quoted_blocks() {
        let query = compose(
            "do $$ {a} $$; select {a}",
            &[("a", TemplateArg::value(SqlValue::Int(3)))],
        )
        .unwrap();

        assert_eq!(query.sql(), "do $$ {a} $$; select $1");
    }

    #[test]
    fn skips_placeholders_inside_quoted_identifiers() {
        let query = compose(
            r#"select "{a}" from t where x = {a}"#,
            &[("a", TemplateArg::value(SqlValue::Int(1)))],
        )
        .unwrap();

        assert_eq!(query.sql(), r#"select "{a}" from t where x = $1"#);
    }

    #[test]
    fn escaped_braces_become_literal_braces() {
        let query = compose(
            "select {{a}} , {a}",
            &[("a", TemplateArg::value(SqlValue::Int(1)))],
        )
        .unwrap();

        assert_eq!(query.sql(), "select {a} , $1");
    }

    #[test]
    fn escaped_quote_inside_literal_does_not_end_it() {
        let query = compose(
            "select 'it''s {a}' , {a}",
            &[("a", TemplateArg::value(SqlValue::Int(1)))],
        )
        .unwrap();

        assert_eq!(query.sql(), "select 'it''s {a}' , $1");
    }

    #[test]
    fn multibyte_text_survives_composition() {
        let query = compose(
            "select 'héllo wörld', {a}",
            &[("a", TemplateArg::value(SqlValue::Int(1)))],
        )
        .unwrap();

        assert_eq!(query.sql(), "select 'héllo wörld', $1");
    }

    #[test]
    fn lone_close_brace_is_a_parse_error() {
        let err = compose("select a} from t", &[]).unwrap_err();
        assert!(matches!(err, PgShimError::TemplateParse(_)));
    }

    #[test]
    fn empty_placeholder_is_a_parse_error() {
        let err = compose("select {} from t", &[]).unwrap_err();
        assert!(matches!(err, PgShimError::TemplateParse(_)));
    }

    #[test]
    fn unterminated_placeholder_is_a_parse_error() {
        let err = compose("select {abc", &[]).unwrap_err();
        assert!(matches!(err, PgShimError::TemplateParse(_)));
    }

    #[test]
    fn non_identifier_placeholder_is_a_parse_error() {
        let err = compose("select {a b} from t", &[]).unwrap_err();
        assert!(matches!(err, PgShimError::TemplateParse(_)));
        let err = compose("select {1a} from t", &[]).unwrap_err();
        assert!(matches!(err, PgShimError::TemplateParse(_)));
    }

    #[test]
    fn nested_block_comments_are_tracked() {
        let query = compose(
            "select {a} /* outer /* inner {b} */ still {c} */ from t",
            &[("a", TemplateArg::value(SqlValue::Int(1)))],
        )
        .unwrap();

        assert_eq!(
            query.sql(),
            "select $1 /* outer /* inner {b} */ still {c} */ from t"
        );
    }
}
