use std::fmt;

/// Quote one identifier part for inlining into SQL text.
///
/// Wraps the name in double quotes and doubles any embedded double quote,
/// which is the only escaping double-quoted identifiers need.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// A database identifier, optionally qualified.
///
/// Rendering always quotes every part, so reserved words and mixed-case
/// names survive:
/// ```rust
/// use pg_shim::SqlIdent;
///
/// let table = SqlIdent::qualified("myschema", "mytable");
/// assert_eq!(format!("select * from {table}"), r#"select * from "myschema"."mytable""#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlIdent {
    parts: Vec<String>,
}

impl SqlIdent {
    /// Single-part identifier (a column, or an unqualified table).
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            parts: vec![name.into()],
        }
    }

    /// Schema-qualified identifier.
    #[must_use]
    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            parts: vec![schema.into(), name.into()],
        }
    }

    /// Identifier built from an arbitrary part list.
    #[must_use]
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// The unquoted parts, in order.
    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.parts
    }
}

impl fmt::Display for SqlIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&quote_ident(part))?;
        }
        Ok(())
    }
}

impl From<&str> for SqlIdent {
    fn from(name: &str) -> Self {
        SqlIdent::new(name)
    }
}

impl From<String> for SqlIdent {
    fn from(name: String) -> Self {
        SqlIdent::new(name)
    }
}

impl From<(&str, &str)> for SqlIdent {
    fn from((schema, name): (&str, &str)) -> Self {
        SqlIdent::qualified(schema, name)
    }
}
