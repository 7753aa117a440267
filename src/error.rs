use thiserror::Error;

/// Errors surfaced by this crate.
///
/// Driver failures are wrapped unchanged and kept reachable through
/// `source()`: `ConnectionError` covers establishing and authenticating a
/// session, `QueryError` covers preparing and running a statement. The
/// template variants are raised during composition, before any connection
/// is opened.
#[derive(Debug, Error)]
pub enum PgShimError {
    #[error("Connection error: {0}")]
    ConnectionError(#[source] postgres::Error),

    #[error("Query error: {0}")]
    QueryError(#[source] postgres::Error),

    #[error("Template mismatch: missing keys {missing:?}, unused keys {unused:?}")]
    TemplateMismatch {
        /// Placeholders in the template with no mapping entry, sorted.
        missing: Vec<String>,
        /// Mapping entries with no placeholder in the template, sorted.
        unused: Vec<String>,
    },

    #[error("Template parse error: {0}")]
    TemplateParse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Other database error: {0}")]
    Other(String),
}
