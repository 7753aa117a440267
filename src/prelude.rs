//! One-stop imports for the common types and functions.

pub use crate::config::PgOptions;
pub use crate::connection::Db;
pub use crate::error::PgShimError;
pub use crate::ident::{SqlIdent, quote_ident};
pub use crate::query::{ComposedQuery, compact_sql};
pub use crate::results::{ResultRow, ResultSet};
pub use crate::template::{TemplateArg, compose};
pub use crate::types::SqlValue;
