//! Lightweight synchronous wrapper for rust-postgres.
//!
//! Two pieces do the work:
//!
//! - [`Db`], a handle that opens one scoped connection per call and closes
//!   it before returning, so nothing leaks across calls;
//! - [`compose`], a `{name}` template composer that inlines identifiers in
//!   quoted form and binds every literal value as a `$N` parameter, so
//!   neither can escape its slot.
//!
//! ```no_run
//! use pg_shim::prelude::*;
//!
//! fn main() -> Result<(), PgShimError> {
//!     let db = Db::new(PgOptions::from_env()?);
//!     let query = compose(
//!         "SELECT DISTINCT {tile} FROM {index}",
//!         &[
//!             ("tile", TemplateArg::ident("col")),
//!             ("index", TemplateArg::ident(("myschema", "mytable"))),
//!         ],
//!     )?;
//!     for row in &db.execute_returning(&query)?.rows {
//!         println!("{:?}", row.get("col"));
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
mod convenience;
pub mod error;
pub mod ident;
pub mod params;
pub mod prelude;
pub mod query;
pub mod results;
pub mod template;
pub mod types;

pub use config::PgOptions;
pub use connection::Db;
pub use error::PgShimError;
pub use ident::{SqlIdent, quote_ident};
pub use query::{ComposedQuery, compact_sql};
pub use results::{ResultRow, ResultSet};
pub use template::{TemplateArg, compose};
pub use types::SqlValue;
