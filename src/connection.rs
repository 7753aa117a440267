use postgres::{Client, NoTls};

use crate::config::{PgOptions, build_pg_config};
use crate::error::PgShimError;
use crate::params::Params;
use crate::query::{ComposedQuery, compact_sql};
use crate::results::{ResultSet, build_result_set};

/// A database handle that opens one connection per call.
///
/// `Db` holds connection parameters only. Each execute call opens a fresh
/// session, runs its statement, and drops the client before returning, so
/// no connection outlives the call that created it, error paths included.
/// That makes the handle safe to keep around for the life of a program
/// without tying up a server slot.
///
/// ```no_run
/// use pg_shim::prelude::*;
///
/// let db = Db::new(PgOptions::new().with_host("localhost").with_dbname("gis"));
/// let rows = db.execute_returning(&"SELECT version()".into())?;
/// println!("{:?}", rows.rows.first().and_then(|r| r.get_by_index(0)));
/// db.close();
/// # Ok::<(), PgShimError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Db {
    opts: PgOptions,
}

impl Db {
    /// Create a handle from explicit options. No connection is attempted.
    #[must_use]
    pub fn new(opts: PgOptions) -> Self {
        Self { opts }
    }

    /// Create a handle with every option taken from the `PG*` environment
    /// variables.
    ///
    /// # Errors
    ///
    /// Returns `PgShimError::ConfigError` when an environment value cannot
    /// be used (see [`PgOptions::resolve_env`]).
    pub fn from_env() -> Result<Self, PgShimError> {
        Ok(Self::new(PgOptions::from_env()?))
    }

    /// The options this handle connects with.
    #[must_use]
    pub fn options(&self) -> &PgOptions {
        &self.opts
    }

    /// Run a statement and materialize every row it returns.
    ///
    /// The statement is prepared first, so column names are available even
    /// when nothing matches; zero rows yield an empty set, not an error.
    ///
    /// # Errors
    ///
    /// `PgShimError::ConnectionError` if a session cannot be established,
    /// `PgShimError::QueryError` if preparation or execution fails.
    pub fn execute_returning(&self, query: &ComposedQuery) -> Result<ResultSet, PgShimError> {
        let mut client = self.connect()?;
        tracing::debug!("executing returning sql={}", compact_sql(query.sql()));
        let stmt = client
            .prepare(query.sql())
            .map_err(PgShimError::QueryError)?;
        let params = Params::convert(query.params());
        let rows = client
            .query(&stmt, params.as_refs())
            .map_err(PgShimError::QueryError)?;
        build_result_set(&stmt, &rows)
    }

    /// Run a statement and discard any result.
    ///
    /// Statements without bound parameters go through the driver's batch
    /// path, so multi-statement scripts and statements that must run
    /// outside a transaction (such as `VACUUM`) work as-is. Parameterized
    /// statements are prepared and executed once.
    ///
    /// # Errors
    ///
    /// `PgShimError::ConnectionError` if a session cannot be established,
    /// `PgShimError::QueryError` if execution fails.
    pub fn execute_noreturn(&self, query: &ComposedQuery) -> Result<(), PgShimError> {
        let mut client = self.connect()?;
        tracing::debug!("executing sql={}", compact_sql(query.sql()));
        if query.params().is_empty() {
            client
                .batch_execute(query.sql())
                .map_err(PgShimError::QueryError)?;
        } else {
            let stmt = client
                .prepare(query.sql())
                .map_err(PgShimError::QueryError)?;
            let params = Params::convert(query.params());
            client
                .execute(&stmt, params.as_refs())
                .map_err(PgShimError::QueryError)?;
        }
        Ok(())
    }

    /// Release held resources. Connections are scoped per call and nothing
    /// is held between calls, so this does no work; it exists so call
    /// sites written against connection-holding clients keep working.
    /// Calling it any number of times, including before any query, is fine.
    pub fn close(&self) {
        tracing::debug!("close requested; connections are per-call, nothing held");
    }

    // One session per call; the client dropping at the end of the calling
    // scope closes the socket on every exit path.
    fn connect(&self) -> Result<Client, PgShimError> {
        let config = build_pg_config(&self.opts);
        let client = config.connect(NoTls).map_err(PgShimError::ConnectionError)?;
        tracing::debug!(
            "connected host={:?} port={:?} dbname={:?} user={:?}",
            self.opts.host,
            self.opts.port,
            self.opts.dbname,
            self.opts.user
        );
        Ok(client)
    }
}
