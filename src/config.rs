use postgres::Config as PgConfig;
use serde::{Deserialize, Serialize};

use crate::error::PgShimError;

const ENV_DBNAME: &str = "PGDATABASE";
const ENV_HOST: &str = "PGHOST";
const ENV_PORT: &str = "PGPORT";
const ENV_USER: &str = "PGUSER";
const ENV_PASSWORD: &str = "PGPASSWORD";

/// Connection parameters for [`Db`](crate::connection::Db).
///
/// Every field is optional. Fields left unset can be filled once from the
/// standard `PG*` environment variables with [`PgOptions::resolve_env`];
/// whatever is still unset after that is left to the driver and server
/// defaults. Aside from the port needing to be numeric, nothing is
/// validated here; bad values surface when a connection is attempted.
///
/// ```rust
/// use pg_shim::PgOptions;
///
/// let opts = PgOptions::new()
///     .with_dbname("gis")
///     .with_host("db.example.com")
///     .with_user("reader");
/// assert_eq!(opts.dbname.as_deref(), Some("gis"));
/// assert_eq!(opts.port, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PgOptions {
    pub dbname: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl PgOptions {
    /// Options with every field unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_dbname(mut self, dbname: impl Into<String>) -> Self {
        self.dbname = Some(dbname.into());
        self
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Fill unset fields from `PGDATABASE`, `PGHOST`, `PGPORT`, `PGUSER`
    /// and `PGPASSWORD`. Explicitly set fields always win, and resolution
    /// happens exactly once; nothing re-reads the environment later.
    ///
    /// # Errors
    ///
    /// Returns `PgShimError::ConfigError` when `PGPORT` is consulted and
    /// does not parse as a port number.
    pub fn resolve_env(self) -> Result<Self, PgShimError> {
        self.resolve_from(|name| std::env::var(name).ok())
    }

    /// Options built entirely from the environment.
    ///
    /// # Errors
    ///
    /// Same as [`PgOptions::resolve_env`].
    pub fn from_env() -> Result<Self, PgShimError> {
        Self::new().resolve_env()
    }

    fn resolve_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, PgShimError> {
        if self.dbname.is_none() {
            self.dbname = lookup(ENV_DBNAME);
        }
        if self.host.is_none() {
            self.host = lookup(ENV_HOST);
        }
        if self.port.is_none()
            && let Some(raw) = lookup(ENV_PORT)
        {
            let port = raw.parse::<u16>().map_err(|e| {
                PgShimError::ConfigError(format!("{ENV_PORT} value {raw:?} is not a port: {e}"))
            })?;
            self.port = Some(port);
        }
        if self.user.is_none() {
            self.user = lookup(ENV_USER);
        }
        if self.password.is_none() {
            self.password = lookup(ENV_PASSWORD);
        }
        Ok(self)
    }
}

/// Driver config with only the fields that are actually set.
pub(crate) fn build_pg_config(opts: &PgOptions) -> PgConfig {
    let mut config = PgConfig::new();
    if let Some(dbname) = &opts.dbname {
        config.dbname(dbname);
    }
    if let Some(host) = &opts.host {
        config.host(host);
    }
    if let Some(port) = opts.port {
        config.port(port);
    }
    if let Some(user) = &opts.user {
        config.user(user);
    }
    if let Some(password) = &opts.password {
        config.password(password);
    }
    config
}
