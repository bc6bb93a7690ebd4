//! Call-scoped connection inputs

use crate::{Error, Result};

/// Host and port of a Postgres server
///
/// Construction validates eagerly so that bad input fails before any
/// socket is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    host: String,
    port: u16,
}

impl ConnectionTarget {
    /// Validate `host` and `port`
    ///
    /// `port` is taken as a wide signed integer because scripting hosts
    /// hand over plain numbers; anything outside `1..=65535` is rejected.
    pub fn new(host: impl Into<String>, port: i64) -> Result<Self> {
        let host = host.into();
        if host.is_empty() {
            return Err(Error::InvalidTarget("host must not be empty".into()));
        }
        let port = u16::try_from(port)
            .ok()
            .filter(|p| *p > 0)
            .ok_or_else(|| Error::InvalidTarget(format!("port {} out of range", port)))?;
        Ok(Self { host, port })
    }

    /// Host name or address
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port`, with IPv6 literals bracketed
    pub fn addr(&self) -> String {
        join_host_port(&self.host, self.port)
    }
}

/// Join host and port the way URLs and dial errors expect
pub fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

/// Login credentials and target database
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Role name
    pub username: String,
    /// Password
    pub password: String,
    /// Database to connect to
    pub database: String,
}

impl Credentials {
    /// Create credentials for `database`
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            database: database.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}
