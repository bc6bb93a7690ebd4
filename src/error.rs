//! Error types
//!
//! Transport failures are rendered with the same phrases the connectivity
//! classifier in [`crate::auth`] looks for (`connect: connection refused`,
//! `connection reset by peer`, `i/o timeout`, ...). Changing a `Display`
//! string here changes how authentication failures are classified.

use std::error::Error as StdError;
use std::io;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// pgprobe error
#[derive(Debug, Error)]
pub enum Error {
    /// Host empty or port outside 1..=65535. Raised before any I/O.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// Invalid configuration or connection string
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Host name could not be resolved
    #[error("dial tcp: lookup {host}: {}", describe_io(.source))]
    Resolve {
        /// Host that failed to resolve
        host: String,
        /// Underlying resolver error
        #[source]
        source: io::Error,
    },

    /// TCP connect failed
    #[error("dial tcp {addr}: {}", describe_io(.source))]
    Dial {
        /// `host:port` that was dialed
        addr: String,
        /// Underlying socket error
        #[source]
        source: io::Error,
    },

    /// I/O failure on an established connection
    #[error("tcp {addr}: {}", describe_io(.source))]
    Io {
        /// Remote `host:port`
        addr: String,
        /// Underlying socket error
        #[source]
        source: io::Error,
    },

    /// Operation exceeded its deadline
    #[error("{operation}: i/o timeout")]
    Timeout {
        /// Operation that timed out (`dial`, `probe`, `startup`, `query`)
        operation: &'static str,
    },

    /// Peer closed the connection
    #[error("connection closed")]
    ConnectionClosed,

    /// Error reported by the server
    #[error("{0}")]
    Server(ServerError),

    /// Any other driver failure
    #[error("driver error: {0}")]
    Driver(String),

    /// A cell could not be decoded with its column decoder
    #[error("decode error: column {column:?}: {reason}")]
    Decode {
        /// Column name
        column: String,
        /// What went wrong
        reason: String,
    },

    /// JSON serialization failure
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Blocking facade could not start its runtime
    #[error("runtime error: {0}")]
    Runtime(#[source] io::Error),
}

/// Fields of a server `ErrorResponse`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerError {
    /// Severity (`FATAL`, `ERROR`, ...)
    pub severity: String,
    /// SQLSTATE code
    pub code: String,
    /// Primary message
    pub message: String,
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} #{} {}", self.severity, self.code, self.message)
    }
}

impl Error {
    /// Translate a `tokio-postgres` error, keeping server fields and socket
    /// error kinds so the rendered message stays classifiable.
    pub fn from_driver(err: tokio_postgres::Error, addr: &str) -> Self {
        if let Some(db) = err.as_db_error() {
            return Error::Server(ServerError {
                severity: db.severity().to_string(),
                code: db.code().code().to_string(),
                message: db.message().to_string(),
            });
        }

        let mut source = err.source();
        while let Some(cause) = source {
            if let Some(io_err) = cause.downcast_ref::<io::Error>() {
                return Error::Io {
                    addr: addr.to_string(),
                    source: io::Error::new(io_err.kind(), io_err.to_string()),
                };
            }
            source = cause.source();
        }

        if err.is_closed() {
            return Error::ConnectionClosed;
        }

        Error::Driver(err.to_string())
    }

    /// Wrap a socket error on an established connection
    pub(crate) fn io(addr: &str, source: io::Error) -> Self {
        Error::Io {
            addr: addr.to_string(),
            source,
        }
    }
}

/// Render a socket error the way connectivity failures are reported
/// throughout the crate.
fn describe_io(err: &io::Error) -> String {
    let phrase = match err.kind() {
        io::ErrorKind::ConnectionRefused => "connect: connection refused",
        io::ErrorKind::NetworkUnreachable => "connect: network unreachable",
        io::ErrorKind::HostUnreachable => "connect: no route to host",
        io::ErrorKind::ConnectionReset => "read: connection reset by peer",
        io::ErrorKind::ConnectionAborted => "connection aborted",
        io::ErrorKind::BrokenPipe => "write: broken pipe",
        io::ErrorKind::TimedOut => "i/o timeout",
        io::ErrorKind::UnexpectedEof => "unexpected EOF",
        _ => return err.to_string(),
    };
    phrase.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dial_refused_display() {
        let err = Error::Dial {
            addr: "127.0.0.1:5432".into(),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        };
        assert_eq!(
            err.to_string(),
            "dial tcp 127.0.0.1:5432: connect: connection refused"
        );
    }

    #[test]
    fn test_io_reset_display() {
        let err = Error::io("db:5432", io::Error::from(io::ErrorKind::ConnectionReset));
        assert_eq!(err.to_string(), "tcp db:5432: read: connection reset by peer");
    }

    #[test]
    fn test_timeout_display() {
        let err = Error::Timeout { operation: "dial" };
        assert_eq!(err.to_string(), "dial: i/o timeout");
    }

    #[test]
    fn test_unmapped_kind_uses_source_message() {
        let err = Error::Resolve {
            host: "nope.invalid".into(),
            source: io::Error::new(io::ErrorKind::Other, "no such host"),
        };
        assert_eq!(err.to_string(), "dial tcp: lookup nope.invalid: no such host");
    }

    #[test]
    fn test_server_error_display() {
        let err = Error::Server(ServerError {
            severity: "FATAL".into(),
            code: "28000".into(),
            message: "no pg_hba.conf entry for host \"10.0.0.1\"".into(),
        });
        assert_eq!(
            err.to_string(),
            "FATAL #28000 no pg_hba.conf entry for host \"10.0.0.1\""
        );
    }
}
