//! TCP transport with bounded dial

use crate::client::ConnectionTarget;
use crate::{Error, Result};
use std::time::Duration;
use tokio::net::TcpStream;

/// Plain TCP connection to a Postgres target
#[derive(Debug)]
pub struct Transport {
    stream: TcpStream,
    addr: String,
}

impl Transport {
    /// Resolve and connect to `target`, giving up after `timeout`.
    ///
    /// Every resolved address is tried in order; the last dial error is
    /// returned when none accepts.
    pub async fn connect_tcp(target: &ConnectionTarget, timeout: Duration) -> Result<Self> {
        let addr = target.addr();

        match tokio::time::timeout(timeout, Self::dial(target, &addr)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout { operation: "dial" }),
        }
    }

    async fn dial(target: &ConnectionTarget, addr: &str) -> Result<Self> {
        let addrs = tokio::net::lookup_host((target.host(), target.port()))
            .await
            .map_err(|source| Error::Resolve {
                host: target.host().to_string(),
                source,
            })?;

        let mut last_err = None;
        for socket_addr in addrs {
            match TcpStream::connect(socket_addr).await {
                Ok(stream) => {
                    tracing::debug!(%socket_addr, "tcp connection established");
                    let _ = stream.set_nodelay(true);
                    return Ok(Self {
                        stream,
                        addr: addr.to_string(),
                    });
                }
                Err(source) => {
                    tracing::debug!(%socket_addr, error = %source, "dial attempt failed");
                    last_err = Some(source);
                }
            }
        }

        Err(Error::Dial {
            addr: addr.to_string(),
            source: last_err.unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved")
            }),
        })
    }

    /// Remote `host:port` as dialed
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Hand the socket to the detector or the driver
    pub fn into_stream(self) -> TcpStream {
        self.stream
    }
}
