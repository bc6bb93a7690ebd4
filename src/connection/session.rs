//! Call-scoped driver session
//!
//! A `Session` is opened, used and closed inside a single operation. The
//! socket is dialed by [`Transport`] so dial failures carry the crate's own
//! error phrasing; startup, authentication and statements are delegated to
//! `tokio-postgres` over that socket.

use super::transport::Transport;
use crate::client::ConnectionTarget;
use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_postgres::{Client, NoTls};
use tracing::Instrument;

/// How long `close` waits for the driver to flush Terminate
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Open driver session
pub struct Session {
    client: Client,
    driver: JoinHandle<()>,
    addr: String,
}

impl Session {
    /// Dial `target` and run startup + authentication with `config`.
    ///
    /// `timeout` bounds dialing and startup together.
    pub async fn open(
        target: &ConnectionTarget,
        config: &tokio_postgres::Config,
        timeout: Duration,
    ) -> Result<Self> {
        let deadline = Instant::now() + timeout;

        let transport = Transport::connect_tcp(target, timeout).await?;
        let addr = transport.addr().to_string();

        let startup = config.connect_raw(transport.into_stream(), NoTls);
        let (client, connection) = match tokio::time::timeout_at(deadline, startup).await {
            Ok(result) => result.map_err(|e| Error::from_driver(e, &addr))?,
            Err(_) => return Err(Error::Timeout { operation: "startup" }),
        };
        tracing::debug!(%addr, "session established");

        let driver = tokio::spawn(
            async move {
                if let Err(e) = connection.await {
                    tracing::warn!(error = %e, "connection driver failed");
                }
            }
            .instrument(tracing::debug_span!("driver", addr = %addr)),
        );

        Ok(Self {
            client,
            driver,
            addr,
        })
    }

    /// Driver client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Remote `host:port`
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Await a driver future until `deadline`, translating its error
    pub async fn run<T, F>(&self, operation: &'static str, deadline: Instant, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, tokio_postgres::Error>>,
    {
        match tokio::time::timeout_at(deadline, fut).await {
            Ok(result) => result.map_err(|e| Error::from_driver(e, &self.addr)),
            Err(_) => Err(Error::Timeout { operation }),
        }
    }

    /// Close the session and wait for the driver task to finish.
    ///
    /// Dropping the client makes the driver send Terminate and exit.
    pub async fn close(self) {
        drop(self.client);
        let mut driver = self.driver;
        let waited = tokio::time::timeout(CLOSE_GRACE, &mut driver).await;
        match waited {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(addr = %self.addr, error = %e, "driver task did not finish cleanly");
            }
            Err(_) => {
                driver.abort();
                tracing::debug!(addr = %self.addr, "driver task aborted after close grace period");
            }
        }
        tracing::debug!(addr = %self.addr, "session closed");
    }
}
