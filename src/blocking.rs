//! Synchronous facade
//!
//! Each call builds a current-thread runtime, drives the async operation to
//! completion on it and tears it down again. Do not call these methods from
//! inside an async context; use [`crate::PostgresClient`] there.

use crate::client::{ClientConfig, PostgresClient as AsyncClient};
use crate::probe::PostgresService;
use crate::{Error, Result};
use std::future::Future;

/// Blocking counterpart of [`crate::PostgresClient`]
///
/// # Examples
///
/// ```no_run
/// use pgprobe::blocking::PostgresClient;
///
/// let client = PostgresClient::new();
/// let present = client.is_postgres("10.0.0.12", 5432)?;
/// # Ok::<(), pgprobe::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PostgresClient {
    inner: AsyncClient,
}

impl PostgresClient {
    /// Client with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Client with a custom configuration
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            inner: AsyncClient::with_config(config),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ClientConfig {
        self.inner.config()
    }

    /// See [`crate::PostgresClient::is_postgres`]
    pub fn is_postgres(&self, host: &str, port: i64) -> Result<bool> {
        block_on(self.inner.is_postgres(host, port))
    }

    /// See [`crate::PostgresClient::fingerprint`]
    pub fn fingerprint(&self, host: &str, port: i64) -> Result<Option<PostgresService>> {
        block_on(self.inner.fingerprint(host, port))
    }

    /// See [`crate::PostgresClient::connect`]
    pub fn connect(&self, host: &str, port: i64, username: &str, password: &str) -> Result<bool> {
        block_on(self.inner.connect(host, port, username, password))
    }

    /// See [`crate::PostgresClient::connect_with_database`]
    pub fn connect_with_database(
        &self,
        host: &str,
        port: i64,
        username: &str,
        password: &str,
        database: &str,
    ) -> Result<bool> {
        block_on(
            self.inner
                .connect_with_database(host, port, username, password, database),
        )
    }

    /// See [`crate::PostgresClient::execute_query`]
    pub fn execute_query(
        &self,
        host: &str,
        port: i64,
        username: &str,
        password: &str,
        database: &str,
        query: &str,
    ) -> Result<String> {
        block_on(
            self.inner
                .execute_query(host, port, username, password, database, query),
        )
    }

    /// See [`crate::PostgresClient::execute_query_url`]
    pub fn execute_query_url(&self, url: &str, query: &str) -> Result<String> {
        block_on(self.inner.execute_query_url(url, query))
    }
}

fn block_on<F, T>(fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(Error::Runtime)?;
    runtime.block_on(fut)
}
