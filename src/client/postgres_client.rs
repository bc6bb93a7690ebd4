//! PostgresClient implementation

use super::config::ClientConfig;
use super::connection_string::{ConnectionString, SslMode};
use super::target::{ConnectionTarget, Credentials};
use crate::probe::PostgresService;
use crate::{auth, probe, query, Result};

/// Probe, credential check and query entry points for one configuration
///
/// Holds nothing but its `ClientConfig`; every call opens and closes its
/// own connection.
#[derive(Debug, Clone, Default)]
pub struct PostgresClient {
    config: ClientConfig,
}

impl PostgresClient {
    /// Client with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Client with a custom configuration
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example() -> pgprobe::Result<()> {
    /// use pgprobe::{ClientConfig, PostgresClient};
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::builder()
    ///     .probe_timeout(Duration::from_secs(3))
    ///     .build();
    /// let client = PostgresClient::with_config(config);
    ///
    /// if client.is_postgres("10.0.0.12", 5432).await? {
    ///     println!("postgres is listening");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_config(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Whether `host:port` speaks the Postgres protocol
    ///
    /// `Ok(false)` means something else (or nothing intelligible) answered.
    /// Dial failures and handshake timeouts are errors.
    pub async fn is_postgres(&self, host: &str, port: i64) -> Result<bool> {
        let target = ConnectionTarget::new(host, port)?;
        probe::is_postgres(&target, self.config.probe_timeout).await
    }

    /// Like `is_postgres`, but reports what the handshake revealed
    pub async fn fingerprint(&self, host: &str, port: i64) -> Result<Option<PostgresService>> {
        let target = ConnectionTarget::new(host, port)?;
        probe::fingerprint(&target, self.config.probe_timeout).await
    }

    /// Check a login against the default database
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example() -> pgprobe::Result<()> {
    /// use pgprobe::PostgresClient;
    ///
    /// let client = PostgresClient::new();
    /// match client.connect("10.0.0.12", 5432, "postgres", "postgres").await {
    ///     Ok(true) => println!("default credentials accepted"),
    ///     Ok(false) => println!("rejected"),
    ///     Err(e) => println!("could not reach the server: {}", e),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(
        &self,
        host: &str,
        port: i64,
        username: &str,
        password: &str,
    ) -> Result<bool> {
        let database = self.config.default_database.clone();
        self.connect_with_database(host, port, username, password, &database)
            .await
    }

    /// Check a login against `database`
    ///
    /// `Ok(false)` covers wrong credentials and every other failure that is
    /// not classified as a connectivity problem.
    pub async fn connect_with_database(
        &self,
        host: &str,
        port: i64,
        username: &str,
        password: &str,
        database: &str,
    ) -> Result<bool> {
        let target = ConnectionTarget::new(host, port)?;
        let credentials = Credentials::new(username, password, database);
        auth::authenticate(&target, &credentials, &self.config).await
    }

    /// Run `query` verbatim and return the rows as a JSON array of objects
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example() -> pgprobe::Result<()> {
    /// use pgprobe::PostgresClient;
    ///
    /// let client = PostgresClient::new();
    /// let json = client
    ///     .execute_query("10.0.0.12", 5432, "postgres", "postgres", "postgres",
    ///         "select usename, usesuper from pg_user")
    ///     .await?;
    /// println!("{}", json);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute_query(
        &self,
        host: &str,
        port: i64,
        username: &str,
        password: &str,
        database: &str,
        query: &str,
    ) -> Result<String> {
        let target = ConnectionTarget::new(host, port)?;
        let credentials = Credentials::new(username, password, database);
        query::execute_query(&target, &credentials, query, &self.config).await
    }

    /// Run `query` against a `postgres://` connection string
    ///
    /// Any `sslmode` in the URL is overridden: the query path always runs
    /// without encryption.
    pub async fn execute_query_url(&self, url: &str, query: &str) -> Result<String> {
        let mut conn = ConnectionString::parse(url)?;
        if conn.sslmode != SslMode::Disable {
            tracing::debug!(sslmode = %conn.sslmode, "sslmode overridden to disable");
            conn.sslmode = SslMode::Disable;
        }
        let (target, credentials) = conn.into_parts()?;
        query::execute_query(&target, &credentials, query, &self.config).await
    }
}
