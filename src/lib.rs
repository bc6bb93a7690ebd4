//! pgprobe: Postgres service probing, credential checks and ad-hoc queries
//!
//! Three call-scoped operations, each opening and closing its own
//! connection:
//!
//! * **Probe**: send a StartupMessage and decide whether the peer is a
//!   Postgres server ([`PostgresClient::is_postgres`]).
//! * **Authenticate**: log in, run `select 1` and report whether the
//!   credentials were accepted ([`PostgresClient::connect`]).
//! * **Query**: run a statement and return its rows as a JSON array of
//!   objects ([`PostgresClient::execute_query`]).
//!
//! ```no_run
//! # async fn example() -> pgprobe::Result<()> {
//! use pgprobe::PostgresClient;
//!
//! let client = PostgresClient::new();
//! if client.is_postgres("10.0.0.12", 5432).await? {
//!     let ok = client.connect("10.0.0.12", 5432, "postgres", "postgres").await?;
//!     println!("default login accepted: {}", ok);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! A synchronous facade lives in [`blocking`].

#![warn(missing_docs)]

pub mod auth;
pub mod blocking;
pub mod client;
pub mod connection;
pub mod error;
pub mod metrics;
pub mod probe;
pub mod protocol;
pub mod query;

pub use auth::{ErrorClassifier, FailureClass};
pub use client::{
    ClientConfig, ClientConfigBuilder, ConnectionString, ConnectionTarget, Credentials,
    PostgresClient, SslMode,
};
pub use error::{Error, Result, ServerError};
pub use probe::PostgresService;
pub use query::{ColumnValue, QueryResult};
