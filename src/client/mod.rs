//! Client API

mod config;
mod connection_string;
mod postgres_client;
mod target;

pub use config::{
    ClientConfig, ClientConfigBuilder, DEFAULT_APPLICATION_NAME, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_DATABASE, DEFAULT_PROBE_TIMEOUT, DEFAULT_QUERY_TIMEOUT,
};
pub use connection_string::{ConnectionString, SslMode};
pub use postgres_client::PostgresClient;
pub use target::{join_host_port, ConnectionTarget, Credentials};
