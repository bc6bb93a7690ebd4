//! Client configuration

use crate::auth::ErrorClassifier;
use std::time::Duration;

/// Deadline for dialing and detecting a service
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline for session startup and authentication
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline for executing a statement
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Database used when the caller names none
pub const DEFAULT_DATABASE: &str = "postgres";

/// Application name reported to the server
pub const DEFAULT_APPLICATION_NAME: &str = "pgprobe";

/// Client configuration
///
/// Immutable once built; every call reads it, none writes it.
/// Use `ClientConfig::builder()` to override the defaults.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Dial + handshake deadline for service detection (default: 10 seconds)
    pub probe_timeout: Duration,
    /// Dial + startup + authentication deadline (default: 10 seconds)
    pub connect_timeout: Duration,
    /// Statement deadline (default: 30 seconds)
    pub query_timeout: Duration,
    /// Database for `connect` (default: "postgres")
    pub default_database: String,
    /// Application name for Postgres logs (default: "pgprobe")
    pub application_name: String,
    /// Connectivity-vs-rejection classifier for authentication failures
    pub classifier: ErrorClassifier,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            default_database: DEFAULT_DATABASE.to_string(),
            application_name: DEFAULT_APPLICATION_NAME.to_string(),
            classifier: ErrorClassifier::default(),
        }
    }
}

impl ClientConfig {
    /// Create a builder starting from the defaults
    ///
    /// # Examples
    ///
    /// ```
    /// use pgprobe::ClientConfig;
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::builder()
    ///     .connect_timeout(Duration::from_secs(5))
    ///     .default_database("template1")
    ///     .build();
    /// assert_eq!(config.default_database, "template1");
    /// ```
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: ClientConfig::default(),
        }
    }
}

/// Builder for `ClientConfig`
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the detection deadline
    pub fn probe_timeout(mut self, duration: Duration) -> Self {
        self.config.probe_timeout = duration;
        self
    }

    /// Set the session startup deadline
    pub fn connect_timeout(mut self, duration: Duration) -> Self {
        self.config.connect_timeout = duration;
        self
    }

    /// Set the statement deadline
    pub fn query_timeout(mut self, duration: Duration) -> Self {
        self.config.query_timeout = duration;
        self
    }

    /// Set the database `connect` authenticates against
    pub fn default_database(mut self, database: impl Into<String>) -> Self {
        self.config.default_database = database.into();
        self
    }

    /// Set the application name reported to the server
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.config.application_name = name.into();
        self
    }

    /// Replace the authentication failure classifier
    pub fn classifier(mut self, classifier: ErrorClassifier) -> Self {
        self.config.classifier = classifier;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
