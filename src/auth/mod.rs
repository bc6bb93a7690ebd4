//! Credential validation
//!
//! A login is checked by opening a session and running `select 1`. Any
//! failure along the way is handed to the [`ErrorClassifier`]: connectivity
//! failures surface as errors, everything else is a plain negative result.

mod classify;

pub use classify::{ErrorClassifier, FailureClass, CONNECTIVITY_MARKERS};

use crate::client::{ClientConfig, ConnectionTarget, Credentials};
use crate::connection::Session;
use crate::metrics::{counters, histograms, labels};
use crate::Result;
use std::time::Instant;
use tracing::Instrument;

/// Statement used to prove the session is usable
pub const VALIDATION_QUERY: &str = "select 1";

/// Check `credentials` against `target`.
///
/// Returns `Ok(true)` when the login works, `Ok(false)` when it is rejected
/// and `Err` when the failure looks like a connectivity problem.
pub async fn authenticate(
    target: &ConnectionTarget,
    credentials: &Credentials,
    config: &ClientConfig,
) -> Result<bool> {
    async {
        let start = Instant::now();

        let (outcome, result) = match validate(target, credentials, config).await {
            Ok(()) => (labels::AUTH_ACCEPTED, Ok(true)),
            Err(err) => match config.classifier.classify(&err) {
                FailureClass::Connectivity => {
                    tracing::debug!(error = %err, "authentication failed: connectivity");
                    (labels::AUTH_CONNECTIVITY, Err(err))
                }
                FailureClass::Rejected => {
                    tracing::debug!(error = %err, "authentication failed: rejected");
                    (labels::AUTH_REJECTED, Ok(false))
                }
            },
        };

        counters::auth_completed(outcome);
        histograms::auth_duration(outcome, start.elapsed().as_millis() as u64);
        tracing::info!(outcome, "authentication finished");
        result
    }
    .instrument(tracing::info_span!(
        "authenticate",
        addr = %target.addr(),
        user = %credentials.username,
        database = %credentials.database
    ))
    .await
}

/// Open a session, run the validation statement, close the session.
async fn validate(
    target: &ConnectionTarget,
    credentials: &Credentials,
    config: &ClientConfig,
) -> Result<()> {
    let pg_config = driver_config(target, credentials, config);
    let session = Session::open(target, &pg_config, config.connect_timeout).await?;

    let deadline = tokio::time::Instant::now() + config.query_timeout;
    let result = session
        .run(
            "query",
            deadline,
            session.client().batch_execute(VALIDATION_QUERY),
        )
        .await;

    session.close().await;
    result
}

fn driver_config(
    target: &ConnectionTarget,
    credentials: &Credentials,
    config: &ClientConfig,
) -> tokio_postgres::Config {
    let mut pg_config = tokio_postgres::Config::new();
    pg_config
        .host(target.host())
        .port(target.port())
        .user(credentials.username.as_str())
        .password(credentials.password.as_str())
        .dbname(credentials.database.as_str())
        .application_name(config.application_name.as_str())
        .ssl_mode(tokio_postgres::config::SslMode::Disable);
    pg_config
}
