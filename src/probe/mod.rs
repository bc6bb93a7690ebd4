//! Service detection
//!
//! Dials the target, sends a protocol-3.0 StartupMessage for the
//! `postgres` user and reads the first reply. No credentials are sent.

mod detect;

pub use detect::{detect, terminate, PostgresService};

use crate::client::ConnectionTarget;
use crate::connection::Transport;
use crate::metrics::{counters, histograms, labels};
use crate::Result;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Identify the service listening on `target`.
///
/// `timeout` bounds dialing and the handshake together.
pub async fn fingerprint(
    target: &ConnectionTarget,
    timeout: Duration,
) -> Result<Option<PostgresService>> {
    async {
        let start = Instant::now();
        let result = probe(target, timeout).await;

        let outcome = match &result {
            Ok(Some(_)) => labels::PROBE_PRESENT,
            Ok(None) => labels::PROBE_ABSENT,
            Err(e) => {
                tracing::debug!(error = %e, "probe failed");
                labels::PROBE_ERROR
            }
        };
        counters::probe_completed(outcome);
        histograms::probe_duration(start.elapsed().as_millis() as u64);
        tracing::info!(outcome, "probe finished");
        result
    }
    .instrument(tracing::info_span!("probe", addr = %target.addr()))
    .await
}

/// Whether `target` speaks the Postgres protocol
pub async fn is_postgres(target: &ConnectionTarget, timeout: Duration) -> Result<bool> {
    Ok(fingerprint(target, timeout).await?.is_some())
}

async fn probe(target: &ConnectionTarget, timeout: Duration) -> Result<Option<PostgresService>> {
    let deadline = tokio::time::Instant::now() + timeout;

    let transport = Transport::connect_tcp(target, timeout).await?;
    let addr = transport.addr().to_string();
    let mut stream = transport.into_stream();

    let result = detect(&mut stream, &addr, deadline).await;
    if result.is_ok() {
        terminate(&mut stream, deadline).await;
    }
    result
}
