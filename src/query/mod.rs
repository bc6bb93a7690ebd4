//! Query execution and result serialization
//!
//! The statement is described first to fix the decode plan from its column
//! types, then executed through the simple-query protocol so every cell
//! comes back as text.
//!
//! A string holding several statements cannot be described. It still runs
//! as a whole, and the first result set that produced rows is returned with
//! every column kept as text.

mod decode;

pub use decode::{ColumnDecoder, ColumnPlan, ColumnValue, DecodePlan, QueryResult, Record};

use crate::client::{ClientConfig, ConnectionString, ConnectionTarget, Credentials};
use crate::connection::Session;
use crate::metrics::{counters, histograms, labels};
use crate::{Error, Result};
use std::time::Instant;
use tokio_postgres::SimpleQueryMessage;
use tracing::Instrument;

/// SQLSTATE of a rejected Parse, including multi-statement strings
const SYNTAX_ERROR: &str = "42601";

/// Execute `query` verbatim and return its rows as a JSON array of objects.
///
/// The session is opened with transport encryption disabled.
pub async fn execute_query(
    target: &ConnectionTarget,
    credentials: &Credentials,
    query: &str,
    config: &ClientConfig,
) -> Result<String> {
    async {
        let start = Instant::now();
        let result = fetch(target, credentials, query, config)
            .await
            .and_then(|rows| rows.to_json());

        let status = match &result {
            Ok(_) => labels::QUERY_SUCCESS,
            Err(e) => {
                tracing::debug!(error = %e, "query failed");
                labels::QUERY_ERROR
            }
        };
        counters::query_completed(status);
        histograms::query_duration(status, start.elapsed().as_millis() as u64);
        result
    }
    .instrument(tracing::info_span!(
        "execute_query",
        addr = %target.addr(),
        user = %credentials.username,
        database = %credentials.database
    ))
    .await
}

/// Open a session for the query path and collect decoded rows
pub async fn fetch(
    target: &ConnectionTarget,
    credentials: &Credentials,
    query: &str,
    config: &ClientConfig,
) -> Result<QueryResult> {
    let mut pg_config = ConnectionString::for_query(target, credentials).to_driver_config()?;
    pg_config.application_name(config.application_name.as_str());
    // Time decoders expect ISO output
    pg_config.options("-c DateStyle=ISO");

    let session = Session::open(target, &pg_config, config.connect_timeout).await?;
    let result = run(&session, query, config).await;
    session.close().await;

    let rows = result?;
    counters::rows_decoded(rows.len() as u64);
    tracing::info!(rows = rows.len(), "query finished");
    Ok(rows)
}

async fn run(session: &Session, query: &str, config: &ClientConfig) -> Result<QueryResult> {
    let deadline = tokio::time::Instant::now() + config.query_timeout;
    let client = session.client();

    let described = session
        .run("describe", deadline, client.prepare(query))
        .await;
    let mut plan = match described {
        Ok(statement) => {
            let plan = DecodePlan::from_statement(&statement);
            tracing::debug!(columns = plan.columns().len(), "decode plan built");
            Some(plan)
        }
        Err(Error::Server(e)) if e.code == SYNTAX_ERROR => {
            tracing::debug!(error = %e, "statement not describable, decoding as text");
            None
        }
        Err(e) => return Err(e),
    };

    let messages = session
        .run("query", deadline, client.simple_query(query))
        .await?;

    let mut rows = QueryResult::default();
    for message in messages {
        match message {
            SimpleQueryMessage::Row(row) => {
                let plan = plan.get_or_insert_with(|| {
                    DecodePlan::untyped(row.columns().iter().map(|c| c.name()))
                });
                rows.push(plan.decode_row((0..row.len()).map(|i| row.get(i)))?);
            }
            SimpleQueryMessage::CommandComplete(_) if !rows.is_empty() => break,
            _ => {}
        }
    }
    Ok(rows)
}
