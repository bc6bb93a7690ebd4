//! Counter metrics

/// Probe finished with `outcome` (see `labels::PROBE_*`)
pub fn probe_completed(outcome: &'static str) {
    ::metrics::counter!("pgprobe_probes_total", "outcome" => outcome).increment(1);
}

/// Authentication attempt finished with `outcome` (see `labels::AUTH_*`)
pub fn auth_completed(outcome: &'static str) {
    ::metrics::counter!("pgprobe_auth_attempts_total", "outcome" => outcome).increment(1);
}

/// Query finished with `status` (see `labels::QUERY_*`)
pub fn query_completed(status: &'static str) {
    ::metrics::counter!("pgprobe_queries_total", "status" => status).increment(1);
}

/// Rows decoded into records
pub fn rows_decoded(count: u64) {
    ::metrics::counter!("pgprobe_rows_decoded_total").increment(count);
}
