//! Histogram metrics (durations in milliseconds)

/// Time spent dialing and detecting
pub fn probe_duration(duration_ms: u64) {
    ::metrics::histogram!("pgprobe_probe_duration_ms").record(duration_ms as f64);
}

/// Time spent opening a session and validating credentials
pub fn auth_duration(outcome: &'static str, duration_ms: u64) {
    ::metrics::histogram!("pgprobe_auth_duration_ms", "outcome" => outcome)
        .record(duration_ms as f64);
}

/// Time from dial to serialized result
pub fn query_duration(status: &'static str, duration_ms: u64) {
    ::metrics::histogram!("pgprobe_query_duration_ms", "status" => status)
        .record(duration_ms as f64);
}
