//! Label values

/// Probe found Postgres
pub const PROBE_PRESENT: &str = "present";
/// Probe found something else, or nothing
pub const PROBE_ABSENT: &str = "absent";
/// Probe could not complete
pub const PROBE_ERROR: &str = "error";

/// Credentials accepted
pub const AUTH_ACCEPTED: &str = "accepted";
/// Credentials rejected (or any non-connectivity failure)
pub const AUTH_REJECTED: &str = "rejected";
/// Connectivity failure, credentials never judged
pub const AUTH_CONNECTIVITY: &str = "connectivity";

/// Query completed
pub const QUERY_SUCCESS: &str = "success";
/// Query failed
pub const QUERY_ERROR: &str = "error";
