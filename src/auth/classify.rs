//! Connectivity-vs-rejection classification of authentication failures
//!
//! The only signal available is the rendered error text, so this is a
//! substring match and it is brittle: a reworded driver or server message
//! moves a failure from one class to the other. The marker list is the
//! classifier's entire configuration; replace the classifier rather than
//! patching call sites once structured errors are preferable.

use serde::{Deserialize, Serialize};

/// Substrings that mark a failure as connectivity-related.
///
/// Matched case-sensitively, any one is enough.
pub const CONNECTIVITY_MARKERS: &[&str] = &[
    "connect: connection refused",
    "no pg_hba.conf entry for host",
    "network unreachable",
    "reset",
    "i/o timeout",
];

/// Outcome class of a failed authentication attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// Could not reach or was not allowed to talk to the server; the
    /// credentials were never judged
    Connectivity,
    /// Anything else, including wrong username or password
    Rejected,
}

/// Substring-based failure classifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorClassifier {
    markers: Vec<String>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(CONNECTIVITY_MARKERS.iter().copied())
    }
}

impl ErrorClassifier {
    /// Create a classifier with a custom marker list
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    /// Markers in match order
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// Classify a rendered error message
    pub fn classify_message(&self, message: &str) -> FailureClass {
        if self.markers.iter().any(|m| message.contains(m.as_str())) {
            FailureClass::Connectivity
        } else {
            FailureClass::Rejected
        }
    }

    /// Classify an error by its `Display` output
    pub fn classify(&self, err: &crate::Error) -> FailureClass {
        self.classify_message(&err.to_string())
    }
}
