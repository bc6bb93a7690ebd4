//! Metrics instrumentation
//!
//! Thin wrappers over the `metrics` facade so call sites stay one line and
//! metric names live in one place. Nothing is recorded unless the embedding
//! application installs a recorder.

pub mod counters;
pub mod histograms;
pub mod labels;
