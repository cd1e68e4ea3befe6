//! Telemetry metric name constants.
//!
//! Centralised metric names for moodlens operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `moodlens_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `status` — outcome: "ok" or "error"
//! - `label` — winning sentiment class, or "none" on error

/// Total analyze calls.
///
/// Labels: `status` ("ok" | "error"), `label`.
pub const REQUESTS_TOTAL: &str = "moodlens_requests_total";

/// Analyze duration in seconds, including all forward passes.
pub const REQUEST_DURATION_SECONDS: &str = "moodlens_request_duration_seconds";

/// Requests answered with the fixed neutral response without running a model.
pub const EMPTY_INPUT_TOTAL: &str = "moodlens_empty_input_total";

/// Highlight extractions that failed and fell back to an empty list.
pub const HIGHLIGHTS_UNAVAILABLE_TOTAL: &str = "moodlens_highlights_unavailable_total";
