//! Moodlens - sentiment, emotion and attention highlights for short text
//!
//! An [`Analyzer`] runs text through a 3-way sentiment classifier and a
//! multi-label emotion classifier, then turns the raw logits into a
//! composite score, a label, per-emotion probabilities and a short list of
//! tokens the sentiment model attended to.
//!
//! The classifiers are traits ([`SentimentClassifier`], [`EmotionClassifier`]);
//! the bundled implementations run ONNX exports of HuggingFace models locally.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use moodlens::Analyzer;
//! use moodlens::providers::{OnnxEmotionClassifier, OnnxSentimentClassifier};
//!
//! fn main() -> moodlens::Result<()> {
//!     let analyzer = Analyzer::new(
//!         Arc::new(OnnxSentimentClassifier::with_defaults()?),
//!         Arc::new(OnnxEmotionClassifier::with_defaults()?),
//!     );
//!
//!     let response = analyzer.analyze("I love this!")?;
//!     println!("{} ({})", response.label, response.score);
//!     Ok(())
//! }
//! ```
//!
//! # HTTP service (requires `server` feature)
//!
//! The `moodlensd` binary serves `POST /analyze` with body `{"text": "..."}`.

pub mod analyzer;
pub mod error;
pub mod model;
pub mod providers;
pub mod scoring;
#[cfg(feature = "server")]
pub mod server;
pub mod telemetry;
pub mod traits;
pub mod types;
mod version;

// Re-export main types at crate root
pub use analyzer::Analyzer;
pub use error::{MoodlensError, Result};
pub use model::{Device, ModelSource};
pub use traits::{EmotionClassifier, SentimentClassifier};
pub use version::{GIT_BRANCH, GIT_SHA, PKG_VERSION, git_dirty, version_string};

pub use types::{
    AnalyzeRequest, AnalyzeResponse, AttentionMap, Highlight, Highlights, SentimentLabel,
    SentimentResult, SentimentScores,
};
