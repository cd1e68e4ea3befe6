//! Classifier traits consumed by the [`Analyzer`](crate::Analyzer).
//!
//! Both classifiers are black boxes: they tokenize, truncate and run a
//! forward pass, returning raw logits. All post-processing (softmax,
//! sigmoid, attention ranking) lives in the analyzer so that any backend
//! produces identical responses for identical logits.
//!
//! Implementations are loaded once and shared across requests, so they
//! must be `Send + Sync`. Calls are blocking; async callers should run them
//! on a blocking thread.

use crate::Result;
use crate::error::MoodlensError;
use crate::types::AttentionMap;

/// 3-way sentiment classifier (negative, neutral, positive).
pub trait SentimentClassifier: Send + Sync {
    /// Model name for logging.
    fn name(&self) -> &str;

    /// Raw class logits, ordered negative, neutral, positive.
    fn logits(&self, text: &str) -> Result<Vec<f32>>;

    /// Tokens and last-layer attention for `text`.
    ///
    /// Runs its own forward pass. Models that do not expose attention
    /// weights return [`MoodlensError::Unsupported`].
    fn attention(&self, _text: &str) -> Result<AttentionMap> {
        Err(MoodlensError::Unsupported("attention"))
    }
}

/// Multi-label emotion classifier.
pub trait EmotionClassifier: Send + Sync {
    /// Model name for logging.
    fn name(&self) -> &str;

    /// Class names, indexed like the logits.
    fn labels(&self) -> &[String];

    /// One raw logit per class in [`labels`](Self::labels).
    fn logits(&self, text: &str) -> Result<Vec<f32>>;
}
