//! HTTP server mode.
//!
//! This module provides:
//! - Configuration types and loading (`config`)
//! - The axum service exposing `POST /analyze` (`service`)
//! - [`load_analyzer`], which builds both ONNX classifiers from config

pub mod config;
pub mod service;

use std::sync::Arc;

use tracing::info;

use crate::providers::{OnnxEmotionClassifier, OnnxSentimentClassifier};
use crate::{Analyzer, Result};

pub use config::{Config, ModelsConfig};
pub use service::{ApiError, router, serve};

/// Load both classifiers described by `config`.
///
/// Blocks while models download and sessions are built; call it once at
/// startup, before accepting requests.
pub fn load_analyzer(config: &ModelsConfig) -> Result<Analyzer> {
    let sentiment = OnnxSentimentClassifier::new(
        &config.sentiment_options()?,
        config.sentiment.attention_output.clone(),
    )?;
    let emotion =
        OnnxEmotionClassifier::new(&config.emotion_options()?, config.emotion.labels.clone())?;

    let analyzer = Analyzer::new(Arc::new(sentiment), Arc::new(emotion));
    info!(
        sentiment = analyzer.sentiment_model(),
        emotion = analyzer.emotion_model(),
        "analyzer ready"
    );
    Ok(analyzer)
}
