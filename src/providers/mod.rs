//! Classifier implementations.
//!
//! Both classifiers run locally on ONNX Runtime with HuggingFace
//! tokenizers. Models are fetched from the HuggingFace Hub on first use and
//! cached, or loaded from local paths.

pub mod emotion;
pub mod onnx;
pub mod sentiment;

pub use emotion::{DEFAULT_EMOTION_REPO, OnnxEmotionClassifier};
pub use onnx::{DEFAULT_MAX_LENGTH, OnnxModel, OnnxOptions};
pub use sentiment::{DEFAULT_SENTIMENT_REPO, OnnxSentimentClassifier};
