//! Local multi-label emotion classification via ONNX Runtime.

use tracing::info;

use super::onnx::{OnnxModel, OnnxOptions, extract_logits};
use crate::error::{MoodlensError, Result};
use crate::model::{ModelSource, load_labels};
use crate::traits::EmotionClassifier;

/// ONNX export of `joeddav/distilbert-base-uncased-go-emotions-student`.
pub const DEFAULT_EMOTION_REPO: &str = "Xenova/distilbert-base-uncased-go-emotions-student";

/// Emotion classifier backed by an ONNX session.
pub struct OnnxEmotionClassifier {
    model: OnnxModel,
    labels: Vec<String>,
}

impl OnnxEmotionClassifier {
    /// Load the classifier.
    ///
    /// Labels come from `labels` when given, otherwise from the model's
    /// `config.json` `id2label`.
    pub fn new(options: &OnnxOptions, labels: Option<Vec<String>>) -> Result<Self> {
        let model = OnnxModel::load(options)?;

        let labels = match labels {
            Some(labels) => labels,
            None => {
                let config = model.files().config.as_deref().ok_or_else(|| {
                    MoodlensError::Configuration(format!(
                        "No config.json for {} and no labels configured",
                        model.name()
                    ))
                })?;
                load_labels(config)?
            }
        };

        if labels.is_empty() {
            return Err(MoodlensError::Configuration(format!(
                "Emotion model {} has no labels",
                model.name()
            )));
        }

        info!(model = model.name(), classes = labels.len(), "emotion labels loaded");
        Ok(Self { model, labels })
    }

    /// Load the default model from HuggingFace Hub.
    pub fn with_defaults() -> Result<Self> {
        Self::new(&OnnxOptions::new(ModelSource::huggingface(DEFAULT_EMOTION_REPO)), None)
    }
}

impl EmotionClassifier for OnnxEmotionClassifier {
    fn name(&self) -> &str {
        self.model.name()
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn logits(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self.model.encode(text)?;
        self.model.run(&encoding, extract_logits)
    }
}
