//! Shared ONNX Runtime plumbing for the local classifiers.
//!
//! One [`OnnxModel`] owns a session and its tokenizer. The session needs
//! exclusive access while running, so it sits behind a mutex; the tokenizer
//! is only read.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::{Session, SessionOutputs};
use tokenizers::{Encoding, Tokenizer, TruncationParams};
use tracing::info;

use crate::error::{MoodlensError, Result};
use crate::model::{Device, ModelFiles, ModelSource};

/// Default maximum number of tokens fed to a model.
pub const DEFAULT_MAX_LENGTH: usize = 512;

/// Options for loading one ONNX classifier.
#[derive(Debug, Clone)]
pub struct OnnxOptions {
    pub source: ModelSource,
    /// Inputs longer than this many tokens are truncated.
    pub max_length: usize,
    /// Feed `token_type_ids` (BERT-style graphs); RoBERTa and DistilBERT exports do not take it.
    pub token_type_ids: bool,
    pub device: Device,
    /// Override for the HuggingFace cache directory.
    pub cache_dir: Option<PathBuf>,
}

impl OnnxOptions {
    pub fn new(source: ModelSource) -> Self {
        Self {
            source,
            max_length: DEFAULT_MAX_LENGTH,
            token_type_ids: false,
            device: Device::default(),
            cache_dir: None,
        }
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn token_type_ids(mut self, enabled: bool) -> Self {
        self.token_type_ids = enabled;
        self
    }
}

/// A loaded ONNX session plus tokenizer.
pub struct OnnxModel {
    name: String,
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    token_type_ids: bool,
    files: ModelFiles,
}

impl OnnxModel {
    /// Resolve, download if needed, and load the model.
    pub fn load(options: &OnnxOptions) -> Result<Self> {
        let files = options.source.resolve(options.cache_dir.as_deref())?;
        let session = session_builder(&options.device)?
            .commit_from_file(&files.model)
            .map_err(|e| {
                MoodlensError::Configuration(format!("Failed to load ONNX model: {}", e))
            })?;
        Self::assemble(options, files, session)
    }

    /// Like [`load`](Self::load), but lets `prepare` rewrite the serialized
    /// graph before the session is built.
    pub fn load_with<T>(
        options: &OnnxOptions,
        prepare: impl FnOnce(&mut Vec<u8>) -> Result<T>,
    ) -> Result<(Self, T)> {
        let files = options.source.resolve(options.cache_dir.as_deref())?;
        let mut bytes = std::fs::read(&files.model).map_err(|e| {
            MoodlensError::Configuration(format!(
                "Failed to read ONNX model {}: {}",
                files.model.display(),
                e
            ))
        })?;
        let prepared = prepare(&mut bytes)?;

        let session = session_builder(&options.device)?
            .commit_from_memory(&bytes)
            .map_err(|e| {
                MoodlensError::Configuration(format!("Failed to load ONNX model: {}", e))
            })?;
        Ok((Self::assemble(options, files, session)?, prepared))
    }

    fn assemble(options: &OnnxOptions, files: ModelFiles, session: Session) -> Result<Self> {
        let tokenizer = load_tokenizer(&files.tokenizer, options.max_length)?;

        info!(
            model = options.source.name(),
            device = options.device.name(),
            max_length = options.max_length,
            "model loaded"
        );

        Ok(Self {
            name: options.source.name().to_string(),
            session: Mutex::new(session),
            tokenizer,
            token_type_ids: options.token_type_ids,
            files,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Files the model was loaded from.
    pub fn files(&self) -> &ModelFiles {
        &self.files
    }

    /// Tokenize with special tokens, truncated to the configured length.
    pub fn encode(&self, text: &str) -> Result<Encoding> {
        self.tokenizer
            .encode(text, true)
            .map_err(|e| MoodlensError::Tokenization(e.to_string()))
    }

    /// Run one forward pass and hand the outputs to `extract`.
    ///
    /// Outputs borrow the session, so extraction happens under the lock.
    pub fn run<T>(
        &self,
        encoding: &Encoding,
        extract: impl FnOnce(&SessionOutputs) -> Result<T>,
    ) -> Result<T> {
        use ort::value::TensorRef;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();

        let shape = [1_usize, input_ids.len()];

        let input_ids_tensor = TensorRef::from_array_view((shape, input_ids.as_slice()))
            .map_err(|e| {
                MoodlensError::Inference(format!("Failed to create input_ids tensor: {}", e))
            })?;
        let attention_mask_tensor = TensorRef::from_array_view((shape, attention_mask.as_slice()))
            .map_err(|e| {
                MoodlensError::Inference(format!("Failed to create attention_mask tensor: {}", e))
            })?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| MoodlensError::Inference(format!("Session lock poisoned: {}", e)))?;

        let outputs = if self.token_type_ids {
            let type_ids: Vec<i64> = encoding.get_type_ids().iter().map(|&t| t as i64).collect();
            let token_type_ids_tensor = TensorRef::from_array_view((shape, type_ids.as_slice()))
                .map_err(|e| {
                    MoodlensError::Inference(format!(
                        "Failed to create token_type_ids tensor: {}",
                        e
                    ))
                })?;
            session
                .run(ort::inputs![
                    "input_ids" => input_ids_tensor,
                    "attention_mask" => attention_mask_tensor,
                    "token_type_ids" => token_type_ids_tensor,
                ])
                .map_err(|e| MoodlensError::Inference(format!("ONNX inference failed: {}", e)))?
        } else {
            session
                .run(ort::inputs![
                    "input_ids" => input_ids_tensor,
                    "attention_mask" => attention_mask_tensor,
                ])
                .map_err(|e| MoodlensError::Inference(format!("ONNX inference failed: {}", e)))?
        };

        extract(&outputs)
    }
}

/// Read the first row of the `logits` output.
pub fn extract_logits(outputs: &SessionOutputs) -> Result<Vec<f32>> {
    let logits = outputs
        .get("logits")
        .ok_or_else(|| MoodlensError::DataError("No logits output found".to_string()))?;

    let (shape, data) = logits
        .try_extract_tensor::<f32>()
        .map_err(|e| MoodlensError::DataError(format!("Failed to extract logits: {}", e)))?;

    if shape.len() != 2 || shape[0] < 1 {
        return Err(MoodlensError::DataError(format!(
            "Expected logits of shape [batch, classes], got {:?}",
            &shape[..]
        )));
    }
    let num_labels = shape[1] as usize;
    Ok(data[..num_labels].to_vec())
}

/// Session builder with the appropriate execution provider.
fn session_builder(device: &Device) -> Result<SessionBuilder> {
    let builder = Session::builder()
        .map_err(|e| {
            MoodlensError::Configuration(format!("Failed to create session builder: {}", e))
        })?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| {
            MoodlensError::Configuration(format!("Failed to set optimization level: {}", e))
        })?;

    match device {
        Device::Cpu => Ok(builder),
        #[cfg(feature = "cuda")]
        Device::Cuda { device_id } => {
            use ort::execution_providers::CUDAExecutionProvider;
            builder
                .with_execution_providers([CUDAExecutionProvider::default()
                    .with_device_id(*device_id as i32)
                    .build()])
                .map_err(|e| {
                    MoodlensError::Configuration(format!("Failed to configure CUDA: {}", e))
                })
        }
    }
}

/// Load a tokenizer with truncation on and padding off.
fn load_tokenizer(path: &Path, max_length: usize) -> Result<Tokenizer> {
    let mut tokenizer = Tokenizer::from_file(path).map_err(|e| {
        MoodlensError::Configuration(format!("Failed to load tokenizer from {:?}: {}", path, e))
    })?;

    tokenizer
        .with_padding(None)
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(|e| {
            MoodlensError::Configuration(format!("Failed to configure truncation: {}", e))
        })?;

    Ok(tokenizer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_builder() {
        let options = OnnxOptions::new(ModelSource::huggingface("org/model"))
            .max_length(128)
            .token_type_ids(true)
            .cache_dir("/tmp/models");
        assert_eq!(options.max_length, 128);
        assert!(options.token_type_ids);
        assert_eq!(options.cache_dir, Some(PathBuf::from("/tmp/models")));
        assert_eq!(options.device, Device::Cpu);
    }

    #[test]
    fn options_defaults() {
        let options = OnnxOptions::new(ModelSource::huggingface("org/model"));
        assert_eq!(options.max_length, DEFAULT_MAX_LENGTH);
        assert!(!options.token_type_ids);
        assert_eq!(options.cache_dir, None);
    }

    #[test]
    fn load_missing_local_model_fails() {
        let options = OnnxOptions::new(ModelSource::local(
            "/nonexistent/model.onnx",
            "/nonexistent/tokenizer.json",
        ));
        let err = OnnxModel::load(&options).err().unwrap();
        assert!(matches!(err, MoodlensError::Configuration(_)));
    }

    /// Word-level tokenizer that ships with fixed padding to 16.
    const WORD_TOKENIZER: &str = r#"{
        "version": "1.0",
        "truncation": null,
        "padding": {
            "strategy": {"Fixed": 16},
            "direction": "Right",
            "pad_to_multiple_of": null,
            "pad_id": 0,
            "pad_type_id": 0,
            "pad_token": "[PAD]"
        },
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": {"type": "WhitespaceSplit"},
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": {"[PAD]": 0, "[UNK]": 1, "word": 2},
            "unk_token": "[UNK]"
        }
    }"#;

    fn word_tokenizer(max_length: usize) -> Tokenizer {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokenizer.json");
        std::fs::write(&path, WORD_TOKENIZER).unwrap();
        load_tokenizer(&path, max_length).unwrap()
    }

    #[test]
    fn tokenizer_truncates_to_max_length() {
        let tokenizer = word_tokenizer(8);
        assert_eq!(tokenizer.get_truncation().map(|t| t.max_length), Some(8));

        let long = vec!["word"; 100].join(" ");
        let encoding = tokenizer.encode(long.as_str(), true).unwrap();
        assert_eq!(encoding.get_ids().len(), 8);
        assert!(encoding.get_ids().iter().all(|&id| id == 2));
    }

    #[test]
    fn tokenizer_does_not_pad() {
        let tokenizer = word_tokenizer(8);
        assert!(tokenizer.get_padding().is_none());

        let encoding = tokenizer.encode("word word", true).unwrap();
        assert_eq!(encoding.get_ids(), &[2, 2]);
        assert!(encoding.get_attention_mask().iter().all(|&m| m == 1));
    }

    #[test]
    fn missing_tokenizer_is_configuration_error() {
        let err = load_tokenizer(Path::new("/nonexistent/tokenizer.json"), 8)
            .err()
            .unwrap();
        assert!(matches!(err, MoodlensError::Configuration(_)));
    }
}
