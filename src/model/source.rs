//! Model source and download logic.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{MoodlensError, Result};

/// Default ONNX graph location inside a HuggingFace repository.
pub const DEFAULT_ONNX_FILE: &str = "onnx/model.onnx";

/// Source for a classifier model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Load from HuggingFace Hub repository.
    HuggingFace {
        /// Repository ID (e.g., "Xenova/twitter-roberta-base-sentiment-latest").
        repo_id: String,
        /// ONNX graph within the repo.
        onnx_file: String,
    },

    /// Load from local files.
    Local {
        model_path: PathBuf,
        tokenizer_path: PathBuf,
        /// `config.json` carrying `id2label`, if any.
        config_path: Option<PathBuf>,
    },
}

/// Local paths of everything a classifier needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub model: PathBuf,
    pub tokenizer: PathBuf,
    pub config: Option<PathBuf>,
}

impl ModelSource {
    /// Create a HuggingFace source using the default ONNX file.
    pub fn huggingface(repo_id: impl Into<String>) -> Self {
        Self::HuggingFace {
            repo_id: repo_id.into(),
            onnx_file: DEFAULT_ONNX_FILE.to_string(),
        }
    }

    /// Create a local source.
    pub fn local(model_path: impl Into<PathBuf>, tokenizer_path: impl Into<PathBuf>) -> Self {
        Self::Local {
            model_path: model_path.into(),
            tokenizer_path: tokenizer_path.into(),
            config_path: None,
        }
    }

    /// Short name for logging: the repo ID or the model file stem.
    pub fn name(&self) -> &str {
        match self {
            Self::HuggingFace { repo_id, .. } => repo_id,
            Self::Local { model_path, .. } => model_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("local"),
        }
    }

    /// Download or resolve the model files to local paths.
    ///
    /// HuggingFace files are cached under `cache_dir` when given, otherwise
    /// in the default hub cache. `config.json` is optional on the hub.
    pub fn resolve(&self, cache_dir: Option<&Path>) -> Result<ModelFiles> {
        match self {
            Self::HuggingFace { repo_id, onnx_file } => {
                let mut builder = hf_hub::api::sync::ApiBuilder::new().with_progress(false);
                if let Some(dir) = cache_dir {
                    builder = builder.with_cache_dir(dir.to_path_buf());
                }
                let api = builder.build().map_err(|e| {
                    MoodlensError::Configuration(format!("Failed to initialize HF API: {}", e))
                })?;

                let repo = api.model(repo_id.clone());
                info!(repo = %repo_id, file = %onnx_file, "resolving model");

                let model = repo.get(onnx_file).map_err(|e| {
                    MoodlensError::Configuration(format!(
                        "Failed to download {} from {}: {}",
                        onnx_file, repo_id, e
                    ))
                })?;
                let tokenizer = repo.get("tokenizer.json").map_err(|e| {
                    MoodlensError::Configuration(format!(
                        "Failed to download tokenizer from {}: {}",
                        repo_id, e
                    ))
                })?;
                let config = repo.get("config.json").ok();

                Ok(ModelFiles {
                    model,
                    tokenizer,
                    config,
                })
            }
            Self::Local {
                model_path,
                tokenizer_path,
                config_path,
            } => {
                for path in [Some(model_path), Some(tokenizer_path), config_path.as_ref()]
                    .into_iter()
                    .flatten()
                {
                    if !path.exists() {
                        return Err(MoodlensError::Configuration(format!(
                            "Local model path does not exist: {}",
                            path.display()
                        )));
                    }
                }
                Ok(ModelFiles {
                    model: model_path.clone(),
                    tokenizer: tokenizer_path.clone(),
                    config: config_path.clone(),
                })
            }
        }
    }
}
