//! Configuration loading for moodlensd.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.moodlens/config.toml` (user)
//! 3. `/etc/moodlens/config.toml` (system)
//!
//! When no file exists the built-in defaults are used: listen on
//! `127.0.0.1:8000` and pull both default models from HuggingFace Hub.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::source::DEFAULT_ONNX_FILE;
use crate::model::{Device, ModelSource};
use crate::providers::{
    DEFAULT_EMOTION_REPO, DEFAULT_MAX_LENGTH, DEFAULT_SENTIMENT_REPO, OnnxOptions,
};
use crate::{MoodlensError, Result};

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub models: ModelsConfig,
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8000).
    #[serde(default = "default_address")]
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:8000".to_string()
}

/// Shared settings plus one section per classifier.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// Device to use: "cpu" or "cuda" (default: "cpu").
    #[serde(default = "default_device")]
    pub device: String,
    /// Directory for model downloads (default: the HuggingFace cache).
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub sentiment: SentimentModelConfig,
    #[serde(default)]
    pub emotion: EmotionModelConfig,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            cache_dir: None,
            sentiment: SentimentModelConfig::default(),
            emotion: EmotionModelConfig::default(),
        }
    }
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_onnx_file() -> String {
    DEFAULT_ONNX_FILE.to_string()
}

fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}

/// Sentiment model configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SentimentModelConfig {
    #[serde(default = "default_sentiment_repo")]
    pub repo: String,
    #[serde(default = "default_onnx_file")]
    pub onnx_file: String,
    /// Local ONNX file; requires `tokenizer_path` and replaces `repo`.
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    #[serde(default)]
    pub tokenizer_path: Option<PathBuf>,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default)]
    pub token_type_ids: bool,
    /// Tensor holding last-layer attention, exposed as an output if needed;
    /// picked automatically if unset.
    #[serde(default)]
    pub attention_output: Option<String>,
}

impl Default for SentimentModelConfig {
    fn default() -> Self {
        Self {
            repo: default_sentiment_repo(),
            onnx_file: default_onnx_file(),
            model_path: None,
            tokenizer_path: None,
            max_length: default_max_length(),
            token_type_ids: false,
            attention_output: None,
        }
    }
}

fn default_sentiment_repo() -> String {
    DEFAULT_SENTIMENT_REPO.to_string()
}

/// Emotion model configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmotionModelConfig {
    #[serde(default = "default_emotion_repo")]
    pub repo: String,
    #[serde(default = "default_onnx_file")]
    pub onnx_file: String,
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    #[serde(default)]
    pub tokenizer_path: Option<PathBuf>,
    /// Local `config.json` with `id2label`.
    #[serde(default)]
    pub config_path: Option<PathBuf>,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    #[serde(default)]
    pub token_type_ids: bool,
    /// Class names in logit order; overrides `id2label`.
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

impl Default for EmotionModelConfig {
    fn default() -> Self {
        Self {
            repo: default_emotion_repo(),
            onnx_file: default_onnx_file(),
            model_path: None,
            tokenizer_path: None,
            config_path: None,
            max_length: default_max_length(),
            token_type_ids: false,
            labels: None,
        }
    }
}

fn default_emotion_repo() -> String {
    DEFAULT_EMOTION_REPO.to_string()
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided, must exist)
    /// 2. `~/.moodlens/config.toml`
    /// 3. `/etc/moodlens/config.toml`
    /// 4. Built-in defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse a config file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            MoodlensError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            MoodlensError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path, `None` when no file is present.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(MoodlensError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".moodlens").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/moodlens/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}

impl ModelsConfig {
    pub fn device(&self) -> Result<Device> {
        Device::parse(&self.device)
    }

    /// ONNX options for the sentiment model.
    pub fn sentiment_options(&self) -> Result<OnnxOptions> {
        let cfg = &self.sentiment;
        let source = model_source(
            &cfg.repo,
            &cfg.onnx_file,
            cfg.model_path.as_ref(),
            cfg.tokenizer_path.as_ref(),
            None,
        )?;
        self.options(source, cfg.max_length, cfg.token_type_ids)
    }

    /// ONNX options for the emotion model.
    pub fn emotion_options(&self) -> Result<OnnxOptions> {
        let cfg = &self.emotion;
        let source = model_source(
            &cfg.repo,
            &cfg.onnx_file,
            cfg.model_path.as_ref(),
            cfg.tokenizer_path.as_ref(),
            cfg.config_path.as_ref(),
        )?;
        self.options(source, cfg.max_length, cfg.token_type_ids)
    }

    fn options(
        &self,
        source: ModelSource,
        max_length: usize,
        token_type_ids: bool,
    ) -> Result<OnnxOptions> {
        if max_length == 0 {
            return Err(MoodlensError::Configuration(format!(
                "max_length must be positive for {}",
                source.name()
            )));
        }
        let mut options = OnnxOptions::new(source)
            .max_length(max_length)
            .token_type_ids(token_type_ids)
            .device(self.device()?);
        if let Some(ref dir) = self.cache_dir {
            options = options.cache_dir(dir);
        }
        Ok(options)
    }
}

/// Local paths win over the hub repo; both files are required together.
fn model_source(
    repo: &str,
    onnx_file: &str,
    model_path: Option<&PathBuf>,
    tokenizer_path: Option<&PathBuf>,
    config_path: Option<&PathBuf>,
) -> Result<ModelSource> {
    match (model_path, tokenizer_path) {
        (Some(model), Some(tokenizer)) => Ok(ModelSource::Local {
            model_path: model.clone(),
            tokenizer_path: tokenizer.clone(),
            config_path: config_path.cloned(),
        }),
        (None, None) => Ok(ModelSource::HuggingFace {
            repo_id: repo.to_string(),
            onnx_file: onnx_file.to_string(),
        }),
        _ => Err(MoodlensError::Configuration(
            "model_path and tokenizer_path must be set together".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.server.address, "127.0.0.1:8000");
        assert_eq!(config.models.device, "cpu");
        assert_eq!(config.models.sentiment.repo, DEFAULT_SENTIMENT_REPO);
        assert_eq!(config.models.emotion.repo, DEFAULT_EMOTION_REPO);
        assert_eq!(config.models.sentiment.max_length, 512);
        assert_eq!(config.models.sentiment.onnx_file, "onnx/model.onnx");
    }

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [server]
            address = "0.0.0.0:8000"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.address, "0.0.0.0:8000");
        // Defaults preserved
        assert_eq!(config.models.emotion.max_length, 512);
        assert!(config.models.emotion.labels.is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [server]
            address = "127.0.0.1:9000"

            [models]
            device = "cpu"
            cache_dir = "/opt/models"

            [models.sentiment]
            repo = "org/sentiment"
            onnx_file = "onnx/model_quantized.onnx"
            max_length = 256
            attention_output = "attentions.11"

            [models.emotion]
            repo = "org/emotion"
            labels = ["joy", "sadness"]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.address, "127.0.0.1:9000");
        assert_eq!(config.models.cache_dir, Some(PathBuf::from("/opt/models")));
        assert_eq!(config.models.sentiment.max_length, 256);
        assert_eq!(
            config.models.sentiment.attention_output,
            Some("attentions.11".to_string())
        );
        assert_eq!(
            config.models.emotion.labels,
            Some(vec!["joy".to_string(), "sadness".to_string()])
        );

        let options = config.models.sentiment_options().unwrap();
        assert_eq!(
            options.source,
            ModelSource::HuggingFace {
                repo_id: "org/sentiment".to_string(),
                onnx_file: "onnx/model_quantized.onnx".to_string(),
            }
        );
        assert_eq!(options.max_length, 256);
        assert_eq!(options.cache_dir, Some(PathBuf::from("/opt/models")));
    }

    #[test]
    fn parse_local_model_paths() {
        let toml = r#"
            [models.emotion]
            model_path = "/models/emotion.onnx"
            tokenizer_path = "/models/tokenizer.json"
            config_path = "/models/config.json"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let options = config.models.emotion_options().unwrap();
        assert_eq!(
            options.source,
            ModelSource::Local {
                model_path: PathBuf::from("/models/emotion.onnx"),
                tokenizer_path: PathBuf::from("/models/tokenizer.json"),
                config_path: Some(PathBuf::from("/models/config.json")),
            }
        );
    }

    #[test]
    fn half_local_paths_are_rejected() {
        let toml = r#"
            [models.sentiment]
            model_path = "/models/sentiment.onnx"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.models.sentiment_options().unwrap_err();
        assert!(err.to_string().contains("must be set together"));
    }

    #[test]
    fn zero_max_length_is_rejected() {
        let mut models = ModelsConfig::default();
        models.emotion.max_length = 0;
        assert!(models.emotion_options().is_err());
    }

    #[test]
    fn unknown_device_is_rejected() {
        let models = ModelsConfig {
            device: "tpu".to_string(),
            ..Default::default()
        };
        assert!(models.sentiment_options().is_err());
    }

    #[test]
    fn config_not_found_returns_error() {
        let result = Config::load(Some(Path::new("/nonexistent/config.toml")));
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server]\naddress = \"127.0.0.1:8123\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.server.address, "127.0.0.1:8123");
    }

    #[test]
    fn invalid_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server\naddress = ").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
