//! Local 3-way sentiment classification via ONNX Runtime.
//!
//! Besides logits, the sentiment model exposes last-layer attention for
//! highlight extraction. Graphs exported with attention outputs
//! (`attentions.0` … `attentions.N`, or one stacked `attentions` tensor) are
//! used as is. Plain classification exports get their last self-attention
//! softmax promoted to a graph output at load time. Graphs with neither
//! report attention as unsupported.

use tracing::{info, warn};

use super::onnx::{OnnxModel, OnnxOptions, extract_logits};
use crate::error::{MoodlensError, Result};
use crate::model::{ModelSource, graph};
use crate::traits::SentimentClassifier;
use crate::types::AttentionMap;

/// ONNX export of `cardiffnlp/twitter-roberta-base-sentiment-latest`.
pub const DEFAULT_SENTIMENT_REPO: &str = "Xenova/twitter-roberta-base-sentiment-latest";

/// Prefix shared by attention output names.
pub const ATTENTION_PREFIX: &str = "attentions";

/// Sentiment classifier backed by an ONNX session.
pub struct OnnxSentimentClassifier {
    model: OnnxModel,
    /// Output holding last-layer attention, resolved once at load.
    attention_output: Option<String>,
}

impl OnnxSentimentClassifier {
    /// Load the classifier.
    ///
    /// `attention_output` names the tensor holding last-layer attention. It
    /// may be a graph output or any intermediate tensor; when `None` one is
    /// picked from the graph.
    pub fn new(options: &OnnxOptions, attention_output: Option<String>) -> Result<Self> {
        let (model, attention_output) = OnnxModel::load_with(options, |bytes| {
            prepare_attention(bytes, attention_output.as_deref())
        })?;

        match &attention_output {
            Some(output) => info!(model = model.name(), %output, "attention output ready"),
            None => warn!(
                model = model.name(),
                "model graph has no attention outputs, highlights disabled"
            ),
        }

        Ok(Self {
            model,
            attention_output,
        })
    }

    /// Name of the output read for highlights, if any.
    pub fn attention_output(&self) -> Option<&str> {
        self.attention_output.as_deref()
    }

    /// Load the default model from HuggingFace Hub.
    pub fn with_defaults() -> Result<Self> {
        Self::new(&OnnxOptions::new(ModelSource::huggingface(DEFAULT_SENTIMENT_REPO)), None)
    }
}

impl SentimentClassifier for OnnxSentimentClassifier {
    fn name(&self) -> &str {
        self.model.name()
    }

    fn logits(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self.model.encode(text)?;
        self.model.run(&encoding, extract_logits)
    }

    fn attention(&self, text: &str) -> Result<AttentionMap> {
        let name = self
            .attention_output
            .as_deref()
            .ok_or(MoodlensError::Unsupported("attention"))?;

        let encoding = self.model.encode(text)?;
        let tokens = encoding.get_tokens().to_vec();
        let seq_len = tokens.len();

        let (heads, weights) = self.model.run(&encoding, |outputs| {
            let value = outputs
                .get(name)
                .ok_or_else(|| MoodlensError::DataError(format!("No {name} output found")))?;
            let (shape, data) = value.try_extract_tensor::<f32>().map_err(|e| {
                MoodlensError::DataError(format!("Failed to extract {name}: {}", e))
            })?;
            last_layer(&shape[..], data, seq_len)
        })?;

        AttentionMap::new(tokens, heads, weights)
    }
}

/// Decide which tensor carries last-layer attention, exposing it if needed.
///
/// Declared `attentions*` outputs (or an explicitly named output) are used
/// as they are. Otherwise the named tensor, or the last self-attention
/// softmax, is added to the graph outputs. Returns `None` when the graph has
/// no attention at all; an explicit name that matches nothing is an error.
pub fn prepare_attention(model: &mut Vec<u8>, explicit: Option<&str>) -> Result<Option<String>> {
    let info = graph::inspect(model)?;
    let names: Vec<&str> = info.outputs.iter().map(String::as_str).collect();
    if let Some(name) = select_attention_output(&names, explicit) {
        return Ok(Some(name));
    }

    let hidden = match explicit {
        Some(name) if info.has_tensor(name) => Some(name.to_string()),
        Some(name) => {
            return Err(MoodlensError::Configuration(format!(
                "Attention output {name} not found in model graph"
            )));
        }
        None => info.attention_probs,
    };

    if let Some(name) = &hidden {
        graph::expose_output(model, name);
    }
    Ok(hidden)
}

/// Pick the output holding the last layer's attention.
///
/// An explicit name wins if present. Otherwise the `attentions*` output with
/// the highest layer suffix is chosen (`attentions.11` over `attentions.2`).
pub fn select_attention_output(names: &[&str], explicit: Option<&str>) -> Option<String> {
    if let Some(explicit) = explicit {
        return names
            .iter()
            .find(|n| **n == explicit)
            .map(|n| n.to_string());
    }

    names
        .iter()
        .filter_map(|name| {
            let suffix = name.strip_prefix(ATTENTION_PREFIX)?;
            let layer = suffix.trim_start_matches(['.', '_']);
            if layer.is_empty() {
                Some((0, *name))
            } else {
                layer.parse::<usize>().ok().map(|l| (l, *name))
            }
        })
        .max_by_key(|(layer, _)| *layer)
        .map(|(_, name)| name.to_string())
}

/// Slice the (heads × seq × seq) matrix of the last layer, first batch item.
///
/// Accepts per-layer tensors `[batch, heads, seq, seq]` and stacked tensors
/// `[layers, batch, heads, seq, seq]`.
pub fn last_layer(shape: &[i64], data: &[f32], seq_len: usize) -> Result<(usize, Vec<f32>)> {
    let dims: Vec<usize> = shape.iter().map(|&d| d.max(0) as usize).collect();
    let (layers, batch, heads, rows, cols) = match dims.as_slice() {
        [b, h, r, c] => (1, *b, *h, *r, *c),
        [l, b, h, r, c] => (*l, *b, *h, *r, *c),
        _ => {
            return Err(MoodlensError::DataError(format!(
                "Unexpected attention shape {shape:?}"
            )));
        }
    };

    if layers == 0 || batch == 0 || rows != seq_len || cols != seq_len {
        return Err(MoodlensError::DataError(format!(
            "Attention shape {shape:?} does not match {seq_len} tokens"
        )));
    }

    let matrix = heads * rows * cols;
    let offset = (layers - 1) * batch * matrix;
    let slice = data.get(offset..offset + matrix).ok_or_else(|| {
        MoodlensError::DataError(format!(
            "Attention tensor has {} values, shape {shape:?} needs more",
            data.len()
        ))
    })?;

    Ok((heads, slice.to_vec()))
}
