//! Attention weights captured from the sentiment model.

use crate::error::{MoodlensError, Result};

/// Last-layer attention for one encoded input.
///
/// `weights` is the row-major (heads × seq × seq) tensor with the batch
/// dimension already removed; `tokens` holds one entry per sequence position.
#[derive(Debug, Clone, PartialEq)]
pub struct AttentionMap {
    tokens: Vec<String>,
    heads: usize,
    weights: Vec<f32>,
}

impl AttentionMap {
    /// Build an attention map, checking the tensor against the token count.
    pub fn new(tokens: Vec<String>, heads: usize, weights: Vec<f32>) -> Result<Self> {
        let seq_len = tokens.len();
        if heads == 0 || seq_len == 0 {
            return Err(MoodlensError::DataError(format!(
                "attention needs heads and tokens, got {heads} heads and {seq_len} tokens"
            )));
        }
        let expected = heads * seq_len * seq_len;
        if weights.len() != expected {
            return Err(MoodlensError::DataError(format!(
                "attention has {} values, expected {expected} ({heads} x {seq_len} x {seq_len})",
                weights.len()
            )));
        }
        Ok(Self {
            tokens,
            heads,
            weights,
        })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn heads(&self) -> usize {
        self.heads
    }

    pub fn seq_len(&self) -> usize {
        self.tokens.len()
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}
