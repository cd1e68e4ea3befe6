//! Sentiment classification types.
//!
//! The sentiment model is a 3-way classifier whose logits are always ordered
//! negative, neutral, positive.

use serde::{Deserialize, Serialize};

/// The winning sentiment class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    /// All labels in model logit order.
    pub const ALL: [SentimentLabel; 3] = [Self::Negative, Self::Neutral, Self::Positive];

    /// Label for a logit index, `None` past the third class.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Lower-case name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Softmax probabilities of the three sentiment classes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentScores {
    pub negative: f32,
    pub neutral: f32,
    pub positive: f32,
}

impl SentimentScores {
    /// Build from probabilities in logit order.
    pub fn from_probs(probs: [f32; 3]) -> Self {
        Self {
            negative: probs[0],
            neutral: probs[1],
            positive: probs[2],
        }
    }

    /// Probabilities in logit order.
    pub fn as_array(&self) -> [f32; 3] {
        [self.negative, self.neutral, self.positive]
    }

    /// Probability of the given class.
    pub fn get(&self, label: SentimentLabel) -> f32 {
        match label {
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Positive => self.positive,
        }
    }
}

/// Post-processed sentiment for one input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentResult {
    pub scores: SentimentScores,
    /// Winning class (first wins ties).
    pub label: SentimentLabel,
    /// `(P(positive) - P(negative)) * 10`, rounded to 2 decimals.
    pub score: f64,
    /// Probability of `label`, rounded to 3 decimals.
    pub confidence: f64,
}
