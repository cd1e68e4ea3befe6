//! Request and response bodies for text analysis.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Highlight, SentimentLabel};

/// Text to analyze.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

impl AnalyzeRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Result of analyzing one piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// `(P(positive) - P(negative)) * 10`, rounded to 2 decimals.
    pub score: f64,
    pub label: SentimentLabel,
    /// Lower-cased emotion name to independent sigmoid probability.
    pub emotions: BTreeMap<String, f64>,
    /// At most 10 tokens, heaviest first.
    pub highlights: Vec<Highlight>,
    /// Probability of `label`, rounded to 3 decimals.
    pub confidence: f64,
}

impl AnalyzeResponse {
    /// Fixed response for empty or whitespace-only input.
    pub fn neutral() -> Self {
        Self {
            score: 0.0,
            label: SentimentLabel::Neutral,
            emotions: BTreeMap::from([("neutral".to_string(), 1.0)]),
            highlights: Vec::new(),
            confidence: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_response_shape() {
        let json = serde_json::to_value(AnalyzeResponse::neutral()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "score": 0.0,
                "label": "neutral",
                "emotions": {"neutral": 1.0},
                "highlights": [],
                "confidence": 1.0,
            })
        );
    }

    #[test]
    fn request_parses() {
        let req: AnalyzeRequest = serde_json::from_str(r#"{"text": "I love this!"}"#).unwrap();
        assert_eq!(req, AnalyzeRequest::new("I love this!"));
    }

    #[test]
    fn request_requires_text() {
        assert!(serde_json::from_str::<AnalyzeRequest>("{}").is_err());
    }
}
