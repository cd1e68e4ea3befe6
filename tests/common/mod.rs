//! Stub classifiers shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use moodlens::{
    Analyzer, AttentionMap, EmotionClassifier, MoodlensError, Result, SentimentClassifier,
};

/// Whitespace-split tokens wrapped in RoBERTa-style markers.
pub fn roberta_tokens(text: &str) -> Vec<String> {
    let mut tokens = vec!["<s>".to_string()];
    for (i, word) in text.split_whitespace().enumerate() {
        if i == 0 {
            tokens.push(word.to_string());
        } else {
            tokens.push(format!("Ġ{word}"));
        }
    }
    tokens.push("</s>".to_string());
    tokens
}

/// Sentiment stub with fixed logits.
///
/// Attention gives each token a column-0 weight taken from `importance`
/// (cycled), identical across `heads` heads.
pub struct StubSentiment {
    pub logits: Vec<f32>,
    pub importance: Vec<f32>,
    pub heads: usize,
    pub fail_attention: bool,
    pub fail_logits: bool,
    pub calls: AtomicUsize,
}

impl StubSentiment {
    pub fn new(logits: Vec<f32>) -> Self {
        Self {
            logits,
            importance: vec![0.9, 0.1, 0.8, 0.3, 0.2],
            heads: 2,
            fail_attention: false,
            fail_logits: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn importance(mut self, importance: Vec<f32>) -> Self {
        self.importance = importance;
        self
    }

    pub fn failing_attention(mut self) -> Self {
        self.fail_attention = true;
        self
    }

    pub fn failing_logits(mut self) -> Self {
        self.fail_logits = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SentimentClassifier for StubSentiment {
    fn name(&self) -> &str {
        "stub-sentiment"
    }

    fn logits(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_logits {
            return Err(MoodlensError::Inference("stub forward pass failed".to_string()));
        }
        Ok(self.logits.clone())
    }

    fn attention(&self, text: &str) -> Result<AttentionMap> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_attention {
            return Err(MoodlensError::DataError("attention shape mismatch".to_string()));
        }

        let tokens = roberta_tokens(text);
        let seq = tokens.len();
        let mut weights = vec![0.0; self.heads * seq * seq];
        for h in 0..self.heads {
            for row in 0..seq {
                let w = self.importance[row % self.importance.len()];
                weights[(h * seq + row) * seq] = w;
                if seq > 1 {
                    weights[(h * seq + row) * seq + 1] = 1.0 - w;
                }
            }
        }
        AttentionMap::new(tokens, self.heads, weights)
    }
}

/// Sentiment stub whose model exposes no attention at all.
pub struct LogitsOnlySentiment(pub Vec<f32>);

impl SentimentClassifier for LogitsOnlySentiment {
    fn name(&self) -> &str {
        "logits-only"
    }

    fn logits(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(self.0.clone())
    }
}

/// Emotion stub with fixed labels and logits.
pub struct StubEmotion {
    pub labels: Vec<String>,
    pub logits: Vec<f32>,
    pub calls: AtomicUsize,
}

impl StubEmotion {
    pub fn new(pairs: &[(&str, f32)]) -> Self {
        Self {
            labels: pairs.iter().map(|(l, _)| l.to_string()).collect(),
            logits: pairs.iter().map(|(_, x)| *x).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    /// GoEmotions-like labels, leaning towards joy and admiration.
    pub fn joyful() -> Self {
        Self::new(&[
            ("Admiration", 2.5),
            ("Anger", -4.0),
            ("Joy", 3.0),
            ("Love", 1.5),
            ("Neutral", -2.0),
            ("Sadness", -5.0),
        ])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmotionClassifier for StubEmotion {
    fn name(&self) -> &str {
        "stub-emotion"
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn logits(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.logits.clone())
    }
}

/// Logits for a clearly positive input.
pub const POSITIVE_LOGITS: [f32; 3] = [-2.5, -0.5, 3.5];

/// Analyzer over a positive sentiment stub and the joyful emotion stub.
pub fn positive_analyzer() -> (Analyzer, Arc<StubSentiment>, Arc<StubEmotion>) {
    let sentiment = Arc::new(StubSentiment::new(POSITIVE_LOGITS.to_vec()));
    let emotion = Arc::new(StubEmotion::joyful());
    let analyzer = Analyzer::new(sentiment.clone(), emotion.clone());
    (analyzer, sentiment, emotion)
}
