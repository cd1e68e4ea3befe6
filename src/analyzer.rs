//! The analyze recipe: sentiment, emotions and attention highlights.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument, warn};

use crate::error::{MoodlensError, Result};
use crate::scoring;
use crate::telemetry;
use crate::traits::{EmotionClassifier, SentimentClassifier};
use crate::types::{
    AnalyzeResponse, Highlights, SentimentLabel, SentimentResult, SentimentScores,
};

/// Runs text through a sentiment and an emotion classifier.
///
/// Both classifiers are loaded once and shared read-only; an `Analyzer` holds
/// no per-request state, so one instance can serve any number of concurrent
/// callers and repeated calls with the same input return the same response.
#[derive(Clone)]
pub struct Analyzer {
    sentiment: Arc<dyn SentimentClassifier>,
    emotion: Arc<dyn EmotionClassifier>,
}

impl Analyzer {
    pub fn new(
        sentiment: Arc<dyn SentimentClassifier>,
        emotion: Arc<dyn EmotionClassifier>,
    ) -> Self {
        Self { sentiment, emotion }
    }

    /// Analyze one piece of text.
    ///
    /// Empty or whitespace-only input returns [`AnalyzeResponse::neutral`]
    /// without touching either model. Only sentiment and emotion forward-pass
    /// failures are returned as errors; highlight extraction never fails the
    /// call.
    #[instrument(skip_all, fields(len = text.len()))]
    pub fn analyze(&self, text: &str) -> Result<AnalyzeResponse> {
        let start = Instant::now();
        let result = self.run(text);
        record_request(&result, start);
        result
    }

    fn run(&self, text: &str) -> Result<AnalyzeResponse> {
        let text = text.trim();
        if text.is_empty() {
            metrics::counter!(telemetry::EMPTY_INPUT_TOTAL).increment(1);
            return Ok(AnalyzeResponse::neutral());
        }

        let sentiment = self.sentiment(text)?;
        let emotions = self.emotions(text)?;
        let highlights = self.highlights(text);

        Ok(AnalyzeResponse {
            score: sentiment.score,
            label: sentiment.label,
            emotions,
            highlights: highlights.into_vec(),
            confidence: sentiment.confidence,
        })
    }

    /// Classify sentiment of already-trimmed, non-empty text.
    pub fn sentiment(&self, text: &str) -> Result<SentimentResult> {
        let logits = self.sentiment.logits(text)?;
        summarize_sentiment(&logits)
    }

    /// Emotion probabilities keyed by lower-cased label.
    pub fn emotions(&self, text: &str) -> Result<BTreeMap<String, f64>> {
        let logits = self.emotion.logits(text)?;
        emotion_map(self.emotion.labels(), &logits)
    }

    /// Best-effort token highlights; failures become [`Highlights::Unavailable`].
    ///
    /// A model without attention is reported once when it loads, so only
    /// real extraction failures are logged and counted here.
    pub fn highlights(&self, text: &str) -> Highlights {
        match self.sentiment.attention(text) {
            Ok(attention) => Highlights::Available(scoring::rank_tokens(&attention)),
            Err(MoodlensError::Unsupported(what)) => {
                debug!(model = self.sentiment.name(), what, "highlights unsupported");
                Highlights::Unavailable
            }
            Err(e) => {
                warn!(model = self.sentiment.name(), error = %e, "highlights unavailable");
                metrics::counter!(telemetry::HIGHLIGHTS_UNAVAILABLE_TOTAL).increment(1);
                Highlights::Unavailable
            }
        }
    }

    pub fn sentiment_model(&self) -> &str {
        self.sentiment.name()
    }

    pub fn emotion_model(&self) -> &str {
        self.emotion.name()
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("sentiment", &self.sentiment.name())
            .field("emotion", &self.emotion.name())
            .finish()
    }
}

/// Turn 3 sentiment logits into label, confidence and composite score.
pub fn summarize_sentiment(logits: &[f32]) -> Result<SentimentResult> {
    if logits.len() != 3 {
        return Err(MoodlensError::DataError(format!(
            "Expected 3 sentiment logits, got {}",
            logits.len()
        )));
    }

    let probs = scoring::softmax(logits);
    let scores = SentimentScores::from_probs([probs[0], probs[1], probs[2]]);
    let label = scoring::argmax(&probs)
        .and_then(SentimentLabel::from_index)
        .ok_or_else(|| MoodlensError::DataError("No winning sentiment class".to_string()))?;

    let net = (scores.positive - scores.negative) * 10.0;
    debug!(?scores, %label, "sentiment");

    Ok(SentimentResult {
        scores,
        label,
        score: scoring::round_to(f64::from(net), 2),
        confidence: scoring::round_to(f64::from(scores.get(label)), 3),
    })
}

/// Pair emotion labels with sigmoid probabilities.
pub fn emotion_map(labels: &[String], logits: &[f32]) -> Result<BTreeMap<String, f64>> {
    if labels.len() != logits.len() {
        return Err(MoodlensError::DataError(format!(
            "Emotion model returned {} logits for {} labels",
            logits.len(),
            labels.len()
        )));
    }

    Ok(labels
        .iter()
        .zip(scoring::sigmoid(logits))
        .map(|(label, p)| (label.to_lowercase(), f64::from(p)))
        .collect())
}

fn record_request(result: &Result<AnalyzeResponse>, start: Instant) {
    let (status, label) = match result {
        Ok(response) => ("ok", response.label.as_str()),
        Err(_) => ("error", "none"),
    };
    metrics::counter!(telemetry::REQUESTS_TOTAL,
        "status" => status,
        "label" => label,
    )
    .increment(1);
    metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS).record(start.elapsed().as_secs_f64());
}
