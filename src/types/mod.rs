//! Public types for the Moodlens API.

mod analysis;
mod attention;
mod highlight;
mod sentiment;

pub use analysis::{AnalyzeRequest, AnalyzeResponse};
pub use attention::AttentionMap;
pub use highlight::{Highlight, Highlights};
pub use sentiment::{SentimentLabel, SentimentResult, SentimentScores};
