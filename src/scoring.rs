//! Post-processing of raw model outputs.
//!
//! Everything here is plain array arithmetic on `f32`, the precision the
//! models emit. Values are widened to `f64` only when they are written into
//! an [`AnalyzeResponse`](crate::AnalyzeResponse).

use crate::types::{AttentionMap, Highlight};

/// Maximum number of highlights returned per request.
pub const MAX_HIGHLIGHTS: usize = 10;

/// Added to the min-max range so constant inputs normalize to zero.
pub const NORMALIZE_EPSILON: f32 = 1e-9;

/// Structural tokens never reported as highlights.
pub const SPECIAL_TOKENS: [&str; 4] = ["[CLS]", "[SEP]", "</s>", "<s>"];

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|x| x / sum).collect()
}

/// Element-wise logistic sigmoid.
pub fn sigmoid(logits: &[f32]) -> Vec<f32> {
    logits.iter().map(|x| 1.0 / (1.0 + (-x).exp())).collect()
}

/// Index of the largest value; the first index wins ties.
///
/// Returns `None` for an empty slice.
pub fn argmax(values: &[f32]) -> Option<usize> {
    if values.is_empty() {
        return None;
    }
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    Some(best)
}

/// Round to `decimals` places, ties to even.
///
/// Probabilities widened from `f32` often sit exactly on a tie (`0.5625`),
/// where this picks the even neighbour (`0.562`).
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Attention each position pays to the first position, averaged over heads.
///
/// Equivalent to averaging the (heads × seq × seq) tensor over heads and
/// reading column 0 of the result row by row.
pub fn attention_to_first_token(attention: &AttentionMap) -> Vec<f32> {
    let heads = attention.heads();
    let seq = attention.seq_len();
    let weights = attention.weights();

    (0..seq)
        .map(|row| {
            let sum: f32 = (0..heads).map(|h| weights[(h * seq + row) * seq]).sum();
            sum / heads as f32
        })
        .collect()
}

/// Min-max normalize into [0, 1]: `(x - min) / (max - min + 1e-9)`.
pub fn min_max_normalize(values: &[f32]) -> Vec<f32> {
    let min = values.iter().cloned().fold(f32::INFINITY, f32::min);
    let max = values.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min + NORMALIZE_EPSILON;
    values.iter().map(|x| (x - min) / range).collect()
}

/// Whether a token is a classification, separator or sequence boundary marker.
pub fn is_special_token(token: &str) -> bool {
    SPECIAL_TOKENS.contains(&token)
}

/// Pair tokens with weights, drop special tokens and keep the heaviest `limit`.
///
/// The sort is stable, so equal weights keep their input order.
pub fn top_highlights(tokens: &[String], weights: &[f32], limit: usize) -> Vec<Highlight> {
    let mut highlights: Vec<Highlight> = tokens
        .iter()
        .zip(weights)
        .filter(|(token, _)| !is_special_token(token))
        .map(|(token, weight)| Highlight::new(token.clone(), f64::from(*weight)))
        .collect();

    highlights.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    highlights.truncate(limit);
    highlights
}

/// Full highlight recipe over one attention map.
pub fn rank_tokens(attention: &AttentionMap) -> Vec<Highlight> {
    let raw = attention_to_first_token(attention);
    let normalized = min_max_normalize(&raw);
    top_highlights(attention.tokens(), &normalized, MAX_HIGHLIGHTS)
}
