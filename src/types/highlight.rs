//! Token highlight types.

use serde::{Deserialize, Serialize};

/// A token and its normalized attention weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub token: String,
    /// Normalized importance in [0, 1].
    pub weight: f64,
}

impl Highlight {
    pub fn new(token: impl Into<String>, weight: f64) -> Self {
        Self {
            token: token.into(),
            weight,
        }
    }
}

/// Outcome of best-effort highlight extraction.
///
/// Extraction never aborts a request: any failure becomes `Unavailable`,
/// which the response carries as an empty list.
#[derive(Debug, Clone, PartialEq)]
pub enum Highlights {
    Available(Vec<Highlight>),
    Unavailable,
}

impl Highlights {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Collapse into the list sent on the wire.
    pub fn into_vec(self) -> Vec<Highlight> {
        match self {
            Self::Available(highlights) => highlights,
            Self::Unavailable => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_collapses_to_empty() {
        assert!(Highlights::Unavailable.into_vec().is_empty());
        assert!(!Highlights::Unavailable.is_available());
    }

    #[test]
    fn available_keeps_order() {
        let highlights = Highlights::Available(vec![
            Highlight::new("Ġlove", 1.0),
            Highlight::new("Ġthis", 0.4),
        ]);
        assert!(highlights.is_available());
        let tokens: Vec<String> = highlights.into_vec().into_iter().map(|h| h.token).collect();
        assert_eq!(tokens, vec!["Ġlove", "Ġthis"]);
    }
}
