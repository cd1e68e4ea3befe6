//! Class label loading from a model's `config.json`.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{MoodlensError, Result};

#[derive(Debug, Deserialize)]
struct ModelConfigJson {
    #[serde(default)]
    id2label: HashMap<String, String>,
}

/// Read `id2label` from a `config.json` file.
pub fn load_labels(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        MoodlensError::Configuration(format!("Failed to read model config {path:?}: {e}"))
    })?;
    parse_id2label(&content)
}

/// Parse `id2label` into labels ordered by class index.
///
/// Indices must be exactly `0..n`.
pub fn parse_id2label(json: &str) -> Result<Vec<String>> {
    let config: ModelConfigJson = serde_json::from_str(json)?;
    if config.id2label.is_empty() {
        return Err(MoodlensError::Configuration(
            "Model config has no id2label mapping".to_string(),
        ));
    }

    let mut indexed = config
        .id2label
        .into_iter()
        .map(|(id, label)| {
            id.parse::<usize>().map(|i| (i, label)).map_err(|e| {
                MoodlensError::Configuration(format!("Invalid class index {id:?}: {e}"))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    indexed.sort_by_key(|(i, _)| *i);

    for (expected, (i, _)) in indexed.iter().enumerate() {
        if *i != expected {
            return Err(MoodlensError::Configuration(format!(
                "id2label is missing class index {expected}"
            )));
        }
    }

    Ok(indexed.into_iter().map(|(_, label)| label).collect())
}
