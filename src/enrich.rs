//! Text-enrichment results.
//!
//! An external extraction service reads free-text criteria and returns
//! `{"skills": [...], "languages": [...]}`. The result is staged into the
//! source document before mapping, where the profile's list mappings pick
//! it up as alternate skill and language lists. No enrichment means no
//! staging; it is never an error.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::path;

/// Where staged criteria land in an opportunity payload.
pub const CRITERIA_PATH: &str = "data.attributes.criteria";
pub const CRITERIA_LANGUAGES_PATH: &str = "data.attributes.criteriaLanguages";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
}

impl Enrichment {
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty() && self.languages.is_empty()
    }

    /// Read an enrichment result from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read enrichment file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse enrichment file: {}", path.display()))
    }
}

/// Stage an enrichment into the opportunity criteria slots. `None` is a no-op.
pub fn stage(source: &mut Value, enrichment: Option<&Enrichment>) {
    if let Some(enrichment) = enrichment {
        stage_at(source, enrichment, CRITERIA_PATH, CRITERIA_LANGUAGES_PATH);
    }
}

/// Write non-empty enrichment lists at the given source paths.
///
/// Non-object sources are left untouched.
pub fn stage_at(source: &mut Value, enrichment: &Enrichment, skills_path: &str, languages_path: &str) {
    let Value::Object(root) = source else {
        return;
    };
    if !enrichment.skills.is_empty() {
        path::set(root, skills_path, Value::from(enrichment.skills.clone()));
    }
    if !enrichment.languages.is_empty() {
        path::set(root, languages_path, Value::from(enrichment.languages.clone()));
    }
}
