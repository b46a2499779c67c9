//! Canonical mission-request model.
//!
//! Repaired documents are deserialized into [`MissionRequest`] before they
//! are written, so every output file matches this schema. Keys are
//! camelCase except the `job_*` identity fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionRequest {
    pub company: Company,
    pub conditions: Conditions,
    #[serde(default)]
    pub contractor: Option<String>,
    pub deadline_at: String,
    pub is_active: bool,
    #[serde(rename = "job_desc", default)]
    pub job_desc: Option<String>,
    #[serde(rename = "job_id")]
    pub job_id: String,
    #[serde(rename = "job_url")]
    pub job_url: String,
    #[serde(rename = "job_reference", default, skip_serializing_if = "Option::is_none")]
    pub job_reference: Option<String>,
    #[serde(default)]
    pub languages: Vec<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    pub published_at: String,
    pub remote_option: String,
    #[serde(default)]
    pub role_title: Option<String>,
    pub seniority: String,
    pub service_provider: String,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl MissionRequest {
    /// Check a repaired document against the canonical schema.
    pub fn from_document(doc: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(doc)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    pub city: String,
    pub country: String,
    pub street: String,
    pub zipcode: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conditions {
    pub daily_rate: DailyRate,
    pub fixed_margin: f64,
    #[serde(default)]
    pub from_at: Option<String>,
    #[serde(default)]
    pub to_at: Option<String>,
    pub occupation: String,
    pub start_immediately: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRate {
    pub currency: String,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub seniority: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub language: String,
    pub level: String,
}
