//! Source profiles: one mapping table plus one repair routine per upstream.
//!
//! ```text
//! raw source JSON ──▶ map_document(table) ──▶ repair(mapped, original) ──▶ canonical document
//! ```
//!
//! Every upstream registers a [`SourceProfile`] in the [`ProfileRegistry`].
//! The CLI and the sync pipeline look profiles up by name and only ever
//! call [`SourceProfile::transform`].
//!
//! # Example
//!
//! ```rust
//! use mission_harvest::traits::ProfileRegistry;
//! use serde_json::json;
//!
//! let registry = ProfileRegistry::builtin();
//! let feed = registry.get("feed").unwrap();
//! let doc = feed.transform(&json!({ "id": "LDG-1" }));
//! assert_eq!(doc["job_id"], "LDG-1");
//! ```

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::enrich::Enrichment;
use crate::mapping::{map_document, MappingTable};
use crate::source_feed::FeedProfile;
use crate::source_fixture::FixtureProfile;
use crate::source_opportunity::OpportunityProfile;

/// How one upstream's documents become canonical mission requests.
pub trait SourceProfile: Send + Sync {
    /// Registry name used on the command line (e.g. `"opportunity"`).
    fn name(&self) -> &str;

    /// One-line description for `harvest sources`.
    fn description(&self) -> &str;

    /// The declarative mapping table for this upstream.
    fn table(&self) -> &MappingTable<'static>;

    /// Repair a mapped document. `original` is the untouched source
    /// document, for lookups that are not plain path traversals.
    ///
    /// Must not fail for any input; every field has a terminal fallback.
    fn repair(&self, mapped: Value, original: &Value, now: DateTime<Utc>) -> Value;

    /// Write text-enrichment results into the source document before
    /// mapping. Returns `false` when the profile has no enrichment slot and
    /// the source was left untouched.
    fn stage_enrichment(&self, _source: &mut Value, _enrichment: &Enrichment) -> bool {
        false
    }

    /// [`repair`](SourceProfile::repair) at the current time.
    fn apply_defaults(&self, mapped: Value, original: &Value) -> Value {
        self.repair(mapped, original, Utc::now())
    }

    /// Map then repair, with an explicit processing time.
    fn transform_at(&self, source: &Value, now: DateTime<Utc>) -> Value {
        let mapped = map_document(source, self.table());
        self.repair(mapped, source, now)
    }

    /// Map then repair one source document.
    fn transform(&self, source: &Value) -> Value {
        self.transform_at(source, Utc::now())
    }
}

/// Name-addressed collection of source profiles.
#[derive(Default)]
pub struct ProfileRegistry {
    profiles: Vec<Box<dyn SourceProfile>>,
}

impl ProfileRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in `opportunity`, `feed` and `fixture` profiles.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(OpportunityProfile));
        registry.register(Box::new(FeedProfile));
        registry.register(Box::new(FixtureProfile));
        registry
    }

    /// Add a profile. A profile with the same name replaces the earlier one.
    pub fn register(&mut self, profile: Box<dyn SourceProfile>) {
        self.profiles.retain(|p| p.name() != profile.name());
        self.profiles.push(profile);
    }

    pub fn get(&self, name: &str) -> Option<&dyn SourceProfile> {
        self.profiles
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    pub fn profiles(&self) -> &[Box<dyn SourceProfile>] {
        &self.profiles
    }

    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name()).collect()
    }
}
