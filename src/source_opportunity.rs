//! BoondManager opportunities (JSON:API envelope).
//!
//! Payloads look like `{"data": {"id", "attributes", "relationships"},
//! "included": [...]}`. The company name and the main manager live in
//! `included` and are joined through `data.relationships` (or top-level
//! `relationships` when `data` is not an object). Free-text
//! criteria can be replaced by an extracted skill/language list before
//! mapping; those lists are only used when the structured ones are empty.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::dates::parse_date;
use crate::defaults::{
    ensure_array, ensure_object, flag, into_object, normalize_records, optional_text,
    promote_staged, repair_company, repair_conditions, repair_dates, require_job_id,
    require_job_url, text_default, translate_code, DeadlinePolicy, LANGUAGE, NOT_SPECIFIED,
    REMOTE_NOT_SPECIFIED, SKILL,
};
use crate::enrich::{stage, Enrichment, CRITERIA_LANGUAGES_PATH, CRITERIA_PATH};
use crate::mapping::{FieldMapping, ListMapping, MappingTable};
use crate::traits::SourceProfile;
use crate::value::{as_text, is_blank, is_present};

pub const SOURCE_TAG: &str = "boond";
pub const PROVIDER_NAME: &str = "BoondManager";
pub const OPPORTUNITY_URL_BASE: &str = "https://boond.com/opportunities";

/// Seniority given to skills that only come from free-text criteria.
pub const CRITERIA_SENIORITY: &str = "Required";

const STAGED_SKILLS: &str = "skills_from_criteria";
const STAGED_LANGUAGES: &str = "languages_from_criteria";

/// `origin.typeOf` codes as configured in BoondManager.
pub const ORIGIN_TYPES: &[(i64, &str)] = &[
    (0, "Prospection"),
    (1, "Apporteur"),
    (2, "Collègue"),
    (3, "Réseau"),
    (4, "Appel d'offre"),
    (6, "Client"),
    (7, "Salon"),
    (8, "Google"),
    (9, "Pro-Unity"),
    (10, "ConnectingExpertise"),
    (11, "Agrega.io"),
    (12, "LittleBigConnection"),
];

const FIELDS: &[FieldMapping<'static>] = &[
    FieldMapping::new("data.attributes.place", "company.city"),
    FieldMapping::new("data.attributes.companyName", "company.name"),
    FieldMapping::new("data.attributes.country", "company.country"),
    FieldMapping::new("data.attributes.street", "company.street"),
    FieldMapping::new("data.attributes.zipcode", "company.zipcode"),
    FieldMapping::new("data.attributes.region", "company.region"),
    FieldMapping::new("data.attributes.startDate", "conditions.fromAt"),
    FieldMapping::new("data.attributes.endDate", "conditions.toAt"),
    FieldMapping::new("data.attributes.startImmediately", "conditions.startImmediately"),
    FieldMapping::new("data.attributes.occupationType", "conditions.occupation"),
    FieldMapping::new("data.id", "job_id"),
    FieldMapping::new("data.attributes.reference", "job_reference"),
    FieldMapping::new("data.attributes.title", "roleTitle"),
    FieldMapping::new("data.attributes.description", "job_desc"),
    FieldMapping::new("data.attributes.url", "job_url"),
    FieldMapping::new("data.attributes.creationDate", "publishedAt"),
    FieldMapping::new("data.attributes.deadline", "deadlineAt"),
    FieldMapping::new("data.attributes.isActive", "isActive"),
    FieldMapping::new("data.attributes.origin.typeOf", "serviceProvider"),
];

/// Bare criteria strings become `{ "name": ... }` records.
fn criteria_skill(source: &Value, _mapped: &Value) -> Option<Value> {
    source
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(|s| json!({ "name": s.trim() }))
}

fn criteria_language(source: &Value, _mapped: &Value) -> Option<Value> {
    source
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(|s| json!({ "language": s.trim() }))
}

const LISTS: &[ListMapping<'static>] = &[
    ListMapping::items(
        "data.attributes.skills",
        "skills",
        &[("name", "name"), ("level", "seniority")],
    ),
    ListMapping::items(CRITERIA_PATH, STAGED_SKILLS, &[]).with_transform(criteria_skill),
    ListMapping::items(CRITERIA_LANGUAGES_PATH, STAGED_LANGUAGES, &[])
        .with_transform(criteria_language),
    ListMapping::items(
        "data.attributes.languages",
        "languages",
        &[("language", "language"), ("level", "level")],
    ),
];

pub static TABLE: MappingTable<'static> = MappingTable {
    fields: FIELDS,
    lists: LISTS,
};

/// The `included` record a relationship of the primary resource points to.
///
/// Relationships are read from `data` when it is an object, otherwise from
/// the top level of the payload. Ids are compared as text, so `"17"` and
/// `17` match.
pub fn related_record<'v>(
    original: &'v Value,
    relationship: &str,
    kind: &str,
) -> Option<&'v Map<String, Value>> {
    let primary = match original.get("data") {
        Some(data) if data.is_object() => data,
        _ => original,
    };
    let id = primary
        .get("relationships")?
        .get(relationship)?
        .get("data")?
        .get("id")
        .filter(|v| is_present(v))
        .and_then(as_text)?;

    original
        .get("included")?
        .as_array()?
        .iter()
        .filter_map(Value::as_object)
        .find(|record| {
            record.get("type").and_then(Value::as_str) == Some(kind)
                && record.get("id").and_then(as_text).as_deref() == Some(id.as_str())
        })
}

fn related_company_name(original: &Value) -> Option<String> {
    related_record(original, "company", "company")?
        .get("attributes")?
        .get("name")
        .filter(|v| is_present(v))
        .and_then(as_text)
}

/// `{id, name}` of the opportunity's main manager, if it is included.
fn main_manager(original: &Value) -> Option<Value> {
    let record = related_record(original, "mainManager", "resource")?;
    let id = record.get("id").and_then(as_text)?;
    let attributes = record.get("attributes");
    let part = |key: &str| {
        attributes
            .and_then(|a| a.get(key))
            .and_then(as_text)
            .unwrap_or_default()
    };
    let name = format!("{} {}", part("firstName"), part("lastName"))
        .trim()
        .to_string();
    Some(json!({ "id": id, "name": name }))
}

fn service_provider(doc: &Map<String, Value>) -> String {
    let origin = doc.get("serviceProvider");
    if is_blank(origin) {
        PROVIDER_NAME.to_string()
    } else {
        translate_code(ORIGIN_TYPES, origin)
    }
}

/// Repair a mapped opportunity into the canonical shape.
pub fn repair(mapped: Value, original: &Value, now: DateTime<Utc>) -> Value {
    let mut doc = into_object(mapped);

    let company = ensure_object(&mut doc, "company");
    if is_blank(company.get("name")) {
        if let Some(name) = related_company_name(original) {
            company.insert("name".to_string(), Value::String(name));
        }
    }
    repair_company(company);
    repair_conditions(ensure_object(&mut doc, "conditions"));
    repair_dates(&mut doc, DeadlinePolicy::FarFuture, now);

    optional_text(&mut doc, "job_reference");
    require_job_id(&mut doc, |d| {
        let reference = d
            .get("job_reference")
            .filter(|v| is_present(v))
            .and_then(as_text)
            .unwrap_or_else(|| "unknown".to_string());
        format!("{}_{}", SOURCE_TAG, reference)
    });
    require_job_url(&mut doc, OPPORTUNITY_URL_BASE);

    normalize_records(&mut doc, "skills", SKILL, NOT_SPECIFIED);
    promote_staged(&mut doc, STAGED_SKILLS, "skills", SKILL, CRITERIA_SENIORITY);
    normalize_records(&mut doc, "languages", LANGUAGE, NOT_SPECIFIED);
    promote_staged(&mut doc, STAGED_LANGUAGES, "languages", LANGUAGE, NOT_SPECIFIED);

    let provider = service_provider(&doc);
    doc.insert("serviceProvider".to_string(), Value::String(provider));

    text_default(&mut doc, "seniority", NOT_SPECIFIED);
    text_default(&mut doc, "remoteOption", REMOTE_NOT_SPECIFIED);
    flag(&mut doc, "isActive");
    for key in ["roleTitle", "job_desc", "contractor"] {
        optional_text(&mut doc, key);
    }

    if let Some(manager) = main_manager(original) {
        ensure_object(&mut doc, "metadata").insert("manager".to_string(), manager);
    }
    ensure_array(&mut doc, "skills");
    ensure_array(&mut doc, "languages");

    Value::Object(doc)
}

/// Ids of listed opportunities whose `updateDate` is strictly after `cutoff`.
///
/// Entries without a usable id or update date are skipped.
pub fn updated_since(listing: &Value, cutoff: DateTime<Utc>) -> Vec<String> {
    let Some(entries) = listing.get("data").and_then(Value::as_array) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter(|entry| {
            entry
                .get("attributes")
                .and_then(|a| a.get("updateDate"))
                .filter(|v| is_present(v))
                .and_then(|v| parse_date(v, cutoff).ok())
                .is_some_and(|updated| updated > cutoff)
        })
        .filter_map(|entry| entry.get("id").filter(|v| is_present(v)).and_then(as_text))
        .collect()
}

pub struct OpportunityProfile;

impl SourceProfile for OpportunityProfile {
    fn name(&self) -> &str {
        "opportunity"
    }

    fn description(&self) -> &str {
        "BoondManager opportunity (JSON:API with included company/manager)"
    }

    fn table(&self) -> &MappingTable<'static> {
        &TABLE
    }

    fn repair(&self, mapped: Value, original: &Value, now: DateTime<Utc>) -> Value {
        repair(mapped, original, now)
    }

    fn stage_enrichment(&self, source: &mut Value, enrichment: &Enrichment) -> bool {
        stage(source, Some(enrichment));
        true
    }
}
