//! Repair primitives shared by every source's `apply_defaults`.
//!
//! Each source has its own rules, but they are all built from these
//! steps. Every step is total: whatever shape the mapped document has,
//! the step ends with a value of the canonical type in place.

use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Map, Value};

use crate::dates::{far_future, format_date, normalize_date};
use crate::value::{array_slot, as_code, as_number, as_text, is_blank, is_present, is_truthy, object_slot};

pub const UNKNOWN_COMPANY: &str = "Unknown Company";
pub const UNKNOWN_CITY: &str = "Unknown City";
pub const UNKNOWN_COUNTRY: &str = "Unknown Country";
pub const UNKNOWN_STREET: &str = "Unknown";
pub const UNKNOWN_ZIPCODE: &str = "00000";
pub const DEFAULT_OCCUPATION: &str = "FullTime";
pub const DEFAULT_CURRENCY: &str = "EUR";
pub const NOT_SPECIFIED: &str = "NS";
pub const REMOTE_NOT_SPECIFIED: &str = "NotSpecified";

/// Unwrap a mapped document into its top-level object.
pub fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// The object under `key`, created (or replacing a non-object) if needed.
pub fn ensure_object<'d>(doc: &'d mut Map<String, Value>, key: &str) -> &'d mut Map<String, Value> {
    object_slot(doc.entry(key.to_string()).or_insert(Value::Null))
}

/// The array under `key`, created (or replacing a non-array) if needed.
pub fn ensure_array<'d>(doc: &'d mut Map<String, Value>, key: &str) -> &'d mut Vec<Value> {
    array_slot(doc.entry(key.to_string()).or_insert(Value::Null))
}

/// Coerce `key` to text, writing `placeholder` when it is blank or not a scalar.
pub fn text_or(map: &mut Map<String, Value>, key: &str, placeholder: &str) {
    let text = map
        .get(key)
        .filter(|v| is_present(v))
        .and_then(as_text)
        .unwrap_or_else(|| placeholder.to_string());
    map.insert(key.to_string(), Value::String(text));
}

/// Coerce an optional field to text; blank or non-scalar values become null.
pub fn optional_text(map: &mut Map<String, Value>, key: &str) {
    if let Some(slot) = map.get_mut(key) {
        let text = Some(&*slot)
            .filter(|v| is_present(v))
            .and_then(as_text);
        *slot = text.map(Value::String).unwrap_or(Value::Null);
    }
}

/// Replace a falsy field with `default`, otherwise coerce it to text.
pub fn text_default(map: &mut Map<String, Value>, key: &str, default: &str) {
    let text = map
        .get(key)
        .filter(|v| is_truthy(v))
        .and_then(as_text)
        .unwrap_or_else(|| default.to_string());
    map.insert(key.to_string(), Value::String(text));
}

/// Coerce `key` to a boolean by truthiness; absent means `false`.
pub fn flag(map: &mut Map<String, Value>, key: &str) {
    let value = map.get(key).map(is_truthy).unwrap_or(false);
    map.insert(key.to_string(), Value::Bool(value));
}

/// Region slug derived from a city: lowercased, spaces become underscores.
pub fn region_from_city(city: &str) -> String {
    city.trim().to_lowercase().replace(' ', "_")
}

/// Placeholders for the company address, then the region fallback.
///
/// Must run after any company name or city resolution, since the region
/// is derived from the final city.
pub fn repair_company(company: &mut Map<String, Value>) {
    text_or(company, "name", UNKNOWN_COMPANY);
    text_or(company, "city", UNKNOWN_CITY);
    text_or(company, "country", UNKNOWN_COUNTRY);
    text_or(company, "street", UNKNOWN_STREET);
    text_or(company, "zipcode", UNKNOWN_ZIPCODE);
    optional_text(company, "contact");
    optional_text(company, "number");

    let region = match company.get("region").filter(|v| is_present(v)).and_then(as_text) {
        Some(region) => region,
        None => {
            let city = company.get("city").and_then(as_text).unwrap_or_default();
            region_from_city(&city)
        }
    };
    company.insert("region".to_string(), Value::String(region));
}

/// Conditions defaults and the nested daily rate.
pub fn repair_conditions(conditions: &mut Map<String, Value>) {
    flag(conditions, "startImmediately");
    text_or(conditions, "occupation", DEFAULT_OCCUPATION);

    let margin = conditions
        .get("fixedMargin")
        .and_then(as_number)
        .unwrap_or_else(|| json!(0.0));
    conditions.insert("fixedMargin".to_string(), margin);

    let rate = ensure_object(conditions, "dailyRate");
    text_or(rate, "currency", DEFAULT_CURRENCY);
    for bound in ["min", "max"] {
        let amount = rate.get(bound).and_then(as_number).unwrap_or(Value::Null);
        rate.insert(bound.to_string(), amount);
    }
}

/// How a missing `deadlineAt` is synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlinePolicy {
    /// Use the `9999-12-31T23:59:59Z` sentinel.
    FarFuture,
    /// Use `publishedAt` plus a fixed offset.
    AfterPublished(Duration),
}

fn date_or(value: Option<&Value>, default: DateTime<Utc>, now: DateTime<Utc>) -> String {
    match value {
        Some(v) if !is_blank(Some(v)) => normalize_date(v, default, now),
        _ => format_date(default),
    }
}

/// Normalize `publishedAt`, `deadlineAt`, `conditions.fromAt` and
/// `conditions.toAt`. `publishedAt` and `deadlineAt` are always written.
pub fn repair_dates(doc: &mut Map<String, Value>, policy: DeadlinePolicy, now: DateTime<Utc>) {
    let published_text = date_or(doc.get("publishedAt"), now, now);
    let published = DateTime::parse_from_rfc3339(&published_text)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now);
    doc.insert("publishedAt".to_string(), Value::String(published_text));

    let fallback = match policy {
        DeadlinePolicy::FarFuture => far_future(),
        DeadlinePolicy::AfterPublished(offset) => published
            .checked_add_signed(offset)
            .filter(|deadline| *deadline <= far_future())
            .unwrap_or_else(far_future),
    };
    let deadline_text = date_or(doc.get("deadlineAt"), fallback, now);
    let deadline = DateTime::parse_from_rfc3339(&deadline_text)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(fallback);
    doc.insert("deadlineAt".to_string(), Value::String(deadline_text));

    let conditions = ensure_object(doc, "conditions");
    if conditions.contains_key("fromAt") {
        let from = date_or(conditions.get("fromAt"), published, now);
        conditions.insert("fromAt".to_string(), Value::String(from));
    }
    if conditions.contains_key("toAt") {
        let to = date_or(conditions.get("toAt"), deadline, now);
        conditions.insert("toAt".to_string(), Value::String(to));
    }
}

/// Guarantee a non-empty `job_id`, synthesizing one when it is blank.
pub fn require_job_id<F>(doc: &mut Map<String, Value>, synthesize: F)
where
    F: FnOnce(&Map<String, Value>) -> String,
{
    let existing = doc
        .get("job_id")
        .filter(|v| is_present(v))
        .and_then(as_text);
    let job_id = match existing {
        Some(id) => id,
        None => synthesize(doc),
    };
    doc.insert("job_id".to_string(), Value::String(job_id));
}

/// Guarantee a `job_url`, defaulting to `{base}/{job_id}`. Call after [`require_job_id`].
pub fn require_job_url(doc: &mut Map<String, Value>, base: &str) {
    let existing = doc
        .get("job_url")
        .filter(|v| is_present(v))
        .and_then(as_text);
    let url = existing.unwrap_or_else(|| {
        let job_id = doc.get("job_id").and_then(as_text).unwrap_or_default();
        format!("{}/{}", base.trim_end_matches('/'), job_id)
    });
    doc.insert("job_url".to_string(), Value::String(url));
}

/// Shape of a canonical record list such as `skills` or `languages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordShape<'a> {
    pub name_key: &'a str,
    pub detail_key: &'a str,
}

pub const SKILL: RecordShape<'static> = RecordShape {
    name_key: "name",
    detail_key: "seniority",
};

pub const LANGUAGE: RecordShape<'static> = RecordShape {
    name_key: "language",
    detail_key: "level",
};

fn normalize_record(entry: &Value, shape: RecordShape<'_>, detail_default: &str) -> Option<Value> {
    let (name, detail) = match entry {
        Value::Object(record) => (
            record
                .get(shape.name_key)
                .filter(|v| is_present(v))
                .and_then(as_text)?,
            record.get(shape.detail_key).filter(|v| is_truthy(v)).and_then(as_text),
        ),
        other if !is_blank(Some(other)) => (as_text(other)?, None),
        _ => return None,
    };

    let mut record = Map::new();
    record.insert(shape.name_key.to_string(), Value::String(name));
    record.insert(
        shape.detail_key.to_string(),
        Value::String(detail.unwrap_or_else(|| detail_default.to_string())),
    );
    Some(Value::Object(record))
}

/// Coerce every entry of the list at `key` into `{name, detail}` records.
///
/// Bare strings become records with `detail_default`; entries without a
/// usable name are dropped.
pub fn normalize_records(
    doc: &mut Map<String, Value>,
    key: &str,
    shape: RecordShape<'_>,
    detail_default: &str,
) {
    let list = ensure_array(doc, key);
    let normalized: Vec<Value> = list
        .iter()
        .filter_map(|entry| normalize_record(entry, shape, detail_default))
        .collect();
    *list = normalized;
}

/// Move a staging list into `target` when `target` is empty.
///
/// The staging key is removed from the document in every case.
pub fn promote_staged(
    doc: &mut Map<String, Value>,
    staging_key: &str,
    target: &str,
    shape: RecordShape<'_>,
    detail_default: &str,
) {
    let staged = match doc.remove(staging_key) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    let target_list = ensure_array(doc, target);
    if !target_list.is_empty() || staged.is_empty() {
        return;
    }
    *target_list = staged
        .iter()
        .filter_map(|entry| normalize_record(entry, shape, detail_default))
        .collect();
}

/// Translate a small integer code to its label.
///
/// Unknown codes become `"Unknown (<code>)"`, non-code text is kept as a
/// label, and anything else becomes `"Unknown"`.
pub fn translate_code(table: &[(i64, &str)], value: Option<&Value>) -> String {
    let Some(value) = value.filter(|v| is_present(v)) else {
        return "Unknown".to_string();
    };
    match as_code(value) {
        Some(code) => table
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, label)| label.to_string())
            .unwrap_or_else(|| format!("Unknown ({})", code)),
        None => value
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| "Unknown".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn doc(value: Value) -> Map<String, Value> {
        into_object(value)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 21, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_ensure_object_replaces_wrong_type() {
        let mut d = doc(json!({ "company": "Acme", "conditions": [] }));
        ensure_object(&mut d, "company");
        ensure_object(&mut d, "conditions");
        assert_eq!(Value::Object(d), json!({ "company": {}, "conditions": {} }));
    }

    #[test]
    fn test_region_from_city() {
        let mut company = doc(json!({ "city": "Paris", "region": "" }));
        repair_company(&mut company);
        assert_eq!(company["region"], json!("paris"));

        let mut company = doc(json!({ "city": "Le Mans" }));
        repair_company(&mut company);
        assert_eq!(company["region"], json!("le_mans"));

        let mut company = doc(json!({}));
        repair_company(&mut company);
        assert_eq!(company["region"], json!("unknown_city"));
    }

    #[test]
    fn test_company_placeholders_and_coercion() {
        let mut company = doc(json!({ "name": null, "zipcode": 69003, "region": "Rhône" }));
        repair_company(&mut company);
        assert_eq!(
            Value::Object(company),
            json!({
                "name": "Unknown Company",
                "city": "Unknown City",
                "country": "Unknown Country",
                "street": "Unknown",
                "zipcode": "69003",
                "region": "Rhône"
            })
        );
    }

    #[test]
    fn test_conditions_defaults() {
        let mut conditions = doc(json!({ "fixedMargin": "12.5", "dailyRate": { "min": "400" } }));
        repair_conditions(&mut conditions);
        assert_eq!(
            Value::Object(conditions),
            json!({
                "startImmediately": false,
                "occupation": "FullTime",
                "fixedMargin": 12.5,
                "dailyRate": { "currency": "EUR", "min": 400.0, "max": null }
            })
        );
    }

    #[test]
    fn test_dates_far_future_deadline() {
        let mut d = doc(json!({ "conditions": { "fromAt": "", "toAt": "garbage" } }));
        repair_dates(&mut d, DeadlinePolicy::FarFuture, now());
        assert_eq!(d["publishedAt"], json!("2025-11-21T08:30:00Z"));
        assert_eq!(d["deadlineAt"], json!("9999-12-31T23:59:59Z"));
        assert_eq!(d["conditions"]["fromAt"], json!("2025-11-21T08:30:00Z"));
        assert_eq!(d["conditions"]["toAt"], json!("9999-12-31T23:59:59Z"));
    }

    #[test]
    fn test_dates_deadline_after_published() {
        let mut d = doc(json!({ "publishedAt": "2025-01-10", "deadlineAt": null }));
        repair_dates(&mut d, DeadlinePolicy::AfterPublished(Duration::days(30)), now());
        assert_eq!(d["publishedAt"], json!("2025-01-10T00:00:00Z"));
        assert_eq!(d["deadlineAt"], json!("2025-02-09T00:00:00Z"));
        assert!(d["conditions"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_deadline_after_published_stays_within_year_9999() {
        let mut d = doc(json!({ "publishedAt": "9999-12-31T00:00:00Z" }));
        repair_dates(&mut d, DeadlinePolicy::AfterPublished(Duration::days(30)), now());
        assert_eq!(d["publishedAt"], json!("9999-12-31T00:00:00Z"));
        assert_eq!(d["deadlineAt"], json!("9999-12-31T23:59:59Z"));
    }

    #[test]
    fn test_required_identity_fields() {
        let mut d = doc(json!({ "job_id": "", "job_reference": "REF-9" }));
        require_job_id(&mut d, |doc| {
            format!("boond_{}", doc["job_reference"].as_str().unwrap_or("unknown"))
        });
        require_job_url(&mut d, "https://example.test/opportunities/");
        assert_eq!(d["job_id"], json!("boond_REF-9"));
        assert_eq!(d["job_url"], json!("https://example.test/opportunities/boond_REF-9"));

        let mut d = doc(json!({ "job_id": 841, "job_url": "https://x.test/841" }));
        require_job_id(&mut d, |_| unreachable!());
        require_job_url(&mut d, "https://unused.test");
        assert_eq!(d["job_id"], json!("841"));
        assert_eq!(d["job_url"], json!("https://x.test/841"));
    }

    #[test]
    fn test_promote_staged_skills() {
        let mut d = doc(json!({ "skills": [], "skills_from_criteria": ["Python", { "name": "AWS" }] }));
        promote_staged(&mut d, "skills_from_criteria", "skills", SKILL, "Required");
        assert_eq!(
            Value::Object(d),
            json!({ "skills": [
                { "name": "Python", "seniority": "Required" },
                { "name": "AWS", "seniority": "Required" }
            ] })
        );
    }

    #[test]
    fn test_promote_staged_keeps_existing_and_drops_staging_key() {
        let mut d = doc(json!({ "skills": [ { "name": "Go" } ], "skills_from_criteria": ["Rust"] }));
        promote_staged(&mut d, "skills_from_criteria", "skills", SKILL, "Required");
        assert_eq!(Value::Object(d), json!({ "skills": [ { "name": "Go" } ] }));
    }

    #[test]
    fn test_normalize_records() {
        let mut d = doc(json!({ "languages": [
            { "language": "en", "level": "B2" },
            { "language": "fr", "level": null },
            { "level": "C1" },
            "de",
            7
        ] }));
        normalize_records(&mut d, "languages", LANGUAGE, NOT_SPECIFIED);
        assert_eq!(
            d["languages"],
            json!([
                { "language": "en", "level": "B2" },
                { "language": "fr", "level": "NS" },
                { "language": "de", "level": "NS" },
                { "language": "7", "level": "NS" }
            ])
        );
    }

    #[test]
    fn test_translate_code() {
        let table = [(0, "Prospection"), (9, "Pro-Unity")];
        assert_eq!(translate_code(&table, Some(&json!(9))), "Pro-Unity");
        assert_eq!(translate_code(&table, Some(&json!("0"))), "Prospection");
        assert_eq!(translate_code(&table, Some(&json!(99))), "Unknown (99)");
        assert_eq!(translate_code(&table, Some(&json!("Partner"))), "Partner");
        assert_eq!(translate_code(&table, None), "Unknown");
    }

    #[test]
    fn test_flags_and_text_defaults() {
        let mut d = doc(json!({ "isActive": 1, "seniority": "", "remoteOption": "Hybrid" }));
        flag(&mut d, "isActive");
        flag(&mut d, "missing");
        text_default(&mut d, "seniority", NOT_SPECIFIED);
        text_default(&mut d, "remoteOption", REMOTE_NOT_SPECIFIED);
        assert_eq!(
            Value::Object(d),
            json!({
                "isActive": true,
                "missing": false,
                "seniority": "NS",
                "remoteOption": "Hybrid"
            })
        );
    }
}
