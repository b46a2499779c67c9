//! LittleBigConnection mission feed.
//!
//! Feed entries are flat-ish objects grouped by concern (`locationInfo`,
//! `budgetInfo`, `publicationInfo`, ...). Languages arrive as level groups
//! that are flattened to one record per language. The repair routine is
//! shared with other feed-shaped upstreams through [`FeedIdentity`].

use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::defaults::{
    ensure_array, ensure_object, flag, into_object, normalize_records, optional_text,
    repair_company, repair_conditions, repair_dates, require_job_id, require_job_url,
    text_default, DeadlinePolicy, LANGUAGE, NOT_SPECIFIED, REMOTE_NOT_SPECIFIED, SKILL,
};
use crate::mapping::{FieldMapping, GroupSpec, ListMapping, MappingTable};
use crate::traits::SourceProfile;
use crate::value::{as_text, is_present, is_truthy};

/// Staging key for the upstream "closed" flag, inverted into `isActive`.
pub const CLOSED_KEY: &str = "isClosed";

/// Days between publication and the synthesized deadline.
pub const DEADLINE_DAYS: i64 = 30;

/// Naming used when a feed document has to synthesize its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedIdentity {
    /// Prefix of synthesized job ids.
    pub tag: &'static str,
    /// Fallback `serviceProvider`.
    pub provider: &'static str,
    /// Base of synthesized job urls.
    pub url_base: &'static str,
}

pub const LBC: FeedIdentity = FeedIdentity {
    tag: "ldg",
    provider: "LittleBigConnection",
    url_base: "https://www.littlebigconnection.com/missions",
};

const FIELDS: &[FieldMapping<'static>] = &[
    FieldMapping::new("locationInfo.mainLocation.city", "company.city"),
    FieldMapping::new("companyInfo.companyName", "company.name"),
    FieldMapping::new("locationInfo.mainLocation.country", "company.country"),
    FieldMapping::new("locationInfo.mainLocation.street", "company.street"),
    FieldMapping::new("locationInfo.mainLocation.zipCode", "company.zipcode"),
    FieldMapping::new("locationInfo.mainLocation.region", "company.region"),
    FieldMapping::new("locationInfo.mainLocation.remoteOption", "remoteOption"),
    FieldMapping::new("budgetInfo.currencyInfo.symbol", "conditions.dailyRate.currency"),
    FieldMapping::new("budgetInfo.minDailyRate", "conditions.dailyRate.min"),
    FieldMapping::new("budgetInfo.maxDailyRate", "conditions.dailyRate.max"),
    FieldMapping::new("budgetInfo.fixedMargin", "conditions.fixedMargin"),
    FieldMapping::new("budgetInfo.startDate", "conditions.fromAt"),
    FieldMapping::new("budgetInfo.endDate", "conditions.toAt"),
    FieldMapping::new("budgetInfo.canStartImmediately", "conditions.startImmediately"),
    FieldMapping::new("budgetInfo.occupation", "conditions.occupation"),
    FieldMapping::new("contractingPartyName", "contractor"),
    FieldMapping::new("contractingPartyName", "serviceProvider"),
    FieldMapping::new("managedServiceProviderName", "serviceProvider"),
    FieldMapping::new("publicationInfo.applicationDeadline", "deadlineAt"),
    FieldMapping::new("publicationInfo.publishDate", "publishedAt"),
    FieldMapping::new("jobUrl", "job_url"),
    FieldMapping::new("id", "job_id"),
    FieldMapping::new("description", "job_desc"),
    FieldMapping::new("roleInfo.roles[0].name", "roleTitle"),
    FieldMapping::new("publicationInfo.isClosed", CLOSED_KEY),
];

const LANGUAGE_GROUPS: GroupSpec<'static> = GroupSpec {
    members: "languages",
    attribute_keys: &["languageLevel", "languageLevelLabel"],
    leaf_keys: &["language", "name"],
    item_key: "language",
    attribute_item_key: "level",
};

const LISTS: &[ListMapping<'static>] = &[
    ListMapping::items(
        "skillInfo.skills",
        "skills",
        &[("name", "name"), ("seniority", "seniority")],
    ),
    ListMapping::grouped("languageInfo.languageGroups", "languages", LANGUAGE_GROUPS),
];

pub static TABLE: MappingTable<'static> = MappingTable {
    fields: FIELDS,
    lists: LISTS,
};

/// `{tag}_` plus the first 12 hex digits of the SHA-256 of the job url,
/// or of the whole source document when there is no url.
fn synthesize_job_id(doc: &Map<String, Value>, original: &Value, tag: &str) -> String {
    let seed = doc
        .get("job_url")
        .filter(|v| is_present(v))
        .and_then(as_text)
        .unwrap_or_else(|| original.to_string());
    let digest = format!("{:x}", Sha256::digest(seed.as_bytes()));
    format!("{}_{}", tag, &digest[..12])
}

/// `isActive` is the negation of the staged closed flag when one was mapped.
fn repair_active(doc: &mut Map<String, Value>) {
    match doc.remove(CLOSED_KEY) {
        Some(closed) if !closed.is_null() => {
            doc.insert("isActive".to_string(), Value::Bool(!is_truthy(&closed)));
        }
        _ => flag(doc, "isActive"),
    }
}

/// Repair a mapped feed document, naming synthesized values after `identity`.
pub fn repair_feed(
    mapped: Value,
    original: &Value,
    identity: &FeedIdentity,
    now: DateTime<Utc>,
) -> Value {
    let mut doc = into_object(mapped);

    repair_company(ensure_object(&mut doc, "company"));
    repair_conditions(ensure_object(&mut doc, "conditions"));
    repair_dates(
        &mut doc,
        DeadlinePolicy::AfterPublished(Duration::days(DEADLINE_DAYS)),
        now,
    );

    require_job_id(&mut doc, |d| synthesize_job_id(d, original, identity.tag));
    require_job_url(&mut doc, identity.url_base);

    normalize_records(&mut doc, "skills", SKILL, NOT_SPECIFIED);
    normalize_records(&mut doc, "languages", LANGUAGE, NOT_SPECIFIED);

    text_default(&mut doc, "serviceProvider", identity.provider);
    text_default(&mut doc, "seniority", NOT_SPECIFIED);
    text_default(&mut doc, "remoteOption", REMOTE_NOT_SPECIFIED);
    repair_active(&mut doc);
    for key in ["roleTitle", "job_desc", "contractor"] {
        optional_text(&mut doc, key);
    }
    ensure_array(&mut doc, "skills");
    ensure_array(&mut doc, "languages");

    Value::Object(doc)
}

pub struct FeedProfile;

impl SourceProfile for FeedProfile {
    fn name(&self) -> &str {
        "feed"
    }

    fn description(&self) -> &str {
        "LittleBigConnection mission feed entry"
    }

    fn table(&self) -> &MappingTable<'static> {
        &TABLE
    }

    fn repair(&self, mapped: Value, original: &Value, now: DateTime<Utc>) -> Value {
        repair_feed(mapped, original, &LBC, now)
    }
}
