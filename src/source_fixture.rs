//! Synthetic fixture schema used to exercise the engine on a layout that
//! shares no paths with the real upstreams. Repair follows the feed rules.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::mapping::{FieldMapping, ListMapping, MappingTable};
use crate::source_feed::{repair_feed, FeedIdentity, CLOSED_KEY};
use crate::traits::SourceProfile;

pub const FIXTURE: FeedIdentity = FeedIdentity {
    tag: "fixture",
    provider: "Fixture",
    url_base: "https://fixtures.invalid/jobs",
};

const FIELDS: &[FieldMapping<'static>] = &[
    FieldMapping::new("org.label", "company.name"),
    FieldMapping::new("org.hq.addr.street", "company.street"),
    FieldMapping::new("org.hq.addr.zip", "company.zipcode"),
    FieldMapping::new("org.hq.addr.city", "company.city"),
    FieldMapping::new("org.hq.addr.country", "company.country"),
    FieldMapping::new("org.hq.regionName", "company.region"),
    FieldMapping::new("jobDetails.identifier", "job_id"),
    FieldMapping::new("jobDetails.summary", "job_desc"),
    FieldMapping::new("jobDetails.url", "job_url"),
    FieldMapping::new("timings.deadline", "deadlineAt"),
    FieldMapping::new("timings.publication", "publishedAt"),
    FieldMapping::new("timings.start.from", "conditions.fromAt"),
    FieldMapping::new("timings.start.to", "conditions.toAt"),
    FieldMapping::new("timings.start.immediate", "conditions.startImmediately"),
    FieldMapping::new("payment.currency", "conditions.dailyRate.currency"),
    FieldMapping::new("payment.range.low", "conditions.dailyRate.min"),
    FieldMapping::new("payment.range.high", "conditions.dailyRate.max"),
    FieldMapping::new("payment.marginFixed", "conditions.fixedMargin"),
    FieldMapping::new("collaboration.contractorName", "contractor"),
    FieldMapping::new("collaboration.isClosedFlag", CLOSED_KEY),
];

const LISTS: &[ListMapping<'static>] = &[
    ListMapping::items(
        "langs",
        "languages",
        &[("lang", "language"), ("level", "level")],
    ),
    ListMapping::items(
        "techStack.requiredSkills",
        "skills",
        &[("label", "name"), ("xp", "seniority")],
    ),
];

pub static TABLE: MappingTable<'static> = MappingTable {
    fields: FIELDS,
    lists: LISTS,
};

pub struct FixtureProfile;

impl SourceProfile for FixtureProfile {
    fn name(&self) -> &str {
        "fixture"
    }

    fn description(&self) -> &str {
        "Synthetic test schema (org / jobDetails / timings / payment)"
    }

    fn table(&self) -> &MappingTable<'static> {
        &TABLE
    }

    fn repair(&self, mapped: Value, original: &Value, now: DateTime<Utc>) -> Value {
        repair_feed(mapped, original, &FIXTURE, now)
    }
}
