//! Declarative JSON-to-JSON mapping engine.
//!
//! A [`MappingTable`] pairs scalar [`FieldMapping`]s (source path →
//! destination path) with [`ListMapping`]s that rebuild a source array
//! item by item. [`map_document`] applies a table to one source document
//! and never fails: a field that does not resolve is left out of the
//! result, and a list that cannot be built is skipped as a whole. The
//! repair layer of each source fills the gaps afterwards.

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::{MapError, MapResult};
use crate::path;
use crate::value::is_truthy;

/// Per-item hook run after the field copy: `(source_item, mapped_item)`.
///
/// Returning `None` (or a falsy value) keeps the field-mapped item.
pub type ItemTransform = fn(&Value, &Value) -> Option<Value>;

/// Copy the value at `source` into the result at `destination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping<'a> {
    pub source: &'a str,
    pub destination: &'a str,
}

impl<'a> FieldMapping<'a> {
    pub const fn new(source: &'a str, destination: &'a str) -> Self {
        Self {
            source,
            destination,
        }
    }
}

/// Layout of a grouped source list: each group carries a sub-array of
/// leaves plus one attribute shared by all of them.
///
/// `[{ "languageLevel": "B2", "languages": ["en", "fr"] }]` flattens to
/// `[{ "language": "en", "level": "B2" }, { "language": "fr", "level": "B2" }]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSpec<'a> {
    /// Key of the sub-array inside each group.
    pub members: &'a str,
    /// Group keys tried in order for the shared attribute; the first truthy one wins.
    pub attribute_keys: &'a [&'a str],
    /// Keys tried in order when a leaf is an object rather than a scalar.
    pub leaf_keys: &'a [&'a str],
    /// Destination key receiving the leaf.
    pub item_key: &'a str,
    /// Destination key receiving the shared attribute.
    pub attribute_item_key: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListShape<'a> {
    /// A flat array of item records.
    Items,
    /// An array of groups flattened into one item per leaf.
    Grouped(GroupSpec<'a>),
}

/// Rebuild the array at `source` into the array at `destination`.
#[derive(Clone, Copy)]
pub struct ListMapping<'a> {
    pub source: &'a str,
    pub destination: &'a str,
    /// `(source_key, destination_key)` pairs; empty copies each item whole.
    pub item_fields: &'a [(&'a str, &'a str)],
    pub transform: Option<ItemTransform>,
    pub shape: ListShape<'a>,
}

impl<'a> ListMapping<'a> {
    pub const fn items(
        source: &'a str,
        destination: &'a str,
        item_fields: &'a [(&'a str, &'a str)],
    ) -> Self {
        Self {
            source,
            destination,
            item_fields,
            transform: None,
            shape: ListShape::Items,
        }
    }

    pub const fn grouped(source: &'a str, destination: &'a str, spec: GroupSpec<'a>) -> Self {
        Self {
            source,
            destination,
            item_fields: &[],
            transform: None,
            shape: ListShape::Grouped(spec),
        }
    }

    pub const fn with_transform(mut self, transform: ItemTransform) -> Self {
        self.transform = Some(transform);
        self
    }
}

/// A complete mapping declaration for one source type.
#[derive(Clone, Copy)]
pub struct MappingTable<'a> {
    pub fields: &'a [FieldMapping<'a>],
    pub lists: &'a [ListMapping<'a>],
}

/// Apply `table` to `source`, returning a new JSON object.
///
/// Scalar mappings run first, in table order, so a later entry overwrites
/// an earlier one that targets the same destination. List mappings run
/// next; a list that breaks halfway keeps the items produced before the
/// break and stops there.
pub fn map_document(source: &Value, table: &MappingTable<'_>) -> Value {
    let mut result = Map::new();

    for field in table.fields {
        match path::get(source, field.source) {
            Ok(value) => path::set(&mut result, field.destination, value.clone()),
            Err(err) => trace!(destination = field.destination, "skipping field: {}", err),
        }
    }

    for list in table.lists {
        let mut items = Vec::new();
        let outcome = map_list(source, list, &mut items);
        for item in items {
            path::append_to_list(&mut result, list.destination, item);
        }
        if let Err(err) = outcome {
            debug!(destination = list.destination, "list cut short: {}", err);
        }
    }

    Value::Object(result)
}

/// Resolve `path` to an array, or report it as unavailable.
pub fn resolve_list<'v>(source: &'v Value, path: &str) -> MapResult<&'v Vec<Value>> {
    path::get(source, path)
        .ok()
        .and_then(Value::as_array)
        .ok_or_else(|| MapError::ListUnavailable {
            path: path.to_string(),
        })
}

/// Push mapped items into `out` as they are produced. On error, the items
/// already pushed stay.
fn map_list(source: &Value, list: &ListMapping<'_>, out: &mut Vec<Value>) -> MapResult<()> {
    let items = resolve_list(source, list.source)?;
    match &list.shape {
        ListShape::Grouped(spec) => flatten_groups(items, spec, list.source, out),
        ListShape::Items => {
            out.extend(
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| map_item(item, index, list)),
            );
            Ok(())
        }
    }
}

fn map_item(item: &Value, index: usize, list: &ListMapping<'_>) -> Value {
    let mapped = if list.item_fields.is_empty() {
        item.clone()
    } else {
        let mut mapped = Map::new();
        match item.as_object() {
            Some(record) => {
                for (source_key, destination_key) in list.item_fields {
                    if let Some(value) = record.get(*source_key) {
                        mapped.insert(destination_key.to_string(), value.clone());
                    }
                }
            }
            None => {
                let err = MapError::ItemMalformed {
                    path: list.source.to_string(),
                    index,
                };
                trace!("{}", err);
            }
        }
        Value::Object(mapped)
    };

    match list.transform.and_then(|transform| transform(item, &mapped)) {
        Some(replacement) if is_truthy(&replacement) => replacement,
        _ => mapped,
    }
}

fn flatten_groups(
    groups: &[Value],
    spec: &GroupSpec<'_>,
    path: &str,
    flattened: &mut Vec<Value>,
) -> MapResult<()> {
    for (index, group) in groups.iter().enumerate() {
        let group = group.as_object().ok_or_else(|| MapError::ItemMalformed {
            path: path.to_string(),
            index,
        })?;

        let attribute = first_truthy(group, spec.attribute_keys).unwrap_or(Value::Null);
        let members = match group.get(spec.members) {
            Some(Value::Array(members)) => members.as_slice(),
            _ => &[],
        };

        for leaf in members {
            let leaf_value = leaf
                .as_object()
                .and_then(|record| first_truthy(record, spec.leaf_keys))
                .unwrap_or_else(|| leaf.clone());

            let mut item = Map::new();
            item.insert(spec.item_key.to_string(), leaf_value);
            item.insert(spec.attribute_item_key.to_string(), attribute.clone());
            flattened.push(Value::Object(item));
        }
    }

    Ok(())
}

fn first_truthy(record: &Map<String, Value>, keys: &[&str]) -> Option<Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|value| is_truthy(value))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const LANGUAGE_GROUPS: GroupSpec<'static> = GroupSpec {
        members: "languages",
        attribute_keys: &["languageLevel", "languageLevelLabel"],
        leaf_keys: &["language", "name"],
        item_key: "language",
        attribute_item_key: "level",
    };

    fn keep_mapped(_source: &Value, _mapped: &Value) -> Option<Value> {
        None
    }

    fn name_from_string(source: &Value, _mapped: &Value) -> Option<Value> {
        source.as_str().map(|name| json!({ "name": name }))
    }

    fn always_empty(_source: &Value, _mapped: &Value) -> Option<Value> {
        Some(json!({}))
    }

    #[test]
    fn test_missing_everything_yields_empty_object() {
        let table = MappingTable {
            fields: &[
                FieldMapping::new("a.b.c", "x"),
                FieldMapping::new("roles[3].name", "roleTitle"),
            ],
            lists: &[
                ListMapping::items("skillInfo.skills", "skills", &[("name", "name")]),
                ListMapping::grouped("languageInfo.languageGroups", "languages", LANGUAGE_GROUPS),
            ],
        };
        assert_eq!(map_document(&json!({}), &table), json!({}));
        assert_eq!(map_document(&json!({ "a": 1 }), &table), json!({}));
    }

    #[test]
    fn test_scalar_mappings_nest_destinations() {
        let table = MappingTable {
            fields: &[
                FieldMapping::new("budgetInfo.minDailyRate", "conditions.dailyRate.min"),
                FieldMapping::new("budgetInfo.maxDailyRate", "conditions.dailyRate.max"),
                FieldMapping::new("roleInfo.roles[0].name", "roleTitle"),
            ],
            lists: &[],
        };
        let source = json!({
            "budgetInfo": { "minDailyRate": 500, "maxDailyRate": 650 },
            "roleInfo": { "roles": [ { "name": "SRE" } ] }
        });
        assert_eq!(
            map_document(&source, &table),
            json!({
                "conditions": { "dailyRate": { "min": 500, "max": 650 } },
                "roleTitle": "SRE"
            })
        );
    }

    #[test]
    fn test_same_source_feeds_two_destinations_and_last_writer_wins() {
        let table = MappingTable {
            fields: &[
                FieldMapping::new("party", "contractor"),
                FieldMapping::new("party", "serviceProvider"),
                FieldMapping::new("msp", "serviceProvider"),
            ],
            lists: &[],
        };
        let mapped = map_document(&json!({ "party": "Acme", "msp": "Broker" }), &table);
        assert_eq!(mapped, json!({ "contractor": "Acme", "serviceProvider": "Broker" }));

        let mapped = map_document(&json!({ "party": "Acme" }), &table);
        assert_eq!(mapped, json!({ "contractor": "Acme", "serviceProvider": "Acme" }));
    }

    #[test]
    fn test_skill_items_with_identity_field_map() {
        let table = MappingTable {
            fields: &[],
            lists: &[ListMapping::items(
                "skillInfo.skills",
                "skills",
                &[("name", "name"), ("seniority", "seniority")],
            )
            .with_transform(keep_mapped)],
        };
        let source = json!({ "skillInfo": { "skills": [ { "name": "Python", "seniority": "Senior" } ] } });
        assert_eq!(
            map_document(&source, &table),
            json!({ "skills": [ { "name": "Python", "seniority": "Senior" } ] })
        );
    }

    #[test]
    fn test_item_fields_rename_and_skip_missing_keys() {
        let table = MappingTable {
            fields: &[],
            lists: &[ListMapping::items(
                "techStack.requiredSkills",
                "skills",
                &[("label", "name"), ("xp", "seniority")],
            )],
        };
        let source = json!({ "techStack": { "requiredSkills": [
            { "label": "Go", "xp": "Junior" },
            { "label": "Kafka" },
            "loose string"
        ] } });
        assert_eq!(
            map_document(&source, &table),
            json!({ "skills": [
                { "name": "Go", "seniority": "Junior" },
                { "name": "Kafka" },
                {}
            ] })
        );
    }

    #[test]
    fn test_transform_replaces_or_keeps() {
        let table = MappingTable {
            fields: &[],
            lists: &[
                ListMapping::items("criteria", "staged", &[]).with_transform(name_from_string),
                ListMapping::items("records", "kept", &[("id", "id")]).with_transform(always_empty),
            ],
        };
        let source = json!({
            "criteria": ["Rust", { "name": "Already" }],
            "records": [ { "id": 7 } ]
        });
        assert_eq!(
            map_document(&source, &table),
            json!({
                "staged": [ { "name": "Rust" }, { "name": "Already" } ],
                "kept": [ { "id": 7 } ]
            })
        );
    }

    #[test]
    fn test_grouped_languages_flatten_in_order() {
        let table = MappingTable {
            fields: &[],
            lists: &[ListMapping::grouped(
                "languageInfo.languageGroups",
                "languages",
                LANGUAGE_GROUPS,
            )],
        };
        let source = json!({ "languageInfo": { "languageGroups": [
            { "languageLevel": "B2", "languages": ["en", "fr"] },
            { "languageLevel": "C1", "languages": ["de"] }
        ] } });
        assert_eq!(
            map_document(&source, &table),
            json!({ "languages": [
                { "language": "en", "level": "B2" },
                { "language": "fr", "level": "B2" },
                { "language": "de", "level": "C1" }
            ] })
        );
    }

    #[test]
    fn test_grouped_fallbacks() {
        let table = MappingTable {
            fields: &[],
            lists: &[ListMapping::grouped("groups", "languages", LANGUAGE_GROUPS)],
        };
        let source = json!({ "groups": [
            { "languageLevelLabel": "Native", "languages": [ { "name": "Italian" } ] },
            { "languages": [ { "code": "nl" } ] },
            { "languageLevel": "A2" }
        ] });
        assert_eq!(
            map_document(&source, &table),
            json!({ "languages": [
                { "language": "Italian", "level": "Native" },
                { "language": { "code": "nl" }, "level": null }
            ] })
        );
    }

    #[test]
    fn test_failed_list_does_not_abort_others() {
        let table = MappingTable {
            fields: &[FieldMapping::new("id", "job_id")],
            lists: &[
                ListMapping::grouped("groups", "languages", LANGUAGE_GROUPS),
                ListMapping::items("notAList", "tags", &[]),
                ListMapping::items("skills", "skills", &[]),
            ],
        };
        let source = json!({
            "id": "A-1",
            "groups": [ { "languageLevel": "B1", "languages": ["es"] }, "broken" ],
            "notAList": { "k": "v" },
            "skills": [ { "name": "Scala" } ]
        });
        assert_eq!(
            map_document(&source, &table),
            json!({
                "job_id": "A-1",
                "languages": [ { "language": "es", "level": "B1" } ],
                "skills": [ { "name": "Scala" } ]
            })
        );
    }

    #[test]
    fn test_resolve_list_reports_unavailable() {
        let source = json!({ "a": { "b": 3 } });
        assert_eq!(
            resolve_list(&source, "a.b"),
            Err(MapError::ListUnavailable {
                path: "a.b".to_string()
            })
        );
    }
}
