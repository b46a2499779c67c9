//! Dotted-path access into nested JSON documents.
//!
//! A path is a sequence of segments separated by `.`. A segment of the form
//! `name[N]` addresses element `N` of the array stored under `name`; any
//! other segment addresses an object key. Dots inside a bracket group do
//! not split segments.
//!
//! Reads ([`get`]) understand the indexed form. Writes ([`set`],
//! [`append_to_list`]) only ever address objects: destination paths are
//! plain keys, and any intermediate that is missing or not an object is
//! replaced with an empty one.

use serde_json::{Map, Value};

use crate::error::{MapError, MapResult};
use crate::value::{array_slot, object_slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'p> {
    Key(&'p str),
    Index(&'p str, usize),
}

/// Split a source path on `.` characters that sit outside `[...]` groups.
fn split_path(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (pos, ch) in path.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '.' if depth == 0 => {
                segments.push(&path[start..pos]);
                start = pos + 1;
            }
            _ => {}
        }
    }
    segments.push(&path[start..]);
    segments
}

fn parse_segment(segment: &str) -> Segment<'_> {
    let indexed = segment
        .strip_suffix(']')
        .and_then(|rest| rest.split_once('['))
        .filter(|(name, digits)| {
            !name.is_empty() && !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
        })
        .and_then(|(name, digits)| digits.parse().ok().map(|index| (name, index)));

    match indexed {
        Some((name, index)) => Segment::Index(name, index),
        None => Segment::Key(segment),
    }
}

fn lookup<'v>(current: &'v Value, key: &str, path: &str) -> MapResult<&'v Value> {
    current
        .as_object()
        .and_then(|map| map.get(key))
        .ok_or_else(|| MapError::FieldAbsent {
            path: path.to_string(),
        })
}

/// Resolve `path` inside `data`.
///
/// Fails with [`MapError::FieldAbsent`] when a key is missing or the
/// container is not an object, and with [`MapError::IndexOutOfRange`] when
/// an indexed segment points past the end of its array.
pub fn get<'v>(data: &'v Value, path: &str) -> MapResult<&'v Value> {
    let mut current = data;
    for segment in split_path(path) {
        current = match parse_segment(segment) {
            Segment::Key(key) => lookup(current, key, path)?,
            Segment::Index(key, index) => {
                let items = lookup(current, key, path)?
                    .as_array()
                    .ok_or_else(|| MapError::FieldAbsent {
                        path: path.to_string(),
                    })?;
                items.get(index).ok_or_else(|| MapError::IndexOutOfRange {
                    path: path.to_string(),
                    index,
                })?
            }
        };
    }
    Ok(current)
}

/// Create (or replace with) empty objects along every segment but the last,
/// returning the deepest container.
pub fn ensure_intermediate<'m>(
    data: &'m mut Map<String, Value>,
    path: &str,
) -> &'m mut Map<String, Value> {
    let mut segments: Vec<&str> = path.split('.').collect();
    segments.pop();

    let mut current = data;
    for key in segments {
        let slot = current.entry(key.to_string()).or_insert(Value::Null);
        current = object_slot(slot);
    }
    current
}

fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// Assign `value` at `path`, creating intermediate objects as needed.
pub fn set(data: &mut Map<String, Value>, path: &str, value: Value) {
    let parent = ensure_intermediate(data, path);
    parent.insert(last_segment(path).to_string(), value);
}

/// Append `value` to the array at `path`. A missing key or a non-array
/// value at the last segment is replaced with an empty array first.
pub fn append_to_list(data: &mut Map<String, Value>, path: &str, value: Value) {
    let parent = ensure_intermediate(data, path);
    let slot = parent
        .entry(last_segment(path).to_string())
        .or_insert(Value::Null);
    array_slot(slot).push(value);
}
