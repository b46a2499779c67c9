//! Error kinds raised inside the mapping core.
//!
//! None of these ever reach the caller of [`crate::mapping::map_document`]
//! or a source's `apply_defaults`: the engine and the repair layer absorb
//! them and degrade the output document instead. They exist so the
//! absent/degraded paths are visible in types and can be logged.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("field '{path}' is absent")]
    FieldAbsent { path: String },

    #[error("index {index} out of range at '{path}'")]
    IndexOutOfRange { path: String, index: usize },

    #[error("list '{path}' is unavailable")]
    ListUnavailable { path: String },

    #[error("item {index} of list '{path}' is malformed")]
    ItemMalformed { path: String, index: usize },

    #[error("date '{value}' could not be resolved")]
    UnresolvableDate { value: String },
}

pub type MapResult<T> = std::result::Result<T, MapError>;
