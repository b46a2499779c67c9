//! # Mission Harvest
//!
//! Declarative mapping of staffing-platform mission offers into one
//! canonical mission-request schema.
//!
//! Each upstream (BoondManager opportunities, the LittleBigConnection feed,
//! a synthetic fixture schema) is described by a mapping table of path
//! pairs plus a repair routine that fills every gap with a safe default.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────┐
//! │ Attachments │──▶│ Mapping      │──▶│ Repair       │──▶│ <job_id> │
//! │ + sidecars  │   │ engine/table │   │ (per source) │   │  .json   │
//! └─────────────┘   └──────────────┘   └──────────────┘   └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`path`] | Dotted/indexed path access into JSON |
//! | [`mapping`] | Mapping tables and the mapping engine |
//! | [`dates`] | Tolerant date parsing |
//! | [`defaults`] | Repair primitives shared by every source |
//! | [`source_opportunity`] | BoondManager opportunity profile |
//! | [`source_feed`] | LittleBigConnection feed profile |
//! | [`source_fixture`] | Synthetic fixture profile |
//! | [`traits`] | `SourceProfile` trait and registry |
//! | [`enrich`] | Text-enrichment staging |
//! | [`models`] | Canonical mission-request schema |
//! | [`config`] | TOML configuration |
//! | [`attachments`] | Attachment discovery |
//! | [`ingest`] | Sync pipeline |

pub mod attachments;
pub mod config;
pub mod dates;
pub mod defaults;
pub mod enrich;
pub mod error;
pub mod ingest;
pub mod mapping;
pub mod models;
pub mod path;
pub mod source_feed;
pub mod source_fixture;
pub mod source_opportunity;
pub mod sources;
pub mod traits;
pub mod value;
