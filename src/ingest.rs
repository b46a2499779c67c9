//! Sync pipeline orchestration.
//!
//! attachments → enrichment staging → map → repair → schema check → write.
//! A file that cannot be read, parsed or validated is counted as failed and
//! logged; it never stops the run. Outputs land in `output.dir` as
//! `<job_id>.json`.

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::attachments::{load_attachment, read_document, scan_attachments, AttachmentFile};
use crate::config::Config;
use crate::enrich::Enrichment;
use crate::models::MissionRequest;
use crate::source_opportunity::updated_since;
use crate::traits::{ProfileRegistry, SourceProfile};

/// Counters reported at the end of a sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub fetched: usize,
    /// Documents that mapped and validated, written or not.
    pub mapped: usize,
    pub written: usize,
    pub failed: usize,
}

pub fn resolve_profile<'r>(registry: &'r ProfileRegistry, name: &str) -> Result<&'r dyn SourceProfile> {
    registry.get(name).ok_or_else(|| {
        anyhow!(
            "Unknown source profile: '{}'. Available: {}",
            name,
            registry.names().join(", ")
        )
    })
}

/// Map one source document through `profile` into a validated request.
pub fn map_source(
    profile: &dyn SourceProfile,
    mut source: serde_json::Value,
    enrichment: Option<&Enrichment>,
) -> Result<MissionRequest> {
    if let Some(enrichment) = enrichment {
        if !profile.stage_enrichment(&mut source, enrichment) {
            warn!(
                profile = profile.name(),
                "profile has no enrichment slot; enrichment ignored"
            );
        }
    }
    let doc = profile.transform(&source);
    MissionRequest::from_document(doc).context("Mapped document does not fit the mission schema")
}

/// `harvest map`: map a single file and print the canonical JSON.
pub fn run_map(profile: &dyn SourceProfile, file: &Path, enrichment: Option<&Path>) -> Result<()> {
    let source = read_document(file)?;
    let enrichment = enrichment.map(Enrichment::load).transpose()?;
    let request = map_source(profile, source, enrichment.as_ref())?;
    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}

/// `harvest sync`: map every attachment under `input.root`.
pub fn run_sync(
    config: &Config,
    profile: &dyn SourceProfile,
    dry_run: bool,
    limit: Option<usize>,
) -> Result<SyncSummary> {
    let mut files = scan_attachments(&config.input)?;
    if let Some(lim) = limit {
        files.truncate(lim);
    }
    info!(profile = profile.name(), files = files.len(), "starting sync");

    if !dry_run {
        std::fs::create_dir_all(&config.output.dir).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                config.output.dir.display()
            )
        })?;
    }

    let mut summary = SyncSummary {
        fetched: files.len(),
        ..SyncSummary::default()
    };

    for file in &files {
        match sync_file(config, profile, file, dry_run) {
            Ok(Some(path)) => {
                debug!(source = %file.relative, output = %path.display(), "written");
                summary.mapped += 1;
                summary.written += 1;
            }
            Ok(None) => summary.mapped += 1,
            Err(err) => {
                warn!(source = %file.relative, "skipping: {:#}", err);
                summary.failed += 1;
            }
        }
    }

    if dry_run {
        println!("sync {} (dry-run)", profile.name());
    } else {
        println!("sync {}", profile.name());
    }
    println!("  fetched: {} files", summary.fetched);
    println!("  mapped: {}", summary.mapped);
    println!("  written: {}", summary.written);
    println!("  failed: {}", summary.failed);
    println!("ok");

    Ok(summary)
}

fn sync_file(
    config: &Config,
    profile: &dyn SourceProfile,
    file: &AttachmentFile,
    dry_run: bool,
) -> Result<Option<PathBuf>> {
    let attachment = load_attachment(file)?;
    let request = map_source(profile, attachment.document, attachment.enrichment.as_ref())?;
    if dry_run {
        return Ok(None);
    }

    let path = config
        .output
        .dir
        .join(format!("{}.json", output_stem(&request.job_id)));
    let body = if config.output.pretty {
        serde_json::to_string_pretty(&request)?
    } else {
        serde_json::to_string(&request)?
    };
    std::fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(Some(path))
}

/// File-name-safe form of a job id.
///
/// Ids that are already safe are used as they are. Any other id gets a short
/// hash of the raw id appended, so `a/b` and `a_b` land in different files.
pub fn output_stem(job_id: &str) -> String {
    let stem = job_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string();
    if !stem.is_empty() && stem == job_id {
        return stem;
    }
    let digest = format!("{:x}", Sha256::digest(job_id.as_bytes()));
    if stem.is_empty() {
        format!("job_{}", &digest[..12])
    } else {
        format!("{}_{}", stem, &digest[..12])
    }
}

/// `harvest recent`: print ids from an opportunity listing updated after `since`.
pub fn run_recent(listing: &Path, since: &str) -> Result<Vec<String>> {
    let since_date = NaiveDate::parse_from_str(since, "%Y-%m-%d")
        .with_context(|| format!("Invalid --since date '{}', expected YYYY-MM-DD", since))?;
    let Some(cutoff) = since_date.and_hms_opt(0, 0, 0) else {
        bail!("Invalid --since date '{}'", since);
    };
    let cutoff = cutoff.and_utc();

    let document = read_document(listing)?;
    let ids = updated_since(&document, cutoff);
    info!(count = ids.len(), since = %cutoff, "recent opportunities");
    for id in &ids {
        println!("{}", id);
    }
    Ok(ids)
}
