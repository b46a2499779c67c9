//! Discovery of source attachments on disk.
//!
//! Walks `input.root`, keeps files matching `include_globs` and not
//! matching `exclude_globs`, and pairs each document with its optional
//! enrichment sidecar: `offer.json` → `offer.enrichment.json`. Sidecars
//! themselves are never treated as documents.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde_json::Value;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::InputConfig;
use crate::enrich::Enrichment;

pub const SIDECAR_SUFFIX: &str = ".enrichment.json";

/// A discovered source file, not yet read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFile {
    /// Path relative to the input root, `/`-separated on every platform.
    pub relative: String,
    pub path: PathBuf,
}

/// A source document with its enrichment, if any.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub file: AttachmentFile,
    pub document: Value,
    pub enrichment: Option<Enrichment>,
}

pub fn scan_attachments(config: &InputConfig) -> Result<Vec<AttachmentFile>> {
    let root = &config.root;
    if !root.exists() {
        bail!("Input root does not exist: {}", root.display());
    }

    let include_set = build_globset(&config.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        format!("**/*{}", SIDECAR_SUFFIX),
    ];
    default_excludes.extend(config.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut files = Vec::new();

    let walker = WalkDir::new(root).follow_links(config.follow_symlinks);
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().replace('\\', "/");

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }

        files.push(AttachmentFile {
            relative: rel_str,
            path: path.to_path_buf(),
        });
    }

    files.sort_by(|a, b| a.relative.cmp(&b.relative));

    Ok(files)
}

/// `dir/offer.json` → `dir/offer.enrichment.json`.
pub fn sidecar_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!("{}{}", stem, SIDECAR_SUFFIX))
}

pub fn read_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Read a document and its sidecar. A missing sidecar is not an error;
/// an unreadable one is.
pub fn load_attachment(file: &AttachmentFile) -> Result<Attachment> {
    let document = read_document(&file.path)?;

    let sidecar = sidecar_path(&file.path);
    let enrichment = if sidecar.is_file() {
        Some(Enrichment::load(&sidecar)?)
    } else {
        None
    };

    Ok(Attachment {
        file: file.clone(),
        document,
        enrichment,
    })
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
