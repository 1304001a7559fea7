use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const REPORT_VERSION: &str = "1.0.0";

/// One regular file enumerated by the walker. Immutable for the duration of a run.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: Option<NaiveDateTime>,
}

impl FileRecord {
    pub fn from_path(path: PathBuf) -> Result<Self> {
        let metadata = std::fs::metadata(&path)
            .with_context(|| format!("failed to read metadata for {}", path.display()))?;
        let modified = metadata
            .modified()
            .ok()
            .map(|time| DateTime::<Local>::from(time).naive_local());
        Ok(Self {
            path,
            size_bytes: metadata.len(),
            modified,
        })
    }
}

/// The placement key derived for a file by the active classification strategy.
/// Exactly one variant is produced per file per operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementKey {
    Date {
        year: i32,
        month: u32,
        day: Option<u32>,
    },
    SizeBucket {
        label: &'static str,
    },
    TypeCategory {
        name: &'static str,
    },
    ContentHash {
        digest: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementStatus {
    Copied(PathBuf),
    Skipped(String),
}

/// Outcome of attempting to place one file at a destination directory.
#[derive(Debug, Clone)]
pub struct PlacementResult {
    pub source_path: PathBuf,
    pub status: PlacementStatus,
    pub bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    OrganizeByDate,
    SeparateByType,
    OrganizeDocuments,
    SortBySize,
    FindDuplicates,
}

impl OperationKind {
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::OrganizeByDate => "organize-by-date",
            OperationKind::SeparateByType => "separate-by-type",
            OperationKind::OrganizeDocuments => "organize-documents",
            OperationKind::SortBySize => "sort-by-size",
            OperationKind::FindDuplicates => "find-duplicates",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

/// Files sharing one content digest. The canonical member is the first file
/// observed with that digest in walk order; later files are its duplicates.
///
/// Paths are kept as `PathBuf` so placement reaches the real file even when
/// its name is not valid UTF-8; the serialized report gets a lossy display
/// form via [`DuplicateGroup::to_report_entry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub digest: String,
    pub canonical_path: PathBuf,
    pub duplicate_paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    pub fn to_report_entry(&self) -> DuplicateGroupEntry {
        DuplicateGroupEntry {
            digest: self.digest.clone(),
            canonical_path: self.canonical_path.to_string_lossy().to_string(),
            duplicate_paths: self
                .duplicate_paths
                .iter()
                .map(|path| path.to_string_lossy().to_string())
                .collect(),
        }
    }
}

/// The serialized form of a [`DuplicateGroup`] carried by the run report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DuplicateGroupEntry {
    pub digest: String,
    pub canonical_path: String,
    pub duplicate_paths: Vec<String>,
}

/// Aggregate outcome of one run. Owned and written exclusively by the
/// orchestrator; finalized once before being reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub report_version: String,
    pub run_id: String,
    pub operation: OperationKind,
    pub generated_at: String,
    pub source_root: String,
    pub dest_root: String,
    pub total_files: u64,
    pub processed_count: u64,
    pub skipped_count: u64,
    pub total_bytes_copied: u64,
    pub skipped: Vec<SkippedFile>,
    #[serde(default)]
    pub duplicate_groups: Vec<DuplicateGroupEntry>,
    pub warnings: Vec<String>,
    pub elapsed_ms: u64,
}

impl RunReport {
    /// Count of duplicate copies found (group members beyond the canonical one).
    pub fn duplicate_count(&self) -> u64 {
        self.duplicate_groups
            .iter()
            .map(|group| group.duplicate_paths.len() as u64)
            .sum()
    }
}
