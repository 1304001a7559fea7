use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::{Catalog, CatalogEntry};
use crate::classify::{
    is_image_file, is_video_file, Classification, ClassifyStrategy, DateGranularity, DateStrategy,
    DocumentStrategy, MediaTypeStrategy, SizeStrategy,
};
use crate::dedupe::{find_duplicate_groups, HashScope};
use crate::error::OrganizeError;
use crate::metadata::{extract_capture_time, image_resolution, video_duration_secs};
use crate::model::{
    DuplicateGroup, FileRecord, OperationKind, PlacementKey, PlacementStatus, RunReport,
    SkippedFile, REPORT_VERSION,
};
use crate::place::place;
use crate::report::write_run_logs;
use crate::walk::{walk_files, WalkOptions};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub operation: OperationKind,
    pub source: PathBuf,
    pub dest: PathBuf,
    pub granularity: DateGranularity,
    pub walk: WalkOptions,
    pub hash_scope: HashScope,
    pub catalog_path: Option<PathBuf>,
    pub write_logs: bool,
}

impl RunOptions {
    pub fn new(operation: OperationKind, source: PathBuf, dest: PathBuf) -> Self {
        Self {
            operation,
            source,
            dest,
            granularity: DateGranularity::default(),
            walk: WalkOptions::default(),
            hash_scope: HashScope::default(),
            catalog_path: None,
            write_logs: true,
        }
    }
}

/// Drives one operation over the source tree: walk, classify, place,
/// accumulate, report.
///
/// Only directory-level preconditions are fatal. Every per-file failure is
/// recorded in the report and never stops the processing of later files.
pub fn run_operation(options: &RunOptions) -> Result<RunReport> {
    if !options.source.is_dir() {
        return Err(OrganizeError::InvalidPath(options.source.clone()).into());
    }
    if options.dest.exists() && !options.dest.is_dir() {
        return Err(OrganizeError::InvalidPath(options.dest.clone()).into());
    }
    std::fs::create_dir_all(&options.dest).map_err(|source| OrganizeError::CreateDestination {
        path: options.dest.clone(),
        source,
    })?;

    let started = Instant::now();
    let mut report = RunReport {
        report_version: REPORT_VERSION.to_string(),
        run_id: Uuid::new_v4().to_string(),
        operation: options.operation,
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        source_root: options.source.to_string_lossy().to_string(),
        dest_root: options.dest.to_string_lossy().to_string(),
        total_files: 0,
        processed_count: 0,
        skipped_count: 0,
        total_bytes_copied: 0,
        skipped: Vec::new(),
        duplicate_groups: Vec::new(),
        warnings: Vec::new(),
        elapsed_ms: 0,
    };

    let records = walk_files(&options.source, &options.walk, &mut report.warnings)?;
    info!(
        operation = options.operation.label(),
        files = records.len(),
        "walk complete"
    );

    let mut catalog = open_catalog(options, &mut report.warnings);

    match options.operation {
        OperationKind::FindDuplicates => {
            run_duplicates(options, &records, &mut report, catalog.as_mut())
        }
        OperationKind::OrganizeByDate => {
            let strategy = DateStrategy {
                granularity: options.granularity,
            };
            run_strategy(options, &strategy, &records, &mut report, catalog.as_mut());
        }
        OperationKind::SeparateByType => {
            run_strategy(
                options,
                &MediaTypeStrategy,
                &records,
                &mut report,
                catalog.as_mut(),
            );
        }
        OperationKind::OrganizeDocuments => {
            run_strategy(
                options,
                &DocumentStrategy,
                &records,
                &mut report,
                catalog.as_mut(),
            );
        }
        OperationKind::SortBySize => {
            run_strategy(
                options,
                &SizeStrategy,
                &records,
                &mut report,
                catalog.as_mut(),
            );
        }
    }

    report.elapsed_ms = started.elapsed().as_millis().try_into().unwrap_or(u64::MAX);
    info!(
        processed = report.processed_count,
        skipped = report.skipped_count,
        bytes = report.total_bytes_copied,
        "run complete"
    );

    // The run itself already completed; a failed log write must not undo it.
    if options.write_logs {
        if let Err(err) = write_run_logs(&report, &options.dest) {
            warn!("log write failed: {:#}", err);
            report.warnings.push(format!("log write failed: {err:#}"));
        }
    }
    Ok(report)
}

/// The generic per-file loop shared by all placement operations.
fn run_strategy(
    options: &RunOptions,
    strategy: &dyn ClassifyStrategy,
    records: &[FileRecord],
    report: &mut RunReport,
    mut catalog: Option<&mut Catalog>,
) {
    for record in records {
        match strategy.classify(record) {
            Classification::Ignore => continue,
            Classification::Skip { reason } => {
                report.total_files += 1;
                record_skip(report, &record.path, reason);
            }
            Classification::Place { key, subpath } => {
                report.total_files += 1;
                debug!(path = %record.path.display(), ?key, "classified");

                let dest_dir = options.dest.join(&subpath);
                let result = place(&record.path, &dest_dir);
                match result.status {
                    PlacementStatus::Copied(dest) => {
                        report.processed_count += 1;
                        report.total_bytes_copied += result.bytes;
                        if let Some(catalog) = catalog.as_deref_mut() {
                            append_catalog_entry(catalog, record, &dest, &mut report.warnings);
                        }
                    }
                    PlacementStatus::Skipped(reason) => {
                        record_skip(report, &record.path, reason);
                    }
                }
            }
        }
    }
}

/// Groups candidates by content hash and copies every non-canonical member
/// into the destination, leaving originals untouched. Unique and canonical
/// files are never visited for placement, so they do not enter the totals.
fn run_duplicates(
    options: &RunOptions,
    records: &[FileRecord],
    report: &mut RunReport,
    mut catalog: Option<&mut Catalog>,
) {
    let groups = find_duplicate_groups(records, &options.hash_scope, &mut report.warnings);
    info!(groups = groups.len(), "duplicate grouping complete");

    for group in &groups {
        let key = PlacementKey::ContentHash {
            digest: group.digest.clone(),
        };
        for duplicate in &group.duplicate_paths {
            report.total_files += 1;
            debug!(path = %duplicate.display(), ?key, "classified");
            let result = place(duplicate, &options.dest);
            match result.status {
                PlacementStatus::Copied(dest) => {
                    report.processed_count += 1;
                    report.total_bytes_copied += result.bytes;
                    if let Some(catalog) = catalog.as_deref_mut() {
                        if let Ok(record) = FileRecord::from_path(duplicate.clone()) {
                            append_catalog_entry(catalog, &record, &dest, &mut report.warnings);
                        }
                    }
                }
                PlacementStatus::Skipped(reason) => {
                    record_skip(report, duplicate, reason);
                }
            }
        }
    }

    report.duplicate_groups = groups
        .iter()
        .map(DuplicateGroup::to_report_entry)
        .collect();
}

fn record_skip(report: &mut RunReport, path: &Path, reason: String) {
    report.skipped_count += 1;
    report.skipped.push(SkippedFile {
        path: path.to_string_lossy().to_string(),
        reason,
    });
}

fn open_catalog(options: &RunOptions, warnings: &mut Vec<String>) -> Option<Catalog> {
    let path = options.catalog_path.as_ref()?;
    match Catalog::open(path) {
        Ok(catalog) => Some(catalog),
        Err(err) => {
            warn!("catalog disabled: {:#}", err);
            warnings.push(format!("catalog disabled: {err:#}"));
            None
        }
    }
}

/// Catalog appends are a secondary side effect; failures become warnings.
fn append_catalog_entry(
    catalog: &mut Catalog,
    record: &FileRecord,
    dest: &Path,
    warnings: &mut Vec<String>,
) {
    let media_type = if is_image_file(&record.path) {
        "photo"
    } else if is_video_file(&record.path) {
        "video"
    } else {
        return;
    };

    let date_taken = extract_capture_time(&record.path)
        .or(record.modified)
        .map(|taken| taken.format("%Y-%m-%d %H:%M:%S").to_string());
    let entry = CatalogEntry {
        filename: record
            .path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default(),
        filepath: dest.to_string_lossy().to_string(),
        media_type,
        date_taken,
        duration_secs: (media_type == "video")
            .then(|| video_duration_secs(&record.path))
            .flatten(),
        resolution: (media_type == "photo")
            .then(|| image_resolution(&record.path))
            .flatten(),
    };

    if let Err(err) = catalog.append(&entry) {
        warnings.push(format!("catalog append failed: {err:#}"));
    }
}
