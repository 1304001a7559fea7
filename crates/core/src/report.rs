use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::{OperationKind, RunReport};

pub const SUMMARY_LOG: &str = "summary.log";
pub const SKIPPED_LOG: &str = "skipped_files.log";

/// Human-readable run summary, printed by the CLI and written to
/// `summary.log` under the destination root.
pub fn render_summary(report: &RunReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Operation: {}\n", report.operation.label()));
    out.push_str(&format!("Run id: {}\n", report.run_id));
    out.push_str(&format!("Source: {}\n", report.source_root));
    out.push_str(&format!("Destination: {}\n", report.dest_root));
    out.push_str(&format!("Files visited: {}\n", report.total_files));
    out.push_str(&format!("Files processed: {}\n", report.processed_count));
    out.push_str(&format!("Files skipped: {}\n", report.skipped_count));
    out.push_str(&format!(
        "Total size copied: {}\n",
        human_bytes(report.total_bytes_copied)
    ));
    if report.operation == OperationKind::FindDuplicates {
        out.push_str(&format!(
            "Duplicate files found: {} (in {} group(s))\n",
            report.duplicate_count(),
            report.duplicate_groups.len()
        ));
    }
    out.push_str(&format!("Warnings: {}\n", report.warnings.len()));
    out.push_str(&format!("Elapsed: {} ms\n", report.elapsed_ms));
    out
}

/// Writes `summary.log` and, when anything was skipped, `skipped_files.log`
/// (`path - reason`, one per line) under the destination root.
pub fn write_run_logs(report: &RunReport, dest_root: &Path) -> Result<()> {
    let summary_path = dest_root.join(SUMMARY_LOG);
    fs::write(&summary_path, render_summary(report))
        .with_context(|| format!("failed to write {}", summary_path.display()))?;

    if !report.skipped.is_empty() {
        let mut lines = String::new();
        for item in &report.skipped {
            lines.push_str(&format!("{} - {}\n", item.path, item.reason));
        }
        let skipped_path = dest_root.join(SKIPPED_LOG);
        fs::write(&skipped_path, lines)
            .with_context(|| format!("failed to write {}", skipped_path.display()))?;
    }
    Ok(())
}

pub fn human_bytes(value: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if value == 0 {
        return "0 B".to_string();
    }
    let mut size = value as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", UNITS[unit])
}
