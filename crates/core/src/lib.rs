pub mod catalog;
pub mod classify;
pub mod dedupe;
pub mod error;
pub mod metadata;
pub mod model;
pub mod organize;
pub mod place;
pub mod report;
pub mod walk;

pub use catalog::{Catalog, CatalogEntry};
pub use classify::{
    date_subpath, document_category, is_image_file, is_video_file, size_bucket, Classification,
    ClassifyStrategy, DateGranularity, DateStrategy, DocumentStrategy, MediaTypeStrategy,
    SizeStrategy,
};
pub use dedupe::{find_duplicate_groups, hash_file, HashScope};
pub use error::OrganizeError;
pub use metadata::{extract_capture_time, image_resolution, video_duration_secs};
pub use model::{
    DuplicateGroup, DuplicateGroupEntry, FileRecord, OperationKind, PlacementKey, PlacementResult,
    PlacementStatus, RunReport, SkippedFile, REPORT_VERSION,
};
pub use organize::{run_operation, RunOptions};
pub use place::place;
pub use report::{human_bytes, render_summary, write_run_logs, SKIPPED_LOG, SUMMARY_LOG};
pub use walk::{walk_files, WalkOptions};
