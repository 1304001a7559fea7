use std::path::PathBuf;

use thiserror::Error;

/// Fatal, pre-run failures. Per-file problems never surface here; they are
/// recorded as skip reasons or warnings so one bad file cannot stop a run.
#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("invalid path: {} is not an existing, readable directory", .0.display())]
    InvalidPath(PathBuf),

    #[error("failed to create destination root {}: {source}", .path.display())]
    CreateDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
