use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::model::{PlacementResult, PlacementStatus};

/// Copies `source` into `dest_dir` without ever overwriting existing data.
///
/// The destination directory is created if absent. If the source's base name
/// is taken, a numeric disambiguator is appended before the extension
/// (`name_1.ext`, `name_2.ext`, ...) until an unused name is found. The copy
/// is written to a temporary sibling and renamed into place, so a failed copy
/// never leaves a truncated file at the final name. The source file is never
/// modified. Any I/O failure is reported as a skip, not an error; placement
/// failures must not abort the surrounding run.
///
/// The check-then-create sequence is not atomic across concurrent writers to
/// the same directory; runs are single-process by design.
pub fn place(source: &Path, dest_dir: &Path) -> PlacementResult {
    let skipped = |reason: String| PlacementResult {
        source_path: source.to_path_buf(),
        status: PlacementStatus::Skipped(reason),
        bytes: 0,
    };

    if let Err(err) = fs::create_dir_all(dest_dir) {
        return skipped(format!(
            "failed to create directory {}: {}",
            dest_dir.display(),
            err
        ));
    }

    let Some(file_name) = source.file_name() else {
        return skipped("source path has no file name".to_string());
    };
    let dest = next_available_path(dest_dir, file_name);

    match copy_with_times(source, &dest) {
        Ok(bytes) => {
            debug!("copied {} -> {}", source.display(), dest.display());
            PlacementResult {
                source_path: source.to_path_buf(),
                status: PlacementStatus::Copied(dest),
                bytes,
            }
        }
        Err(err) => skipped(format!("copy to {} failed: {}", dest.display(), err)),
    }
}

/// First unused destination path for `file_name` inside `dest_dir`.
fn next_available_path(dest_dir: &Path, file_name: &OsStr) -> PathBuf {
    let initial = dest_dir.join(file_name);
    if !initial.exists() {
        return initial;
    }

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string_lossy().into_owned());
    let extension = name.extension().map(|ext| ext.to_string_lossy().into_owned());

    for counter in 1_u64.. {
        let candidate_name = match &extension {
            Some(ext) => format!("{stem}_{counter}.{ext}"),
            None => format!("{stem}_{counter}"),
        };
        let candidate = dest_dir.join(candidate_name);
        if !candidate.exists() {
            return candidate;
        }
    }
    unreachable!("u64 disambiguator space exhausted");
}

/// Copies bytes to a temporary sibling, carries over the source modification
/// time, then renames onto the final path.
fn copy_with_times(source: &Path, dest: &Path) -> io::Result<u64> {
    let parent = dest
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "destination has no parent"))?;
    let dest_name = dest
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "destination has no name"))?;
    let staging = parent.join(format!(".{}.partial", dest_name.to_string_lossy()));

    let bytes = match fs::copy(source, &staging) {
        Ok(bytes) => bytes,
        Err(err) => {
            let _ = fs::remove_file(&staging);
            return Err(err);
        }
    };

    if let Ok(modified) = fs::metadata(source).and_then(|meta| meta.modified()) {
        match fs::File::options().write(true).open(&staging) {
            Ok(file) => {
                if let Err(err) = file.set_modified(modified) {
                    debug!("could not carry mtime onto {}: {}", staging.display(), err);
                }
            }
            Err(err) => debug!("could not reopen {}: {}", staging.display(), err),
        }
    }

    if let Err(err) = fs::rename(&staging, dest) {
        let _ = fs::remove_file(&staging);
        return Err(err);
    }
    Ok(bytes)
}
