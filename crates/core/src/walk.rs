use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::error::OrganizeError;
use crate::model::FileRecord;

#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    pub excludes: Vec<String>,
    pub max_depth: Option<usize>,
}

/// Enumerates every regular file under `root` recursively.
///
/// Symbolic links are not followed, which also guards against symlink cycles.
/// Sibling order is sorted by file name so canonical selection in duplicate
/// grouping is stable across platforms. Per-entry walk or metadata errors are
/// pushed onto `warnings` and never abort the enumeration; only a missing or
/// non-directory root is fatal.
pub fn walk_files(
    root: &Path,
    options: &WalkOptions,
    warnings: &mut Vec<String>,
) -> Result<Vec<FileRecord>, OrganizeError> {
    if !root.is_dir() {
        return Err(OrganizeError::InvalidPath(root.to_path_buf()));
    }

    let excludes = ExcludeMatcher::new(&options.excludes, warnings);
    let mut walker = WalkDir::new(root).follow_links(false).sort_by_file_name();
    if let Some(depth) = options.max_depth {
        walker = walker.max_depth(depth);
    }
    let iter = walker.into_iter().filter_entry(|entry| {
        if entry.depth() == 0 {
            return true;
        }
        !excludes.is_excluded(entry.path())
    });

    let mut files = Vec::new();
    for item in iter {
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                warnings.push(format!("walk error under {}: {}", root.display(), err));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        match FileRecord::from_path(entry.path().to_path_buf()) {
            Ok(record) => files.push(record),
            Err(err) => warnings.push(format!(
                "metadata read failed for {}: {:#}",
                entry.path().display(),
                err
            )),
        }
    }

    Ok(files)
}

struct ExcludeMatcher {
    globset: Option<GlobSet>,
    substrings: Vec<String>,
}

impl ExcludeMatcher {
    fn new(patterns: &[String], warnings: &mut Vec<String>) -> Self {
        if patterns.is_empty() {
            return Self {
                globset: None,
                substrings: Vec::new(),
            };
        }

        let mut builder = GlobSetBuilder::new();
        let mut substrings = Vec::new();
        for pattern in patterns {
            let pattern = pattern.trim();
            if pattern.is_empty() {
                continue;
            }

            if is_plain_substring_pattern(pattern) {
                substrings.push(pattern.to_lowercase());
                continue;
            }

            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(err) => {
                    warnings.push(format!(
                        "invalid exclude glob '{pattern}': {err}; using substring fallback."
                    ));
                    substrings.push(pattern.to_lowercase());
                }
            }
        }

        let globset = match builder.build() {
            Ok(set) => Some(set),
            Err(err) => {
                warnings.push(format!(
                    "failed to compile exclude glob set: {err}; glob excludes disabled."
                ));
                None
            }
        };

        Self {
            globset,
            substrings,
        }
    }

    fn is_excluded(&self, path: &Path) -> bool {
        if let Some(globset) = &self.globset {
            if globset.is_match(path) {
                return true;
            }
        }

        if self.substrings.is_empty() {
            return false;
        }

        let lowered = path.to_string_lossy().to_lowercase();
        self.substrings
            .iter()
            .any(|pattern| lowered.contains(pattern))
    }
}

fn is_plain_substring_pattern(pattern: &str) -> bool {
    !pattern
        .chars()
        .any(|ch| matches!(ch, '*' | '?' | '[' | ']' | '{' | '}'))
}
