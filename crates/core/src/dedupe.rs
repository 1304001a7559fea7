use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::debug;

use crate::classify::{extension_of, is_image_file, is_video_file};
use crate::model::{DuplicateGroup, FileRecord};

/// Which walked files are candidates for content hashing.
#[derive(Debug, Clone, Default)]
pub enum HashScope {
    /// Image and video extensions, the duplicate finder's default.
    #[default]
    MediaDefault,
    /// An explicit, case-insensitive extension list.
    Extensions(Vec<String>),
    /// Every regular file regardless of extension.
    AllFiles,
}

impl HashScope {
    fn includes(&self, path: &Path) -> bool {
        match self {
            HashScope::MediaDefault => is_image_file(path) || is_video_file(path),
            HashScope::Extensions(extensions) => extension_of(path)
                .is_some_and(|ext| extensions.iter().any(|item| item.eq_ignore_ascii_case(&ext))),
            HashScope::AllFiles => true,
        }
    }
}

/// Groups candidate files by whole-file content digest.
///
/// Digests are computed in parallel, but grouping walks the records in their
/// original order so the canonical member of each group is the first file
/// observed with that digest. Hash failures become warnings; they never abort
/// the grouping. Only groups with at least one duplicate are returned.
pub fn find_duplicate_groups(
    records: &[FileRecord],
    scope: &HashScope,
    warnings: &mut Vec<String>,
) -> Vec<DuplicateGroup> {
    let candidates: Vec<&FileRecord> = records
        .iter()
        .filter(|record| scope.includes(&record.path))
        .collect();
    debug!(
        candidates = candidates.len(),
        total = records.len(),
        "hashing duplicate candidates"
    );

    let digests: Vec<Result<String, String>> = candidates
        .par_iter()
        .map(|record| {
            hash_file(&record.path).map_err(|err| {
                format!("hash skipped for {}: {:#}", record.path.display(), err)
            })
        })
        .collect();

    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup> = Vec::new();
    for (record, digest) in candidates.iter().zip(digests) {
        let digest = match digest {
            Ok(digest) => digest,
            Err(warning) => {
                warnings.push(warning);
                continue;
            }
        };

        match group_index.get(&digest) {
            Some(&index) => groups[index].duplicate_paths.push(record.path.clone()),
            None => {
                group_index.insert(digest.clone(), groups.len());
                groups.push(DuplicateGroup {
                    digest,
                    canonical_path: record.path.clone(),
                    duplicate_paths: Vec::new(),
                });
            }
        }
    }

    groups.retain(|group| !group.duplicate_paths.is_empty());
    groups
}

/// Streaming BLAKE3 digest of a file's bytes.
pub fn hash_file(path: &Path) -> Result<String> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0_u8; 64 * 1024];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}
