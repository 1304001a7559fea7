use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDateTime};

use crate::metadata::extract_capture_time;
use crate::model::{FileRecord, PlacementKey};

pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "heic", "webp", "tiff", "bmp", "gif",
];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "3gp", "wmv", "webm"];

/// Document categories tried in a fixed fallthrough order; first match wins.
pub const DOCUMENT_TABLE: &[(&str, &[&str])] = &[
    ("PDF", &["pdf"]),
    ("Word", &["doc", "docx", "odt"]),
    ("Excel", &["xls", "xlsx", "ods"]),
    ("PowerPoint", &["ppt", "pptx", "odp"]),
    ("Text", &["txt", "csv"]),
];

const MB: u64 = 1024 * 1024;
const GB: u64 = 1024 * MB;

/// Ascending size buckets; lower bound inclusive, upper bound exclusive.
const SIZE_BUCKETS: &[(u64, &str)] = &[
    (100 * MB, "Below_100MB"),
    (300 * MB, "100-300MB"),
    (500 * MB, "300-500MB"),
    (GB, "500MB-1GB"),
    (2 * GB, "1-2GB"),
    (5 * GB, "2-5GB"),
];
const TOP_SIZE_BUCKET: &str = "5GB_plus";

pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

pub fn is_image_file(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

pub fn is_video_file(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

pub fn size_bucket(size_bytes: u64) -> &'static str {
    for (limit, label) in SIZE_BUCKETS {
        if size_bytes < *limit {
            return label;
        }
    }
    TOP_SIZE_BUCKET
}

pub fn document_category(path: &Path) -> Option<&'static str> {
    let ext = extension_of(path)?;
    for (category, extensions) in DOCUMENT_TABLE {
        if extensions.contains(&ext.as_str()) {
            return Some(category);
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateGranularity {
    #[default]
    YearMonth,
    YearMonthDay,
}

/// `2023-06-15 10:00:00` maps to `2023/06-June` or `2023/06-June/15-Thursday`.
pub fn date_subpath(taken: NaiveDateTime, granularity: DateGranularity) -> PathBuf {
    let mut subpath = PathBuf::from(taken.format("%Y").to_string());
    subpath.push(taken.format("%m-%B").to_string());
    if granularity == DateGranularity::YearMonthDay {
        subpath.push(taken.format("%d-%A").to_string());
    }
    subpath
}

/// Outcome of classifying one file: place it under a destination subpath,
/// count it as skipped with a reason, or leave it out of the run entirely
/// (files the active table never visits).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Place {
        key: PlacementKey,
        subpath: PathBuf,
    },
    Skip {
        reason: String,
    },
    Ignore,
}

/// Maps a walked file to its destination subpath for one operation. Pure with
/// respect to everything except reading the file's own bytes and metadata.
pub trait ClassifyStrategy {
    fn classify(&self, record: &FileRecord) -> Classification;
}

/// Buckets by embedded capture time, falling back to filesystem mtime.
pub struct DateStrategy {
    pub granularity: DateGranularity,
}

impl ClassifyStrategy for DateStrategy {
    fn classify(&self, record: &FileRecord) -> Classification {
        let taken = extract_capture_time(&record.path).or(record.modified);
        let Some(taken) = taken else {
            return Classification::Skip {
                reason: "no capture date or modification time available".to_string(),
            };
        };

        let day = match self.granularity {
            DateGranularity::YearMonth => None,
            DateGranularity::YearMonthDay => Some(taken.day()),
        };
        Classification::Place {
            key: PlacementKey::Date {
                year: taken.year(),
                month: taken.month(),
                day,
            },
            subpath: date_subpath(taken, self.granularity),
        }
    }
}

/// Splits media into `Photos/` and `Videos/`; everything else is skipped.
pub struct MediaTypeStrategy;

impl ClassifyStrategy for MediaTypeStrategy {
    fn classify(&self, record: &FileRecord) -> Classification {
        let name = if is_image_file(&record.path) {
            "Photos"
        } else if is_video_file(&record.path) {
            "Videos"
        } else {
            return Classification::Skip {
                reason: "unrecognized type".to_string(),
            };
        };
        Classification::Place {
            key: PlacementKey::TypeCategory { name },
            subpath: PathBuf::from(name),
        }
    }
}

/// Places documents by the fixed category table; non-documents are never
/// visited, so they do not appear in the run totals.
pub struct DocumentStrategy;

impl ClassifyStrategy for DocumentStrategy {
    fn classify(&self, record: &FileRecord) -> Classification {
        match document_category(&record.path) {
            Some(name) => Classification::Place {
                key: PlacementKey::TypeCategory { name },
                subpath: PathBuf::from(name),
            },
            None => Classification::Ignore,
        }
    }
}

pub struct SizeStrategy;

impl ClassifyStrategy for SizeStrategy {
    fn classify(&self, record: &FileRecord) -> Classification {
        let label = size_bucket(record.size_bytes);
        Classification::Place {
            key: PlacementKey::SizeBucket { label },
            subpath: PathBuf::from(label),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use chrono::NaiveDate;

    use super::{
        date_subpath, document_category, is_image_file, is_video_file, size_bucket,
        Classification, ClassifyStrategy, DateGranularity, DocumentStrategy, MediaTypeStrategy,
        SizeStrategy, GB, MB,
    };
    use crate::model::FileRecord;

    fn record(path: &str, size_bytes: u64) -> FileRecord {
        FileRecord {
            path: PathBuf::from(path),
            size_bytes,
            modified: None,
        }
    }

    #[test]
    fn extension_matching_is_case_insensitive() {
        assert!(is_image_file(Path::new("/a/IMG_0001.JPG")));
        assert!(is_video_file(Path::new("/a/clip.MOV")));
        assert!(!is_image_file(Path::new("/a/notes.txt")));
        assert!(!is_video_file(Path::new("/a/no_extension")));
    }

    #[test]
    fn size_buckets_are_exhaustive_and_non_overlapping() {
        assert_eq!(size_bucket(0), "Below_100MB");
        assert_eq!(size_bucket(100 * MB - 1), "Below_100MB");
        assert_eq!(size_bucket(100 * MB), "100-300MB");
        assert_eq!(size_bucket(300 * MB), "300-500MB");
        assert_eq!(size_bucket(500 * MB), "500MB-1GB");
        assert_eq!(size_bucket(GB), "1-2GB");
        assert_eq!(size_bucket(2 * GB), "2-5GB");
        assert_eq!(size_bucket(5 * GB - 1), "2-5GB");
        assert_eq!(size_bucket(5 * GB), "5GB_plus");
        assert_eq!(size_bucket(u64::MAX), "5GB_plus");
    }

    #[test]
    fn date_subpath_formats_month_and_weekday_names() {
        let taken = NaiveDate::from_ymd_opt(2023, 6, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(
            date_subpath(taken, DateGranularity::YearMonth),
            PathBuf::from("2023/06-June")
        );
        assert_eq!(
            date_subpath(taken, DateGranularity::YearMonthDay),
            PathBuf::from("2023/06-June/15-Thursday")
        );
    }

    #[test]
    fn document_table_matches_in_fallthrough_order() {
        assert_eq!(document_category(Path::new("report.pdf")), Some("PDF"));
        assert_eq!(document_category(Path::new("letter.DOCX")), Some("Word"));
        assert_eq!(document_category(Path::new("sheet.ods")), Some("Excel"));
        assert_eq!(document_category(Path::new("deck.ppt")), Some("PowerPoint"));
        assert_eq!(document_category(Path::new("data.csv")), Some("Text"));
        assert_eq!(document_category(Path::new("photo.jpg")), None);
    }

    #[test]
    fn media_strategy_skips_unrecognized_types() {
        let strategy = MediaTypeStrategy;
        assert!(matches!(
            strategy.classify(&record("/a/b.jpg", 1)),
            Classification::Place { subpath, .. } if subpath == PathBuf::from("Photos")
        ));
        assert!(matches!(
            strategy.classify(&record("/a/b.mkv", 1)),
            Classification::Place { subpath, .. } if subpath == PathBuf::from("Videos")
        ));
        assert!(matches!(
            strategy.classify(&record("/a/b.pdf", 1)),
            Classification::Skip { reason } if reason == "unrecognized type"
        ));
    }

    #[test]
    fn document_strategy_ignores_non_documents() {
        let strategy = DocumentStrategy;
        assert_eq!(
            strategy.classify(&record("/a/b.jpg", 1)),
            Classification::Ignore
        );
    }

    #[test]
    fn size_strategy_always_places() {
        let strategy = SizeStrategy;
        assert!(matches!(
            strategy.classify(&record("/a/huge.bin", 6 * GB)),
            Classification::Place { subpath, .. } if subpath == PathBuf::from("5GB_plus")
        ));
    }
}
