use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use media_organizer_core::{
    hash_file, run_operation, Catalog, HashScope, OperationKind, RunOptions, RunReport,
    SKIPPED_LOG, SUMMARY_LOG,
};
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, contents: &[u8]) {
    if let Some(parent) = dir.join(name).parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(dir.join(name), contents).expect("write");
}

fn set_mtime(path: &Path, unix_secs: u64) {
    let file = fs::File::options().write(true).open(path).expect("open");
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(unix_secs))
        .expect("set mtime");
}

fn assert_accounting(report: &RunReport) {
    assert_eq!(
        report.processed_count + report.skipped_count,
        report.total_files,
        "every visited file must be accounted for exactly once"
    );
}

#[test]
fn by_date_falls_back_to_mtime_and_writes_logs() {
    let source = TempDir::new().expect("source");
    let dest = TempDir::new().expect("dest");

    write_file(source.path(), "holiday.jpg", b"no exif here");
    // 2022-06-15 12:00:00 UTC; mid-month noon keeps the month stable in any
    // local timezone.
    set_mtime(&source.path().join("holiday.jpg"), 1_655_294_400);

    let options = RunOptions::new(
        OperationKind::OrganizeByDate,
        source.path().to_path_buf(),
        dest.path().to_path_buf(),
    );
    let report = run_operation(&options).expect("run");

    assert_accounting(&report);
    assert_eq!(report.total_files, 1);
    assert_eq!(report.processed_count, 1);
    let placed = dest.path().join("2022/06-June/holiday.jpg");
    assert!(placed.exists(), "expected {}", placed.display());
    assert!(dest.path().join(SUMMARY_LOG).exists());
    assert!(!dest.path().join(SKIPPED_LOG).exists());

    let summary = fs::read_to_string(dest.path().join(SUMMARY_LOG)).expect("summary");
    assert!(summary.contains("Files processed: 1"));
}

/// Minimal JPEG whose APP1/TIFF Exif IFD carries one `DateTimeOriginal` tag.
fn jpeg_with_original_datetime(datetime: &str) -> Vec<u8> {
    let ascii = format!("{datetime}\0");
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II\x2a\x00\x08\x00\x00\x00");
    tiff.extend_from_slice(&1_u16.to_le_bytes());
    tiff.extend_from_slice(&0x8769_u16.to_le_bytes());
    tiff.extend_from_slice(&4_u16.to_le_bytes());
    tiff.extend_from_slice(&1_u32.to_le_bytes());
    tiff.extend_from_slice(&26_u32.to_le_bytes());
    tiff.extend_from_slice(&0_u32.to_le_bytes());
    tiff.extend_from_slice(&1_u16.to_le_bytes());
    tiff.extend_from_slice(&0x9003_u16.to_le_bytes());
    tiff.extend_from_slice(&2_u16.to_le_bytes());
    tiff.extend_from_slice(&(ascii.len() as u32).to_le_bytes());
    tiff.extend_from_slice(&44_u32.to_le_bytes());
    tiff.extend_from_slice(&0_u32.to_le_bytes());
    tiff.extend_from_slice(ascii.as_bytes());

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&((tiff.len() + 8) as u16).to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

#[test]
fn by_date_prefers_embedded_capture_time_over_mtime() {
    let source = TempDir::new().expect("source");
    let dest = TempDir::new().expect("dest");

    write_file(
        source.path(),
        "tagged.jpg",
        &jpeg_with_original_datetime("2023:06:15 10:00:00"),
    );
    // Backdate the mtime to a different year; the embedded tag must win.
    set_mtime(&source.path().join("tagged.jpg"), 1_577_880_000);

    let options = RunOptions::new(
        OperationKind::OrganizeByDate,
        source.path().to_path_buf(),
        dest.path().to_path_buf(),
    );
    let report = run_operation(&options).expect("run");

    assert_accounting(&report);
    assert_eq!(report.processed_count, 1);
    let placed = dest.path().join("2023/06-June/tagged.jpg");
    assert!(placed.exists(), "expected {}", placed.display());
    assert!(!dest.path().join("2020").exists(), "mtime must not be used");
}

#[test]
fn by_type_separates_media_and_skips_the_rest() {
    let source = TempDir::new().expect("source");
    let dest = TempDir::new().expect("dest");

    write_file(source.path(), "a.jpg", b"photo");
    write_file(source.path(), "nested/b.mp4", b"video");
    write_file(source.path(), "c.pdf", b"document");

    let options = RunOptions::new(
        OperationKind::SeparateByType,
        source.path().to_path_buf(),
        dest.path().to_path_buf(),
    );
    let report = run_operation(&options).expect("run");

    assert_accounting(&report);
    assert_eq!(report.total_files, 3);
    assert_eq!(report.processed_count, 2);
    assert_eq!(report.skipped_count, 1);
    assert_eq!(report.skipped[0].reason, "unrecognized type");
    assert!(dest.path().join("Photos/a.jpg").exists());
    assert!(dest.path().join("Videos/b.mp4").exists());

    let skipped_log = fs::read_to_string(dest.path().join(SKIPPED_LOG)).expect("skip log");
    assert!(skipped_log.contains("c.pdf - unrecognized type"));
}

#[test]
fn same_base_name_from_different_directories_gets_disambiguated() {
    let source = TempDir::new().expect("source");
    let dest = TempDir::new().expect("dest");

    write_file(source.path(), "one/photo.jpg", b"first");
    write_file(source.path(), "two/photo.jpg", b"second");

    let options = RunOptions::new(
        OperationKind::SeparateByType,
        source.path().to_path_buf(),
        dest.path().to_path_buf(),
    );
    let report = run_operation(&options).expect("run");

    assert_accounting(&report);
    assert_eq!(report.processed_count, 2);
    assert!(dest.path().join("Photos/photo.jpg").exists());
    assert!(dest.path().join("Photos/photo_1.jpg").exists());

    let mut contents = vec![
        fs::read(dest.path().join("Photos/photo.jpg")).expect("read"),
        fs::read(dest.path().join("Photos/photo_1.jpg")).expect("read"),
    ];
    contents.sort();
    assert_eq!(contents, vec![b"first".to_vec(), b"second".to_vec()]);
}

#[test]
fn rerun_never_overwrites_prior_outputs() {
    let source = TempDir::new().expect("source");
    let dest = TempDir::new().expect("dest");

    write_file(source.path(), "data.bin", b"payload");

    let options = RunOptions::new(
        OperationKind::SortBySize,
        source.path().to_path_buf(),
        dest.path().to_path_buf(),
    );
    let first = run_operation(&options).expect("first run");
    let second = run_operation(&options).expect("second run");

    assert_eq!(first.processed_count, 1);
    assert_eq!(second.processed_count, 1);

    let original = dest.path().join("Below_100MB/data.bin");
    let sibling = dest.path().join("Below_100MB/data_1.bin");
    assert!(original.exists());
    assert!(sibling.exists());
    assert_eq!(
        hash_file(&original).expect("hash"),
        hash_file(&sibling).expect("hash"),
        "rerun bytes must match original bytes"
    );
}

#[test]
fn documents_operation_never_visits_non_documents() {
    let source = TempDir::new().expect("source");
    let dest = TempDir::new().expect("dest");

    write_file(source.path(), "report.pdf", b"pdf");
    write_file(source.path(), "letter.docx", b"word");
    write_file(source.path(), "photo.jpg", b"jpeg");

    let options = RunOptions::new(
        OperationKind::OrganizeDocuments,
        source.path().to_path_buf(),
        dest.path().to_path_buf(),
    );
    let report = run_operation(&options).expect("run");

    assert_accounting(&report);
    assert_eq!(report.total_files, 2, "photo.jpg must not be counted");
    assert_eq!(report.processed_count, 2);
    assert!(dest.path().join("PDF/report.pdf").exists());
    assert!(dest.path().join("Word/letter.docx").exists());
    assert!(!dest.path().join("photo.jpg").exists());
}

#[test]
fn duplicates_copies_later_copies_and_leaves_originals() {
    let source = TempDir::new().expect("source");
    let dest = TempDir::new().expect("dest");

    write_file(source.path(), "a.jpg", b"bytes-x");
    write_file(source.path(), "b.jpg", b"bytes-x");
    write_file(source.path(), "c.jpg", b"bytes-y");

    let options = RunOptions::new(
        OperationKind::FindDuplicates,
        source.path().to_path_buf(),
        dest.path().to_path_buf(),
    );
    let report = run_operation(&options).expect("run");

    assert_accounting(&report);
    assert_eq!(report.duplicate_groups.len(), 1);
    assert_eq!(report.duplicate_count(), 1);
    let group = &report.duplicate_groups[0];
    assert!(group.canonical_path.ends_with("a.jpg"));
    assert!(group.duplicate_paths[0].ends_with("b.jpg"));

    // Only the non-canonical copy lands in the duplicates folder.
    assert!(dest.path().join("b.jpg").exists());
    assert!(!dest.path().join("a.jpg").exists());
    assert!(!dest.path().join("c.jpg").exists());
    assert!(source.path().join("b.jpg").exists(), "originals untouched");
    assert_eq!(
        hash_file(&source.path().join("b.jpg")).expect("hash"),
        hash_file(&dest.path().join("b.jpg")).expect("hash")
    );
}

#[test]
fn duplicates_scope_can_cover_arbitrary_extensions() {
    let source = TempDir::new().expect("source");
    let dest = TempDir::new().expect("dest");

    write_file(source.path(), "a.log", b"same");
    write_file(source.path(), "b.log", b"same");

    let mut options = RunOptions::new(
        OperationKind::FindDuplicates,
        source.path().to_path_buf(),
        dest.path().to_path_buf(),
    );
    options.hash_scope = HashScope::Extensions(vec!["log".to_string()]);
    let report = run_operation(&options).expect("run");

    assert_eq!(report.duplicate_count(), 1);
    assert!(dest.path().join("b.log").exists());
}

#[cfg(unix)]
#[test]
fn duplicates_with_non_utf8_names_are_still_copied() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let source = TempDir::new().expect("source");
    let dest = TempDir::new().expect("dest");

    write_file(source.path(), "a.jpg", b"bytes-x");
    let odd_name = OsStr::from_bytes(b"b\xFF.jpg");
    fs::write(source.path().join(odd_name), b"bytes-x").expect("write");

    let options = RunOptions::new(
        OperationKind::FindDuplicates,
        source.path().to_path_buf(),
        dest.path().to_path_buf(),
    );
    let report = run_operation(&options).expect("run");

    assert_accounting(&report);
    assert_eq!(report.processed_count, 1, "the odd-named duplicate copies");
    assert_eq!(report.skipped_count, 0);

    let placed = dest.path().join(odd_name);
    assert!(placed.exists(), "duplicate must land under its real name");
    assert_eq!(fs::read(&placed).expect("read"), b"bytes-x");
    // The serialized report carries a lossy rendering of the same path.
    assert!(report.duplicate_groups[0].duplicate_paths[0].ends_with("b\u{FFFD}.jpg"));
}

#[test]
fn unwritable_summary_log_degrades_to_warning() {
    let source = TempDir::new().expect("source");
    let dest = TempDir::new().expect("dest");

    write_file(source.path(), "a.jpg", b"photo");
    // A directory squatting on the log name makes the write fail.
    fs::create_dir_all(dest.path().join(SUMMARY_LOG)).expect("mkdir");

    let options = RunOptions::new(
        OperationKind::SeparateByType,
        source.path().to_path_buf(),
        dest.path().to_path_buf(),
    );
    let report = run_operation(&options).expect("run completes despite log failure");

    assert_eq!(report.processed_count, 1);
    assert!(dest.path().join("Photos/a.jpg").exists());
    assert!(report
        .warnings
        .iter()
        .any(|warning| warning.contains("log write failed")));
}

#[test]
fn catalog_records_placed_media() {
    let source = TempDir::new().expect("source");
    let dest = TempDir::new().expect("dest");
    let catalog_path = dest.path().join("db/media.db");

    write_file(source.path(), "a.jpg", b"photo");
    write_file(source.path(), "b.mp4", b"video");
    write_file(source.path(), "c.txt", b"text");

    let mut options = RunOptions::new(
        OperationKind::SeparateByType,
        source.path().to_path_buf(),
        dest.path().to_path_buf(),
    );
    options.catalog_path = Some(catalog_path.clone());
    let report = run_operation(&options).expect("run");

    assert_eq!(report.processed_count, 2);
    let catalog = Catalog::open(&catalog_path).expect("open catalog");
    assert_eq!(catalog.count().expect("count"), 2);
}

#[test]
fn broken_catalog_degrades_to_warning() {
    let source = TempDir::new().expect("source");
    let dest = TempDir::new().expect("dest");

    write_file(source.path(), "a.jpg", b"photo");
    // A directory at the catalog path cannot be opened as a database.
    let catalog_path = dest.path().join("not-a-db");
    fs::create_dir_all(&catalog_path).expect("mkdir");

    let mut options = RunOptions::new(
        OperationKind::SeparateByType,
        source.path().to_path_buf(),
        dest.path().to_path_buf(),
    );
    options.catalog_path = Some(catalog_path);
    let report = run_operation(&options).expect("run succeeds without catalog");

    assert_eq!(report.processed_count, 1);
    assert!(report
        .warnings
        .iter()
        .any(|warning| warning.contains("catalog disabled")));
}

#[test]
fn invalid_source_fails_before_any_work() {
    let dest = TempDir::new().expect("dest");
    let options = RunOptions::new(
        OperationKind::SortBySize,
        dest.path().join("missing"),
        dest.path().to_path_buf(),
    );
    let err = run_operation(&options).expect_err("must fail");
    assert!(err.to_string().contains("invalid path"));
    assert!(!dest.path().join(SUMMARY_LOG).exists(), "no partial run");
}

#[test]
fn destination_that_is_a_file_is_rejected() {
    let source = TempDir::new().expect("source");
    let dest = TempDir::new().expect("dest");
    write_file(source.path(), "a.jpg", b"photo");
    let dest_file = dest.path().join("occupied");
    fs::write(&dest_file, b"x").expect("write");

    let options = RunOptions::new(
        OperationKind::SeparateByType,
        source.path().to_path_buf(),
        dest_file,
    );
    assert!(run_operation(&options).is_err());
}
