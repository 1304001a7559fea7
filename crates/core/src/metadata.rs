use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process::Command;

use chrono::{DateTime, NaiveDateTime};
use exif::{In, Reader, Tag, Value};
use tracing::debug;

use crate::classify::{is_image_file, is_video_file};

const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Best-effort capture time for a media file.
///
/// Images are read for an embedded `DateTimeOriginal` tag; videos are probed
/// with an external `ffprobe` for their `creation_time` tag. Every decode or
/// parse failure, including a missing ffprobe binary, degrades to `None`. The
/// filesystem-mtime fallback belongs to the caller, keeping this a pure
/// metadata reader.
pub fn extract_capture_time(path: &Path) -> Option<NaiveDateTime> {
    if is_image_file(path) {
        exif_capture_time(path)
    } else if is_video_file(path) {
        ffprobe_creation_time(path)
    } else {
        None
    }
}

fn exif_capture_time(path: &Path) -> Option<NaiveDateTime> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = Reader::new().read_from_container(&mut reader).ok()?;
    let field = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY)?;

    let raw = match &field.value {
        Value::Ascii(items) => items
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())?,
        _ => return None,
    };
    NaiveDateTime::parse_from_str(raw.trim(), EXIF_DATETIME_FORMAT).ok()
}

fn ffprobe_creation_time(path: &Path) -> Option<NaiveDateTime> {
    let value = ffprobe_format_entry(path, "format_tags=creation_time")?;
    let raw = value
        .get("format")?
        .get("tags")?
        .get("creation_time")?
        .as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|taken| taken.naive_utc())
}

/// Video duration in seconds, for the optional catalog record.
pub fn video_duration_secs(path: &Path) -> Option<f64> {
    let value = ffprobe_format_entry(path, "format=duration")?;
    value
        .get("format")?
        .get("duration")?
        .as_str()?
        .parse::<f64>()
        .ok()
}

fn ffprobe_format_entry(path: &Path, entries: &str) -> Option<serde_json::Value> {
    let output = Command::new("ffprobe")
        .arg("-v")
        .arg("quiet")
        .arg("-print_format")
        .arg("json")
        .arg("-show_entries")
        .arg(entries)
        .arg(path)
        .output();

    let output = match output {
        Ok(output) => output,
        Err(err) => {
            debug!("ffprobe unavailable for {}: {}", path.display(), err);
            return None;
        }
    };
    if !output.status.success() {
        return None;
    }
    serde_json::from_slice(&output.stdout).ok()
}

/// Pixel dimensions read from the image header, as `WxH`.
pub fn image_resolution(path: &Path) -> Option<String> {
    image::image_dimensions(path)
        .ok()
        .map(|(width, height)| format!("{width}x{height}"))
}
