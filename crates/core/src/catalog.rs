use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

/// One row appended per successfully placed media file.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub filename: String,
    pub filepath: String,
    pub media_type: &'static str,
    pub date_taken: Option<String>,
    pub duration_secs: Option<f64>,
    pub resolution: Option<String>,
}

/// Best-effort relational record of placed media files.
///
/// The catalog is a secondary side effect of a run: the orchestrator emits an
/// entry after each successful media placement and converts every catalog
/// failure into a warning. A broken or unwritable catalog never fails a run.
pub struct Catalog {
    conn: Connection,
}

impl Catalog {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create catalog directory {}", parent.display())
                })?;
            }
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open catalog {}", path.display()))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS media (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT,
                filepath TEXT,
                media_type TEXT,
                date_taken TEXT,
                duration REAL,
                resolution TEXT
            )",
            [],
        )
        .context("failed to initialize catalog schema")?;
        Ok(Self { conn })
    }

    pub fn append(&self, entry: &CatalogEntry) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO media (filename, filepath, media_type, date_taken, duration, resolution)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    entry.filename,
                    entry.filepath,
                    entry.media_type,
                    entry.date_taken,
                    entry.duration_secs,
                    entry.resolution,
                ],
            )
            .with_context(|| format!("failed to catalog {}", entry.filepath))?;
        Ok(())
    }

    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM media", [], |row| row.get(0))
            .context("failed to count catalog rows")?;
        Ok(count as u64)
    }
}
