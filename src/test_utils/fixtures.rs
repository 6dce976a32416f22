//! Builders for releases and artifacts used across tests.

use crate::source::{Artifact, Release};
use chrono::{DateTime, TimeZone, Utc};
use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Noon UTC on the given day of January 2024.
pub fn day(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).single().unwrap_or_else(|| panic!("invalid day {day}"))
}

/// A release published on `day` of January 2024.
pub fn release(tag: &str, published_day: u32) -> Release {
    Release::new(tag, Some(day(published_day)))
}

/// A single-file artifact.
pub fn js_artifact(filename: &str, content: &str) -> Artifact {
    Artifact {
        filename: filename.to_string(),
        bytes: content.as_bytes().to_vec(),
    }
}

/// A zip artifact holding `files`.
pub fn zip_artifact(filename: &str, files: &[(&str, &str)]) -> Artifact {
    Artifact {
        filename: filename.to_string(),
        bytes: zip_archive(files),
    }
}

/// Build an in-memory zip archive from `(path, content)` pairs.
///
/// Paths ending in `/` become directory entries.
pub fn zip_archive(files: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for (path, content) in files {
        if path.ends_with('/') {
            writer.add_directory(*path, options).unwrap_or_else(|e| panic!("zip dir {path}: {e}"));
        } else {
            writer.start_file(*path, options).unwrap_or_else(|e| panic!("zip file {path}: {e}"));
            writer.write_all(content.as_bytes()).unwrap_or_else(|e| panic!("zip write {path}: {e}"));
        }
    }

    writer.finish().unwrap_or_else(|e| panic!("zip finish: {e}")).into_inner()
}
