//! # Metadata Module
//!
//! Resolves the capture date used to bucket a file.
//!
//! ## Resolution Order
//! 1. `DateTimeOriginal` from embedded EXIF/TIFF metadata
//! 2. Filesystem creation time
//! 3. Filesystem modification time
//!
//! Metadata that cannot be parsed is never an error; only failing to stat
//! the file is.

mod exif;

pub use exif::parse_capture_date;

use crate::error::PlanError;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::SystemTime;
use tracing::trace;

/// Where a capture date came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateSource {
    Exif,
    Created,
    Modified,
}

/// Resolved capture timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureDate {
    /// Full timestamp, in local time for filesystem fallbacks
    pub taken: NaiveDateTime,
    pub source: DateSource,
}

impl CaptureDate {
    /// Day used for bucketing
    pub fn date(&self) -> NaiveDate {
        self.taken.date()
    }
}

/// Resolve the capture date of `path` whose content is already in `bytes`.
pub fn resolve_capture_date(path: &Path, bytes: &[u8]) -> Result<CaptureDate, PlanError> {
    if let Some(taken) = parse_capture_date(bytes) {
        return Ok(CaptureDate {
            taken,
            source: DateSource::Exif,
        });
    }
    trace!(path = %path.display(), "no embedded capture date, using file times");

    let metadata = fs::metadata(path).map_err(|source| PlanError::Metadata {
        path: path.to_path_buf(),
        source,
    })?;
    let modified = metadata.modified().map_err(|source| PlanError::Metadata {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(fallback_date(metadata.created().ok(), modified))
}

/// Creation time when the platform records one, otherwise modification time.
pub fn fallback_date(created: Option<SystemTime>, modified: SystemTime) -> CaptureDate {
    let (time, source) = match created {
        Some(created) => (created, DateSource::Created),
        None => (modified, DateSource::Modified),
    };
    let local: DateTime<Local> = time.into();

    CaptureDate {
        taken: local.naive_local(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn local_time(y: i32, m: u32, d: u32) -> SystemTime {
        Local
            .with_ymd_and_hms(y, m, d, 12, 0, 0)
            .single()
            .unwrap()
            .into()
    }

    #[test]
    fn fallback_prefers_creation_time() {
        let date = fallback_date(Some(local_time(2021, 3, 4)), local_time(2022, 1, 15));
        assert_eq!(date.source, DateSource::Created);
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(2021, 3, 4).unwrap());
    }

    #[test]
    fn fallback_uses_modification_time_without_creation_time() {
        let date = fallback_date(None, local_time(2022, 1, 15));
        assert_eq!(date.source, DateSource::Modified);
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(2022, 1, 15).unwrap());
    }

    #[test]
    fn unparseable_content_falls_back_to_file_times() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"not really a jpeg").unwrap();

        let date = resolve_capture_date(file.path(), b"not really a jpeg").unwrap();
        assert_ne!(date.source, DateSource::Exif);
    }

    #[test]
    fn missing_file_without_metadata_is_an_error() {
        let result = resolve_capture_date(Path::new("/nonexistent/file.jpg"), b"");
        assert!(matches!(result, Err(PlanError::Metadata { .. })));
    }

    #[test]
    fn embedded_date_wins_without_touching_the_filesystem() {
        let mut tiff = b"II".to_vec();
        tiff.extend_from_slice(&42u16.to_le_bytes());
        tiff.extend_from_slice(&8u32.to_le_bytes());
        tiff.extend_from_slice(&1u16.to_le_bytes());
        tiff.extend_from_slice(&0x9003u16.to_le_bytes());
        tiff.extend_from_slice(&2u16.to_le_bytes());
        tiff.extend_from_slice(&20u32.to_le_bytes());
        tiff.extend_from_slice(&26u32.to_le_bytes());
        tiff.extend_from_slice(&0u32.to_le_bytes());
        tiff.extend_from_slice(b"2019:12:31 23:59:59\0");

        let date = resolve_capture_date(Path::new("/nonexistent/file.tif"), &tiff).unwrap();
        assert_eq!(date.source, DateSource::Exif);
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(2019, 12, 31).unwrap());
    }
}
