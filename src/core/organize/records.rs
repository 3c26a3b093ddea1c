//! Reads each scanned file once to date and fingerprint it.

use super::types::MediaFileRecord;
use crate::core::fingerprint::{Fingerprint, FingerprintIndex};
use crate::core::metadata::resolve_capture_date;
use crate::core::scanner::MediaFilter;
use crate::error::{FingerprintError, OrganizeError};
use crate::events::{Event, EventSender, PlanEvent, PlanProgress};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Build records in scan order, marking later copies of the same content
/// as duplicates of the first one.
pub fn collect_records(
    files: &[PathBuf],
    events: &EventSender,
) -> Result<Vec<MediaFileRecord>, OrganizeError> {
    let filter = MediaFilter::new();
    let mut index = FingerprintIndex::new();
    let mut records = Vec::with_capacity(files.len());
    let mut progress = PlanProgress {
        files_found: files.len(),
        ..Default::default()
    };

    for path in files {
        let bytes = fs::read(path).map_err(|source| FingerprintError::Read {
            path: path.clone(),
            source,
        })?;
        let fingerprint = Fingerprint::from_bytes(&bytes);
        let captured = resolve_capture_date(path, &bytes)?;
        let duplicate_of = index.observe(&fingerprint, path);

        if let Some(canonical) = &duplicate_of {
            debug!(
                path = %path.display(),
                canonical = %canonical.display(),
                fingerprint = %fingerprint,
                "duplicate content"
            );
            progress.duplicates_found += 1;
        }
        progress.files_processed += 1;
        events.send(Event::Plan(PlanEvent::Progress(progress)));

        records.push(MediaFileRecord {
            path: path.clone(),
            size: fingerprint.size,
            kind: filter.kind(path),
            captured,
            fingerprint,
            duplicate_of,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{null_sender, EventChannel};
    use tempfile::TempDir;

    #[test]
    fn later_copies_point_at_first_seen_file() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.jpg");
        let b = temp.path().join("b.jpg");
        let c = temp.path().join("c.jpg");
        fs::write(&a, b"same").unwrap();
        fs::write(&b, b"different").unwrap();
        fs::write(&c, b"same").unwrap();

        let records = collect_records(&[a.clone(), b, c], &null_sender()).unwrap();

        assert_eq!(records.len(), 3);
        assert!(!records[0].is_duplicate());
        assert!(!records[1].is_duplicate());
        assert_eq!(records[2].duplicate_of, Some(a));
        assert_eq!(records[2].size, 4);
    }

    #[test]
    fn progress_counts_duplicates() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.jpg");
        let b = temp.path().join("b.jpg");
        fs::write(&a, b"same").unwrap();
        fs::write(&b, b"same").unwrap();

        let (sender, receiver) = EventChannel::new();
        collect_records(&[a, b], &sender).unwrap();

        let last = receiver
            .drain()
            .into_iter()
            .filter_map(|e| match e {
                Event::Plan(PlanEvent::Progress(p)) => Some(p),
                _ => None,
            })
            .last()
            .unwrap();
        assert_eq!(
            last,
            PlanProgress {
                files_found: 2,
                files_processed: 2,
                duplicates_found: 1,
            }
        );
    }

    #[test]
    fn vanished_file_aborts_collection() {
        let result = collect_records(&[PathBuf::from("/nonexistent/x.jpg")], &null_sender());
        assert!(matches!(result, Err(OrganizeError::Fingerprint(_))));
    }
}
