//! Plan generator for organization operations.

use super::types::*;
use crate::core::fingerprint::{fingerprint_file, Fingerprint};
use crate::core::scanner::MediaKind;
use crate::error::FingerprintError;
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeSet, HashMap};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// `<root>/<YYYY>/<YYYY-MM-DD>`
pub fn target_dir(root: &Path, date: NaiveDate) -> PathBuf {
    root.join(format!("{:04}", date.year())).join(format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        date.month(),
        date.day()
    ))
}

/// Outcome of searching for a free destination name
enum Placement {
    Free(PathBuf),
    SameContent(PathBuf),
    InPlace,
}

/// Turns records into an ordered list of moves and deletes
pub struct PlanBuilder {
    root: PathBuf,
    /// Destinations handed out to earlier moves in this plan
    claimed: HashMap<PathBuf, Fingerprint>,
    /// Fingerprints of files already on disk at candidate paths
    existing: HashMap<PathBuf, Fingerprint>,
}

impl PlanBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            claimed: HashMap::new(),
            existing: HashMap::new(),
        }
    }

    /// Build a plan from records in scan order.
    ///
    /// Existing files at candidate destinations are hashed on demand; a read
    /// failure there aborts planning.
    pub fn build(
        mut self,
        records: &[MediaFileRecord],
        visited_dirs: BTreeSet<PathBuf>,
    ) -> Result<Plan, FingerprintError> {
        let mut operations = Vec::new();
        let mut stats = PlanStats {
            files_found: records.len(),
            files_processed: records.len(),
            ..Default::default()
        };

        for record in records {
            stats.total_size_bytes += record.size;
            match record.kind {
                Some(MediaKind::Image) => stats.images += 1,
                Some(MediaKind::Raw) => stats.raw_images += 1,
                Some(MediaKind::Video) => stats.videos += 1,
                None => {}
            }

            let op = match &record.duplicate_of {
                Some(canonical) => Some(PlannedOperation::Delete {
                    source: record.path.clone(),
                    reason: format!("duplicate of {}", canonical.display()),
                }),
                None => self.place(record)?,
            };

            match op {
                Some(op) => {
                    debug!(?op, "planned");
                    match op {
                        PlannedOperation::Move { .. } => stats.moves += 1,
                        PlannedOperation::Delete { .. } => stats.deletes += 1,
                    }
                    operations.push(op);
                }
                None => stats.already_organized += 1,
            }
        }
        stats.duplicates_found = stats.deletes;

        Ok(Plan {
            id: Uuid::new_v4(),
            root: self.root,
            operations,
            visited_dirs,
            stats,
        })
    }

    fn place(&mut self, record: &MediaFileRecord) -> Result<Option<PlannedOperation>, FingerprintError> {
        let dir = target_dir(&self.root, record.captured.date());
        let Some(file_name) = record.path.file_name() else {
            return Ok(None);
        };

        if record.path == dir.join(file_name) {
            return Ok(None);
        }

        let op = match self.find_placement(&dir, file_name, record)? {
            Placement::Free(target) => {
                self.claimed
                    .insert(target.clone(), record.fingerprint.clone());
                PlannedOperation::Move {
                    source: record.path.clone(),
                    target,
                    target_dir: dir,
                }
            }
            Placement::SameContent(existing) => PlannedOperation::Delete {
                source: record.path.clone(),
                reason: format!("identical to {}", existing.display()),
            },
            Placement::InPlace => return Ok(None),
        };
        Ok(Some(op))
    }

    /// Try `name.ext`, then `name-1.ext`, `name-2.ext`, ... until a free
    /// slot or a file with the same content turns up.
    ///
    /// There is no upper bound on the suffix: a directory holding an
    /// unbounded run of same-named files with distinct content keeps this
    /// looping.
    fn find_placement(
        &mut self,
        dir: &Path,
        file_name: &OsStr,
        record: &MediaFileRecord,
    ) -> Result<Placement, FingerprintError> {
        let stem = record.path.file_stem().unwrap_or(file_name);
        let ext = record.path.extension();

        let mut n = 0u64;
        loop {
            let candidate = if n == 0 {
                dir.join(file_name)
            } else {
                dir.join(suffixed_name(stem, n, ext))
            };
            n += 1;

            if candidate == record.path {
                return Ok(Placement::InPlace);
            }
            if let Some(claimer) = self.claimed.get(&candidate) {
                if *claimer == record.fingerprint {
                    return Ok(Placement::SameContent(candidate));
                }
                continue;
            }

            match fs::symlink_metadata(&candidate) {
                Err(_) => return Ok(Placement::Free(candidate)),
                Ok(meta) if !meta.is_file() => continue,
                Ok(meta) => {
                    if self.existing_fingerprint(&candidate, meta.len())? == record.fingerprint {
                        return Ok(Placement::SameContent(candidate));
                    }
                }
            }
        }
    }

    fn existing_fingerprint(&mut self, path: &Path, size: u64) -> Result<Fingerprint, FingerprintError> {
        if let Some(fp) = self.existing.get(path) {
            return Ok(fp.clone());
        }
        let fp = fingerprint_file(path, size)?;
        self.existing.insert(path.to_path_buf(), fp.clone());
        Ok(fp)
    }
}

/// `stem-n.ext`, built on `OsStr` so non-UTF-8 names survive untouched
fn suffixed_name(stem: &OsStr, n: u64, ext: Option<&OsStr>) -> OsString {
    let mut name = stem.to_os_string();
    name.push(format!("-{n}"));
    if let Some(ext) = ext {
        name.push(".");
        name.push(ext);
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::{CaptureDate, DateSource};
    use crate::core::scanner::MediaFilter;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> CaptureDate {
        CaptureDate {
            taken: NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            source: DateSource::Exif,
        }
    }

    fn record(path: PathBuf, content: &[u8], captured: CaptureDate) -> MediaFileRecord {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        MediaFileRecord {
            fingerprint: Fingerprint::from_bytes(content),
            size: content.len() as u64,
            kind: MediaFilter::new().kind(&path),
            path,
            captured,
            duplicate_of: None,
        }
    }

    fn build(root: &Path, records: &[MediaFileRecord]) -> Plan {
        PlanBuilder::new(root)
            .build(records, BTreeSet::new())
            .unwrap()
    }

    #[test]
    fn target_dir_is_zero_padded() {
        let dir = target_dir(Path::new("/r"), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(dir, PathBuf::from("/r/2024/2024-01-05"));
    }

    #[test]
    fn identical_files_keep_first_and_delete_second() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let a = record(root.join("a.jpg"), b"same", date(2023, 6, 1));
        let mut b = record(root.join("b.jpg"), b"same", date(2023, 6, 1));
        b.duplicate_of = Some(a.path.clone());

        let plan = build(root, &[a, b]);

        assert_eq!(
            plan.operations,
            vec![
                PlannedOperation::Move {
                    source: root.join("a.jpg"),
                    target: root.join("2023/2023-06-01/a.jpg"),
                    target_dir: root.join("2023/2023-06-01"),
                },
                PlannedOperation::Delete {
                    source: root.join("b.jpg"),
                    reason: format!("duplicate of {}", root.join("a.jpg").display()),
                },
            ]
        );
        assert_eq!(plan.stats.duplicates_found, 1);
    }

    #[test]
    fn fallback_date_drives_destination() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let captured = CaptureDate {
            source: DateSource::Modified,
            ..date(2022, 1, 15)
        };
        let r = record(root.join("scan.png"), b"x", captured);

        let plan = build(root, &[r]);

        match &plan.operations[0] {
            PlannedOperation::Move { target, .. } => {
                assert_eq!(target, &root.join("2022/2022-01-15/scan.png"));
            }
            other => panic!("expected move, got {other:?}"),
        }
    }

    #[test]
    fn existing_different_file_gets_suffix() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let dest = root.join("2023/2023-06-01");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("photo.jpg"), b"someone else").unwrap();

        let r = record(root.join("in/photo.jpg"), b"mine", date(2023, 6, 1));
        let plan = build(root, &[r]);

        match &plan.operations[0] {
            PlannedOperation::Move { target, .. } => {
                assert_eq!(target, &dest.join("photo-1.jpg"));
            }
            other => panic!("expected move, got {other:?}"),
        }
    }

    #[test]
    fn existing_identical_file_turns_move_into_delete() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let dest = root.join("2023/2023-06-01");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("photo.jpg"), b"other").unwrap();
        fs::write(dest.join("photo-1.jpg"), b"mine").unwrap();

        let r = record(root.join("in/photo.jpg"), b"mine", date(2023, 6, 1));
        let plan = build(root, &[r]);

        assert_eq!(
            plan.operations,
            vec![PlannedOperation::Delete {
                source: root.join("in/photo.jpg"),
                reason: format!("identical to {}", dest.join("photo-1.jpg").display()),
            }]
        );
    }

    #[test]
    fn same_names_in_one_plan_never_share_a_destination() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let records: Vec<_> = (0..4)
            .map(|i| {
                record(
                    root.join(format!("dir{i}/IMG_0001.JPG")),
                    format!("content {i}").as_bytes(),
                    date(2023, 6, 1),
                )
            })
            .collect();

        let plan = build(root, &records);

        let targets: Vec<_> = plan
            .operations
            .iter()
            .filter_map(|op| match op {
                PlannedOperation::Move { target, .. } => Some(target.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(targets.len(), 4);
        assert_eq!(targets.iter().collect::<HashSet<_>>().len(), 4);
        assert!(targets.contains(&root.join("2023/2023-06-01/IMG_0001-3.JPG")));
    }

    #[test]
    fn file_at_first_candidate_needs_nothing() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let r = record(root.join("2023/2023-06-01/a.jpg"), b"a", date(2023, 6, 1));

        let plan = build(root, &[r]);

        assert!(plan.is_empty());
        assert_eq!(plan.stats.already_organized, 1);
    }

    #[test]
    fn file_without_extension_gets_plain_suffix() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let dest = root.join("2023/2023-06-01");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("clip"), b"other").unwrap();

        let r = record(root.join("in/clip"), b"mine", date(2023, 6, 1));
        let plan = build(root, &[r]);

        match &plan.operations[0] {
            PlannedOperation::Move { target, .. } => assert_eq!(target, &dest.join("clip-1")),
            other => panic!("expected move, got {other:?}"),
        }
    }

    #[test]
    fn plans_get_distinct_ids() {
        let temp = TempDir::new().unwrap();
        let first = build(temp.path(), &[]);
        let second = build(temp.path(), &[]);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn stats_count_media_families() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let records = vec![
            record(root.join("in/a.jpg"), b"a", date(2023, 6, 1)),
            record(root.join("in/b.NEF"), b"b", date(2023, 6, 1)),
            record(root.join("in/c.mov"), b"c", date(2023, 6, 1)),
            record(root.join("in/d.heic"), b"d", date(2023, 6, 1)),
        ];

        let stats = build(root, &records).stats;

        assert_eq!((stats.images, stats.raw_images, stats.videos), (2, 1, 1));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_names_are_kept_byte_for_byte() {
        use std::os::unix::ffi::{OsStrExt, OsStringExt};

        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let name = OsStr::from_bytes(b"caf\xe9.jpg");
        let dest = root.join("2023/2023-06-01");

        let first = record(root.join("in").join(name), b"one", date(2023, 6, 1));
        let second = record(root.join("card").join(name), b"two", date(2023, 6, 1));
        let plan = build(root, &[first, second]);

        let targets: Vec<_> = plan
            .operations
            .iter()
            .map(|op| match op {
                PlannedOperation::Move { target, .. } => target.clone(),
                other => panic!("expected move, got {other:?}"),
            })
            .collect();
        assert_eq!(targets[0], dest.join(name));
        assert_eq!(
            targets[1].file_name().unwrap().to_os_string().into_vec(),
            b"caf\xe9-1.jpg".to_vec()
        );
    }
}
