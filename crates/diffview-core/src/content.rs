use std::path::{Path, PathBuf};

use diffview_git::GitRepo;
use tracing::trace;

use crate::error::EngineError;
use crate::types::{ChangeRecord, MaterializedChange};

/// Largest content handed to the viewer unchanged (256 KiB)
pub const MAX_DISPLAY_SIZE: usize = 256 * 1024;

/// How many leading bytes are inspected for binary content
const BINARY_SNIFF_LEN: usize = 512;

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "tiff", "tif", "webp", "ico",
];

/// Control characters that do not occur in text. TAB, LF, VT, FF, CR and ESC
/// are allowed, as are DEL and every byte >= 0x80.
static BINARY_BYTES: [bool; 256] = build_binary_table();

const fn build_binary_table() -> [bool; 256] {
    let mut table = [false; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = matches!(i as u8, 0x00..=0x08 | 0x0E..=0x1A | 0x1C..=0x1F);
        i += 1;
    }
    table
}

/// Where the two sides of a change are read from
pub trait ContentSource {
    fn read_before(&self, path: &str) -> Result<Vec<u8>, EngineError>;
    fn read_after(&self, path: &str) -> Result<Vec<u8>, EngineError>;
}

/// Before = committed at `HEAD`, after = working copy on disk
pub struct GitContentSource<'a> {
    repo: &'a GitRepo,
}

impl<'a> GitContentSource<'a> {
    pub fn new(repo: &'a GitRepo) -> Self {
        Self { repo }
    }
}

impl ContentSource for GitContentSource<'_> {
    fn read_before(&self, path: &str) -> Result<Vec<u8>, EngineError> {
        Ok(self.repo.read_at_head(path)?)
    }

    fn read_after(&self, path: &str) -> Result<Vec<u8>, EngineError> {
        read_file(&self.repo.workdir().join(path))
    }
}

/// Before and after are two directory trees
pub struct DirContentSource {
    before: PathBuf,
    after: PathBuf,
}

impl DirContentSource {
    pub fn new(before: impl Into<PathBuf>, after: impl Into<PathBuf>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
        }
    }
}

impl ContentSource for DirContentSource {
    fn read_before(&self, path: &str) -> Result<Vec<u8>, EngineError> {
        read_file(&self.before.join(path))
    }

    fn read_after(&self, path: &str) -> Result<Vec<u8>, EngineError> {
        read_file(&self.after.join(path))
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, EngineError> {
    std::fs::read(path).map_err(|e| EngineError::read(path, e))
}

/// Resolves records into materialized changes
pub struct ContentResolver<'a> {
    source: &'a dyn ContentSource,
}

impl<'a> ContentResolver<'a> {
    pub fn new(source: &'a dyn ContentSource) -> Self {
        Self { source }
    }

    /// Materialize every record; indices follow the input order.
    pub fn resolve_all(
        &self,
        records: &[ChangeRecord],
    ) -> Result<Vec<MaterializedChange>, EngineError> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| self.resolve(index, record))
            .collect()
    }

    pub fn resolve(
        &self,
        index: usize,
        record: &ChangeRecord,
    ) -> Result<MaterializedChange, EngineError> {
        let kind = record.kind();

        let content_before = if kind.has_before() {
            let path = record.path_before().unwrap_or_else(|| record.path());
            Some(cap_for_display(self.source.read_before(path)?))
        } else {
            None
        };

        let content_after = if kind.has_after() {
            Some(cap_for_display(self.source.read_after(record.path())?))
        } else {
            None
        };

        let no_changes = match (&content_before, &content_after) {
            (Some(before), Some(after)) => before == after,
            _ => false,
        };

        trace!(index, kind = %kind, path = record.path(), no_changes, "Materialized change");

        Ok(MaterializedChange {
            index,
            is_image: is_image_path(record.path()),
            no_changes,
            display_kind: kind.display_kind(),
            record: record.clone(),
            content_before,
            content_after,
        })
    }
}

/// Whether the leading bytes of `data` contain a non-text control character.
pub fn is_binary(data: &[u8]) -> bool {
    data.iter()
        .take(BINARY_SNIFF_LEN)
        .any(|&b| BINARY_BYTES[usize::from(b)])
}

/// Replace binary or oversized content with a short explanation.
pub fn cap_for_display(data: Vec<u8>) -> Vec<u8> {
    let binary = is_binary(&data);
    let large = data.len() > MAX_DISPLAY_SIZE;

    let message = match (binary, large) {
        (false, false) => return data,
        (true, true) => format!(
            "Not showing large ({} bytes), binary file. Size limit is {} bytes",
            data.len(),
            MAX_DISPLAY_SIZE
        ),
        (true, false) => format!("Not showing binary file ({} bytes).", data.len()),
        (false, true) => format!(
            "Not showing large ({} bytes) file. Size limit is {} bytes",
            data.len(),
            MAX_DISPLAY_SIZE
        ),
    };

    message.into_bytes()
}

pub fn is_image_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// In-memory content keyed by path
    #[derive(Default)]
    struct FakeSource {
        before: HashMap<String, Vec<u8>>,
        after: HashMap<String, Vec<u8>>,
    }

    impl ContentSource for FakeSource {
        fn read_before(&self, path: &str) -> Result<Vec<u8>, EngineError> {
            self.before.get(path).cloned().ok_or_else(|| {
                EngineError::read(path, std::io::ErrorKind::NotFound.into())
            })
        }

        fn read_after(&self, path: &str) -> Result<Vec<u8>, EngineError> {
            self.after.get(path).cloned().ok_or_else(|| {
                EngineError::read(path, std::io::ErrorKind::NotFound.into())
            })
        }
    }

    #[test]
    fn test_cap_threshold_boundary() {
        let exact = vec![b'a'; MAX_DISPLAY_SIZE];
        assert_eq!(cap_for_display(exact.clone()), exact);

        let over = vec![b'a'; MAX_DISPLAY_SIZE + 1];
        let capped = String::from_utf8(cap_for_display(over)).unwrap();
        assert_eq!(
            capped,
            "Not showing large (262145 bytes) file. Size limit is 262144 bytes"
        );
    }

    #[test]
    fn test_binary_replaced_regardless_of_size() {
        let capped = String::from_utf8(cap_for_display(b"PK\x03\x04".to_vec())).unwrap();
        assert_eq!(capped, "Not showing binary file (4 bytes).");

        let mut big = vec![0u8; MAX_DISPLAY_SIZE + 10];
        big[0] = 0x89;
        let capped = String::from_utf8(cap_for_display(big)).unwrap();
        assert_eq!(
            capped,
            "Not showing large (262154 bytes), binary file. Size limit is 262144 bytes"
        );
    }

    #[test]
    fn test_text_bytes_are_not_binary() {
        assert!(!is_binary(b"fn main() {\r\n\tprintln!(\"hi\");\x0b\x0c\n}"));
        assert!(!is_binary("naïve café ✓".as_bytes()));
        assert!(!is_binary(b"\x1b[31mred\x1b[0m"));
        assert!(!is_binary(b""));
        assert!(is_binary(b"text\0more"));
        assert!(is_binary(b"\x1f"));
    }

    #[test]
    fn test_binary_sniff_only_inspects_prefix() {
        let mut data = vec![b'a'; BINARY_SNIFF_LEN];
        data.push(0);
        assert!(!is_binary(&data));

        data[BINARY_SNIFF_LEN - 1] = 0;
        assert!(is_binary(&data));
    }

    #[test]
    fn test_image_detection_by_extension() {
        assert!(is_image_path("assets/Logo.PNG"));
        assert!(is_image_path("photo.jpeg"));
        assert!(!is_image_path("notes.txt"));
        assert!(!is_image_path("png"));
    }

    #[test]
    fn test_resolve_modified_reads_both_sides() {
        let mut source = FakeSource::default();
        source.before.insert("a.txt".into(), b"old".to_vec());
        source.after.insert("a.txt".into(), b"new".to_vec());

        let change = ContentResolver::new(&source)
            .resolve(0, &ChangeRecord::modified("a.txt"))
            .unwrap();

        assert_eq!(change.content_before.as_deref(), Some(&b"old"[..]));
        assert_eq!(change.content_after.as_deref(), Some(&b"new"[..]));
        assert!(!change.no_changes);
        assert_eq!(change.display_kind, crate::types::DisplayKind::Change);
    }

    #[test]
    fn test_resolve_renamed_uses_both_paths() {
        let mut source = FakeSource::default();
        source.before.insert("old/name.js".into(), b"same".to_vec());
        source.after.insert("new/name.js".into(), b"same".to_vec());

        let change = ContentResolver::new(&source)
            .resolve(0, &ChangeRecord::renamed("old/name.js", "new/name.js"))
            .unwrap();

        assert!(change.no_changes);
        assert_eq!(change.display_kind, crate::types::DisplayKind::Move);
    }

    #[test]
    fn test_resolve_one_sided_changes() {
        let mut source = FakeSource::default();
        source.before.insert("gone.png".into(), b"\x89PNG".to_vec());
        source.after.insert("new.txt".into(), Vec::new());

        let resolver = ContentResolver::new(&source);

        let deleted = resolver.resolve(0, &ChangeRecord::deleted("gone.png")).unwrap();
        assert!(deleted.content_after.is_none());
        assert!(deleted.is_image);
        assert!(!deleted.no_changes);

        let untracked = resolver.resolve(1, &ChangeRecord::untracked("new.txt")).unwrap();
        assert!(untracked.content_before.is_none());
        assert_eq!(untracked.content_after.as_deref(), Some(&b""[..]));
        assert!(!untracked.no_changes);
        assert_eq!(untracked.index, 1);
    }

    #[test]
    fn test_identical_large_binaries_report_no_changes() {
        let blob = vec![0u8; MAX_DISPLAY_SIZE * 2];
        let mut source = FakeSource::default();
        source.before.insert("data.bin".into(), blob.clone());
        source.after.insert("data.bin".into(), blob);

        let change = ContentResolver::new(&source)
            .resolve(0, &ChangeRecord::modified("data.bin"))
            .unwrap();

        assert!(change.no_changes);
        assert!(change.content_before.unwrap().starts_with(b"Not showing large"));
    }

    #[test]
    fn test_missing_content_is_fatal() {
        let source = FakeSource::default();
        let err = ContentResolver::new(&source)
            .resolve(0, &ChangeRecord::added("nowhere.txt"))
            .unwrap_err();

        assert!(matches!(err, EngineError::ReadFailed { .. }));
    }
}
