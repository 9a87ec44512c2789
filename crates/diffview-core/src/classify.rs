use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::EngineError;
use crate::types::{ChangeKind, ChangeRecord};
use crate::walk::list_worktree_files;

/// Turns raw records into the file-granularity list that gets materialized.
///
/// Untracked directories are replaced by one untracked record per regular
/// file beneath them. Everything else passes through in order.
pub struct ChangeClassifier {
    root: PathBuf,
}

impl ChangeClassifier {
    /// `root` is the directory record paths are relative to.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn classify(&self, records: Vec<ChangeRecord>) -> Result<Vec<ChangeRecord>, EngineError> {
        let mut classified = Vec::with_capacity(records.len());

        for record in records {
            match record.kind() {
                ChangeKind::Untracked if self.is_directory(record.path()) => {
                    let expanded = self.expand_directory(record.path())?;
                    debug!(
                        dir = record.path(),
                        files = expanded.len(),
                        "Expanded untracked directory"
                    );
                    classified.extend(expanded);
                }
                ChangeKind::Modified
                | ChangeKind::Added
                | ChangeKind::Deleted
                | ChangeKind::Renamed
                | ChangeKind::Untracked => classified.push(record),
            }
        }

        Ok(classified)
    }

    /// Symlinks are entries in their own right, even when they point at a directory.
    fn is_directory(&self, path: &str) -> bool {
        path.ends_with('/')
            || std::fs::symlink_metadata(self.root.join(path)).is_ok_and(|m| m.is_dir())
    }

    fn expand_directory(&self, dir: &str) -> Result<Vec<ChangeRecord>, EngineError> {
        let prefix = dir.trim_end_matches('/');
        let files = list_worktree_files(&self.root.join(Path::new(prefix)))?;

        Ok(files
            .into_iter()
            .map(|f| ChangeRecord::untracked(format!("{}/{}", prefix, f.path)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_untracked_directory_expands_to_files() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("newdir/sub")).unwrap();
        fs::write(dir.path().join("newdir/a.txt"), "a").unwrap();
        fs::write(dir.path().join("newdir/sub/b.txt"), "b").unwrap();

        let classifier = ChangeClassifier::new(dir.path());
        let records = classifier
            .classify(vec![ChangeRecord::untracked("newdir/")])
            .unwrap();

        assert_eq!(
            records,
            vec![
                ChangeRecord::untracked("newdir/a.txt"),
                ChangeRecord::untracked("newdir/sub/b.txt"),
            ]
        );
    }

    #[test]
    fn test_other_records_pass_through_in_order() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("fresh")).unwrap();
        fs::write(dir.path().join("fresh/only.rs"), "").unwrap();
        fs::write(dir.path().join("loose.txt"), "").unwrap();

        let input = vec![
            ChangeRecord::modified("src/lib.rs"),
            ChangeRecord::untracked("fresh/"),
            ChangeRecord::deleted("gone.txt"),
            ChangeRecord::untracked("loose.txt"),
            ChangeRecord::renamed("a.rs", "b.rs"),
        ];

        let records = ChangeClassifier::new(dir.path()).classify(input).unwrap();

        assert_eq!(
            records,
            vec![
                ChangeRecord::modified("src/lib.rs"),
                ChangeRecord::untracked("fresh/only.rs"),
                ChangeRecord::deleted("gone.txt"),
                ChangeRecord::untracked("loose.txt"),
                ChangeRecord::renamed("a.rs", "b.rs"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_untracked_symlink_to_directory_is_not_expanded() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("target_dir")).unwrap();
        fs::write(dir.path().join("target_dir/inner.txt"), "inner").unwrap();
        std::os::unix::fs::symlink(dir.path().join("target_dir"), dir.path().join("link"))
            .unwrap();

        let records = ChangeClassifier::new(dir.path())
            .classify(vec![ChangeRecord::untracked("link")])
            .unwrap();

        assert_eq!(records, vec![ChangeRecord::untracked("link")]);
    }

    #[test]
    fn test_nested_repository_metadata_is_not_expanded() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("vendored/.git")).unwrap();
        fs::write(dir.path().join("vendored/.git/HEAD"), "ref: refs/heads/main").unwrap();
        fs::write(dir.path().join("vendored/lib.rs"), "").unwrap();

        let records = ChangeClassifier::new(dir.path())
            .classify(vec![ChangeRecord::untracked("vendored/")])
            .unwrap();

        assert_eq!(records, vec![ChangeRecord::untracked("vendored/lib.rs")]);
    }

    #[test]
    fn test_empty_untracked_directory_yields_nothing() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();

        let records = ChangeClassifier::new(dir.path())
            .classify(vec![ChangeRecord::untracked("empty/")])
            .unwrap();

        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_untracked_directory_is_fatal() {
        let dir = tempdir().unwrap();

        let err = ChangeClassifier::new(dir.path())
            .classify(vec![ChangeRecord::untracked("vanished/")])
            .unwrap_err();

        assert!(matches!(err, EngineError::WalkFailed { .. }));
    }
}
