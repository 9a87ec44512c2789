use std::path::PathBuf;

use diffview_git::GitRepo;
use tracing::{debug, info};

use crate::classify::ChangeClassifier;
use crate::content::{ContentResolver, ContentSource, DirContentSource, GitContentSource};
use crate::dirdiff::DirDiffSource;
use crate::error::EngineError;
use crate::status::{GitStatusSource, StatusSource};
use crate::store::ChangeStore;
use crate::types::MaterializedChange;

/// What to compare
#[derive(Debug, Clone)]
pub enum DiffMode {
    /// Working copy of the repository enclosing `dir` against `HEAD`
    WorkingCopy { dir: PathBuf },
    /// Two directory trees
    Directories { before: PathBuf, after: PathBuf },
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Directory change paths are relative to (the after tree in directory mode)
    pub root: PathBuf,
    pub changes: usize,
}

/// Detect, classify and materialize changes, then publish them to `store`.
///
/// Runs to completion before publishing; on error the store is left untouched.
pub fn run(mode: &DiffMode, store: &ChangeStore) -> Result<RunReport, EngineError> {
    let (root, changes) = match mode {
        DiffMode::WorkingCopy { dir } => {
            let repo = GitRepo::discover(dir)?;
            let root = repo.workdir().to_path_buf();
            let changes = build_changes(
                &GitStatusSource::new(&repo),
                &ChangeClassifier::new(&root),
                &GitContentSource::new(&repo),
            )?;
            (root, changes)
        }
        DiffMode::Directories { before, after } => {
            let source = DirDiffSource::new(before, after)?;
            let changes = build_changes(
                &source,
                &ChangeClassifier::new(after),
                &DirContentSource::new(before, after),
            )?;
            (after.clone(), changes)
        }
    };

    let report = RunReport {
        root,
        changes: changes.len(),
    };
    store.publish(changes);

    info!(
        root = %report.root.display(),
        changes = report.changes,
        "Published change set"
    );

    Ok(report)
}

/// The pipeline without publishing: source, classifier, resolver.
pub fn build_changes(
    source: &dyn StatusSource,
    classifier: &ChangeClassifier,
    content: &dyn ContentSource,
) -> Result<Vec<MaterializedChange>, EngineError> {
    let raw = source.changes()?;
    let records = classifier.classify(raw)?;
    let changes = ContentResolver::new(content).resolve_all(&records)?;

    for change in &changes {
        debug!(
            index = change.index,
            kind = %change.record.kind(),
            path = change.record.path(),
            "Change"
        );
    }

    Ok(changes)
}
