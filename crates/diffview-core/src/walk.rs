//! Recursive listing of regular files.
//!
//! Directory comparison and untracked-directory expansion share one walker,
//! so they agree on what counts as a file: symlinks are not followed and are
//! skipped along with other special files, hidden files are included, and
//! ignore files are not consulted.
//!
//! [`list_regular_files`] lists everything, `.git` directories included.
//! [`list_worktree_files`] also prunes `.git` directories of nested repositories.

use std::path::Path;

use ignore::WalkBuilder;

use crate::error::EngineError;

/// A regular file found under a walk root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the walk root, `/`-separated
    pub path: String,
    pub size: u64,
}

/// List every regular file under `root`, sorted by file name within each directory.
pub fn list_regular_files(root: &Path) -> Result<Vec<FileEntry>, EngineError> {
    walk_files(root, false)
}

/// Like [`list_regular_files`], without descending into `.git` directories.
pub fn list_worktree_files(root: &Path) -> Result<Vec<FileEntry>, EngineError> {
    walk_files(root, true)
}

fn walk_files(root: &Path, skip_git_dirs: bool) -> Result<Vec<FileEntry>, EngineError> {
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b));
    if skip_git_dirs {
        builder.filter_entry(|entry| entry.file_name() != ".git");
    }
    let walker = builder.build();

    let walk_error = |source| EngineError::WalkFailed {
        root: root.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for result in walker {
        let entry = result.map_err(walk_error)?;

        let is_file = entry.file_type().is_some_and(|ft| ft.is_file());
        if !is_file {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };

        let size = entry.metadata().map_err(walk_error)?.len();

        files.push(FileEntry {
            path: to_slash_path(relative),
            size,
        });
    }

    Ok(files)
}

/// Render a relative path with `/` separators regardless of platform.
pub(crate) fn to_slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
