use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid status line: '{0}'")]
    MalformedStatus(String),

    #[error("Git error: {0}")]
    GitError(#[from] diffview_git::GitError),

    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk {root}: {source}")]
    WalkFailed {
        root: PathBuf,
        #[source]
        source: ignore::Error,
    },

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

impl EngineError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::ReadFailed {
            path: path.into(),
            source,
        }
    }
}
