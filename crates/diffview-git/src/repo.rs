use git2::{ErrorCode, Repository};
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("Not a git repository: {0}")]
    NotARepo(String),

    #[error("Repository has no working directory: {0}")]
    BareRepo(String),

    #[error("Git operation failed: {0}")]
    GitOperationFailed(#[from] git2::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("No commits in repository")]
    NoCommits,

    #[error("Path '{0}' does not exist at HEAD")]
    PathNotInHead(String),

    #[error("Path '{0}' at HEAD is not a file")]
    NotABlob(String),

    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("`{command}` printed output that is not valid UTF-8")]
    NonUtf8Output {
        command: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// A git repository opened at its working-directory root
pub struct GitRepo {
    repo: Repository,
    workdir: PathBuf,
    git_binary: PathBuf,
}

impl GitRepo {
    /// Find the repository enclosing `path`.
    ///
    /// `path` may be any directory inside the working copy; the returned
    /// repository always reports the top-level working directory.
    pub fn discover(path: &Path) -> Result<Self, GitError> {
        let repo = Repository::discover(path).map_err(|e| match e.code() {
            ErrorCode::NotFound => GitError::NotARepo(path.display().to_string()),
            _ => GitError::GitOperationFailed(e),
        })?;

        let workdir = repo
            .workdir()
            .ok_or_else(|| GitError::BareRepo(repo.path().display().to_string()))?
            .to_path_buf();

        debug!(workdir = %workdir.display(), "Discovered git repository");

        Ok(Self {
            repo,
            workdir,
            git_binary: PathBuf::from("git"),
        })
    }

    /// Use a specific git executable instead of the one on `PATH`.
    pub fn with_git_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.git_binary = binary.into();
        self
    }

    /// Root of the working copy. Status paths are relative to it.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Run `git status --porcelain` in the working directory and return its raw output.
    pub fn status_porcelain(&self) -> Result<String, GitError> {
        let args = ["-c", "core.quotepath=false", "status", "--porcelain"];

        debug!(
            binary = %self.git_binary.display(),
            args = ?args,
            "Running git status"
        );

        let output = Command::new(&self.git_binary)
            .args(args)
            .current_dir(&self.workdir)
            .output()?;

        let command = || format!("git {}", args.join(" "));

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: command(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // Status paths must round-trip exactly
        String::from_utf8(output.stdout).map_err(|source| GitError::NonUtf8Output {
            command: command(),
            source,
        })
    }

    /// Read `path` (relative to the working directory) as committed at `HEAD`.
    pub fn read_at_head(&self, path: &str) -> Result<Vec<u8>, GitError> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Err(GitError::NoCommits)
            }
            Err(e) => return Err(GitError::GitOperationFailed(e)),
        };
        let tree = head.peel_to_tree()?;

        let entry = tree.get_path(Path::new(path)).map_err(|e| match e.code() {
            ErrorCode::NotFound => GitError::PathNotInHead(path.to_string()),
            _ => GitError::GitOperationFailed(e),
        })?;

        let blob = entry
            .to_object(&self.repo)?
            .into_blob()
            .map_err(|_| GitError::NotABlob(path.to_string()))?;

        debug!(path, size = blob.size(), "Read file at HEAD");

        Ok(blob.content().to_vec())
    }
}
