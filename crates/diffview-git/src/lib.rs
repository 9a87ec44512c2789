//! # diffview-git
//!
//! Git access for diffview's working-copy mode.
//!
//! This crate is the boundary to the version-control collaborator. It knows
//! how to find the repository that encloses a directory, how to ask git for
//! the porcelain status of the working copy, and how to read a file as it was
//! committed at `HEAD`. It does not interpret the status text; parsing into
//! change records happens in `diffview-core`.
//!
//! ## Key Types
//!
//! - [`GitRepo`] - An opened repository with a working directory
//! - [`GitError`] - Failures from git2 or the git executable
//!
//! ## Usage
//!
//! ```rust,ignore
//! use diffview_git::GitRepo;
//!
//! let repo = GitRepo::discover(std::path::Path::new("."))?;
//! let status = repo.status_porcelain()?;
//! let committed = repo.read_at_head("src/main.rs")?;
//! ```

mod repo;

pub use repo::{GitError, GitRepo};
