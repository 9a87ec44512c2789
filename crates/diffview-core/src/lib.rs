//! # diffview-core
//!
//! Change detection and materialization for diffview.
//!
//! A run turns two views of a file tree into an ordered list of
//! [`MaterializedChange`]s, each carrying display-ready before/after content.
//!
//! ## Pipeline
//!
//! 1. A [`StatusSource`] lists raw [`ChangeRecord`]s, either from
//!    `git status` ([`GitStatusSource`]) or by comparing two directory trees
//!    ([`DirDiffSource`]).
//! 2. [`ChangeClassifier`] expands untracked directories into per-file records.
//! 3. [`ContentResolver`] reads both sides through a [`ContentSource`] and
//!    applies the display cap (binary and oversized content is replaced by a
//!    short message).
//! 4. [`ChangeStore`] publishes the result as an immutable [`Snapshot`].
//!
//! [`run`] wires these together for a [`DiffMode`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use diffview_core::{run, ChangeStore, DiffMode};
//!
//! let store = ChangeStore::new();
//! run(&DiffMode::WorkingCopy { dir: ".".into() }, &store)?;
//!
//! for change in store.all().iter() {
//!     println!("{} {}", change.display_kind, change.record.path());
//! }
//! ```

mod classify;
mod content;
mod dirdiff;
mod engine;
mod error;
mod status;
mod store;
mod types;
mod walk;

pub use classify::ChangeClassifier;
pub use content::{
    cap_for_display, is_binary, is_image_path, ContentResolver, ContentSource, DirContentSource,
    GitContentSource, MAX_DISPLAY_SIZE,
};
pub use dirdiff::{files_equal, DirDiffSource};
pub use engine::{build_changes, run, DiffMode, RunReport};
pub use error::EngineError;
pub use status::{parse_status, parse_status_line, GitStatusSource, StatusSource};
pub use store::{ChangeStore, Snapshot};
pub use types::{ChangeKind, ChangeRecord, DisplayKind, MaterializedChange, Side};
pub use walk::{list_regular_files, list_worktree_files, FileEntry};
