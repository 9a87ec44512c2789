use serde::{Deserialize, Serialize, Serializer};

/// Kind of a file-level change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Modified,
    Added,
    Deleted,
    Renamed,
    /// Present in the working copy but not known to version control
    Untracked,
}

impl ChangeKind {
    pub fn display_kind(self) -> DisplayKind {
        match self {
            ChangeKind::Modified => DisplayKind::Change,
            ChangeKind::Added => DisplayKind::Add,
            ChangeKind::Deleted => DisplayKind::Delete,
            ChangeKind::Renamed => DisplayKind::Move,
            ChangeKind::Untracked => DisplayKind::Add,
        }
    }

    /// Whether the "before" side exists at the reference revision
    pub fn has_before(self) -> bool {
        matches!(
            self,
            ChangeKind::Modified | ChangeKind::Deleted | ChangeKind::Renamed
        )
    }

    /// Whether the "after" side exists in the live tree
    pub fn has_after(self) -> bool {
        !matches!(self, ChangeKind::Deleted)
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::Modified => write!(f, "Modified"),
            ChangeKind::Added => write!(f, "Added"),
            ChangeKind::Deleted => write!(f, "Deleted"),
            ChangeKind::Renamed => write!(f, "Renamed"),
            ChangeKind::Untracked => write!(f, "Untracked"),
        }
    }
}

/// How a change is presented to the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayKind {
    Add,
    Delete,
    Move,
    Change,
}

impl std::fmt::Display for DisplayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayKind::Add => write!(f, "add"),
            DisplayKind::Delete => write!(f, "delete"),
            DisplayKind::Move => write!(f, "move"),
            DisplayKind::Change => write!(f, "change"),
        }
    }
}

/// A single file-level difference, before content is resolved.
///
/// Construct through the per-kind constructors; they are the only way to
/// build a record, so which paths are present always matches the kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    path_before: Option<String>,
    path_after: Option<String>,
    kind: ChangeKind,
}

impl ChangeRecord {
    pub fn modified(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            path_before: Some(path.clone()),
            path_after: Some(path),
            kind: ChangeKind::Modified,
        }
    }

    pub fn added(path: impl Into<String>) -> Self {
        Self {
            path_before: None,
            path_after: Some(path.into()),
            kind: ChangeKind::Added,
        }
    }

    pub fn deleted(path: impl Into<String>) -> Self {
        Self {
            path_before: Some(path.into()),
            path_after: None,
            kind: ChangeKind::Deleted,
        }
    }

    pub fn renamed(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            path_before: Some(before.into()),
            path_after: Some(after.into()),
            kind: ChangeKind::Renamed,
        }
    }

    pub fn untracked(path: impl Into<String>) -> Self {
        Self {
            path_before: None,
            path_after: Some(path.into()),
            kind: ChangeKind::Untracked,
        }
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn path_before(&self) -> Option<&str> {
        self.path_before.as_deref()
    }

    pub fn path_after(&self) -> Option<&str> {
        self.path_after.as_deref()
    }

    /// The path used for naming and type detection: `path_after` when
    /// present, otherwise `path_before`.
    pub fn path(&self) -> &str {
        self.path_after
            .as_deref()
            .or(self.path_before.as_deref())
            .unwrap_or_default()
    }

    /// Case-insensitive match against either side.
    pub fn matches_path(&self, path: &str) -> bool {
        let path = path.to_lowercase();
        [self.path_before(), self.path_after()]
            .into_iter()
            .flatten()
            .any(|p| p.to_lowercase() == path)
    }
}

/// A change with both sides resolved, ready for presentation.
///
/// Content is capped for display and never serialized; the presentation
/// layer fetches it separately by path and side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedChange {
    pub index: usize,
    pub record: ChangeRecord,
    pub content_before: Option<Vec<u8>>,
    pub content_after: Option<Vec<u8>>,
    pub is_image: bool,
    pub no_changes: bool,
    pub display_kind: DisplayKind,
}

/// Listing payload for a change
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangeView<'a> {
    index: usize,
    path_before: Option<&'a str>,
    path_after: Option<&'a str>,
    kind: DisplayKind,
    is_image: bool,
    no_changes: bool,
}

impl Serialize for MaterializedChange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ChangeView {
            index: self.index,
            path_before: self.record.path_before(),
            path_after: self.record.path_after(),
            kind: self.display_kind,
            is_image: self.is_image,
            no_changes: self.no_changes,
        }
        .serialize(serializer)
    }
}

impl MaterializedChange {
    pub fn content(&self, side: Side) -> Option<&[u8]> {
        match side {
            Side::Before => self.content_before.as_deref(),
            Side::After => self.content_after.as_deref(),
        }
    }
}

/// One side of a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Before,
    After,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Before => write!(f, "before"),
            Side::After => write!(f, "after"),
        }
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "before" | "a" => Ok(Side::Before),
            "after" | "b" => Ok(Side::After),
            _ => Err(format!("Unknown side: {}", s)),
        }
    }
}
