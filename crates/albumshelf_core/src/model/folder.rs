//! Folder row model.

use serde::{Deserialize, Serialize};

/// Opaque folder identifier.
pub type FolderId = String;

/// Opaque identifier of the user owning a library.
pub type UserId = String;

/// One persisted folder row.
///
/// `position` is advisory sibling order: zero-based within one
/// `(user_id, parent_id)` scope but not enforced unique by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: FolderId,
    pub user_id: UserId,
    /// `None` (or an empty string from older clients) means root level.
    pub parent_id: Option<FolderId>,
    pub name: String,
    pub is_expanded: bool,
    pub position: i64,
}

impl Folder {
    /// Creates an expanded root-level folder at position zero.
    pub fn new(id: impl Into<FolderId>, user_id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            parent_id: None,
            name: name.into(),
            is_expanded: true,
            position: 0,
        }
    }

    /// Returns the parent id when it is set and non-empty.
    pub fn parent_ref(&self) -> Option<&str> {
        self.parent_id.as_deref().filter(|value| !value.is_empty())
    }

    /// Returns whether this folder sits at root level.
    pub fn is_root(&self) -> bool {
        self.parent_ref().is_none()
    }
}
