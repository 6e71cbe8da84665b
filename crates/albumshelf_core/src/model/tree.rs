//! Nested tree wire shape.

use crate::model::album::Album;
use crate::model::folder::{Folder, FolderId};
use serde::{Deserialize, Serialize};

/// Transient nested folder: one folder with its ordered albums and children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: FolderId,
    pub name: String,
    /// Informational on input; the write path derives parentage from nesting.
    #[serde(default)]
    pub parent_id: Option<FolderId>,
    #[serde(default = "default_expanded")]
    pub is_expanded: bool,
    #[serde(default)]
    pub albums: Vec<Album>,
    #[serde(default)]
    pub subfolders: Vec<TreeNode>,
}

impl TreeNode {
    /// Creates an expanded, empty node.
    pub fn new(id: impl Into<FolderId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
            is_expanded: true,
            albums: Vec::new(),
            subfolders: Vec::new(),
        }
    }

    /// Creates a childless node carrying the folder's own fields.
    pub fn from_folder(folder: &Folder) -> Self {
        Self {
            id: folder.id.clone(),
            name: folder.name.clone(),
            parent_id: folder.parent_id.clone(),
            is_expanded: folder.is_expanded,
            albums: Vec::new(),
            subfolders: Vec::new(),
        }
    }

    pub fn with_album(mut self, album: Album) -> Self {
        self.albums.push(album);
        self
    }

    pub fn with_subfolder(mut self, child: TreeNode) -> Self {
        self.subfolders.push(child);
        self
    }

    /// Counts this node and all of its descendants.
    pub fn folder_count(&self) -> usize {
        self.descendants().count()
    }

    /// Counts albums in this node and all of its descendants.
    pub fn album_count(&self) -> usize {
        self.descendants().map(|node| node.albums.len()).sum()
    }

    /// Depth of the deepest folder at or below this node; a leaf is 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((node, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            pending.extend(node.subfolders.iter().map(|child| (child, depth + 1)));
        }
        deepest
    }

    fn descendants(&self) -> impl Iterator<Item = &TreeNode> {
        let mut pending = vec![self];
        std::iter::from_fn(move || {
            let node = pending.pop()?;
            pending.extend(node.subfolders.iter());
            Some(node)
        })
    }
}

/// Deepest folder nesting a library may hold; roots are at depth 1.
///
/// A document at this depth stays inside `serde_json`'s default recursion
/// limit of 128 (two JSON levels per folder plus the envelope and albums).
pub const MAX_FOLDER_DEPTH: usize = 48;

/// Depth of the deepest folder under `roots`, 0 for an empty forest.
pub fn tree_depth(roots: &[TreeNode]) -> usize {
    roots.iter().map(TreeNode::depth).max().unwrap_or(0)
}

/// Whole-library document exchanged with clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncDocument {
    #[serde(default)]
    pub folders: Vec<TreeNode>,
}

fn default_expanded() -> bool {
    true
}
