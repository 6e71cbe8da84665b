use crate::model::album::Album;
use crate::model::folder::{Folder, FolderId};
use crate::model::tree::TreeNode;

/// One row produced by flattening, in write order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatRow {
    Folder(Folder),
    Album(Album),
}

/// Pre-order row sequence for one user's tree.
///
/// Each folder row precedes its albums, and both precede the folder's
/// children, so writing rows in order never references a missing parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatLibrary {
    pub rows: Vec<FlatRow>,
}

impl FlatLibrary {
    pub fn folders(&self) -> impl Iterator<Item = &Folder> {
        self.rows.iter().filter_map(|row| match row {
            FlatRow::Folder(folder) => Some(folder),
            FlatRow::Album(_) => None,
        })
    }

    pub fn albums(&self) -> impl Iterator<Item = &Album> {
        self.rows.iter().filter_map(|row| match row {
            FlatRow::Album(album) => Some(album),
            FlatRow::Folder(_) => None,
        })
    }

    pub fn folder_count(&self) -> usize {
        self.folders().count()
    }

    pub fn album_count(&self) -> usize {
        self.albums().count()
    }
}

/// Flattens submitted roots into rows owned by `user_id`.
///
/// Positions come from array indices. Parentage comes from nesting, not from
/// the nodes' own `parent_id`. Album `folder_id`/`user_id` are rewritten to
/// the enclosing node and `user_id`. Identities are kept as given.
pub fn flatten(user_id: &str, roots: &[TreeNode]) -> FlatLibrary {
    let mut rows = Vec::new();
    let mut pending: Vec<(Option<&FolderId>, usize, &TreeNode)> = roots
        .iter()
        .enumerate()
        .rev()
        .map(|(position, node)| (None, position, node))
        .collect();

    while let Some((parent_id, position, node)) = pending.pop() {
        rows.push(FlatRow::Folder(Folder {
            id: node.id.clone(),
            user_id: user_id.to_string(),
            parent_id: parent_id.cloned(),
            name: node.name.clone(),
            is_expanded: node.is_expanded,
            position: position as i64,
        }));

        for (album_position, album) in node.albums.iter().enumerate() {
            rows.push(FlatRow::Album(Album {
                folder_id: node.id.clone(),
                user_id: user_id.to_string(),
                position: album_position as i64,
                ..album.clone()
            }));
        }

        // Reversed so the first child is popped next.
        pending.extend(
            node.subfolders
                .iter()
                .enumerate()
                .rev()
                .map(|(position, child)| (Some(&node.id), position, child)),
        );
    }

    FlatLibrary { rows }
}

#[cfg(test)]
mod tests {
    use super::{flatten, FlatRow};
    use crate::model::album::Album;
    use crate::model::tree::TreeNode;

    fn row_ids(rows: &[FlatRow]) -> Vec<String> {
        rows.iter()
            .map(|row| match row {
                FlatRow::Folder(folder) => format!("folder:{}", folder.id),
                FlatRow::Album(album) => format!("album:{}", album.id),
            })
            .collect()
    }

    #[test]
    fn emits_rows_in_pre_order_with_albums_before_children() {
        let roots = vec![
            TreeNode::new("a", "A")
                .with_album(Album::new("a-x", "X", "Artist", ""))
                .with_subfolder(TreeNode::new("a1", "A1").with_album(Album::new(
                    "a1-y", "Y", "Artist", "",
                ))),
            TreeNode::new("b", "B"),
        ];

        let flat = flatten("u1", &roots);

        assert_eq!(
            row_ids(&flat.rows),
            ["folder:a", "album:a-x", "folder:a1", "album:a1-y", "folder:b"]
        );
        assert_eq!(flat.folder_count(), 3);
        assert_eq!(flat.album_count(), 2);
    }

    #[test]
    fn assigns_positions_and_parentage_from_nesting() {
        let mut stale_child = TreeNode::new("c2", "C2");
        stale_child.parent_id = Some("somewhere-else".to_string());
        let roots = vec![
            TreeNode::new("r0", "R0"),
            TreeNode::new("r1", "R1")
                .with_subfolder(TreeNode::new("c1", "C1"))
                .with_subfolder(stale_child),
        ];

        let flat = flatten("u1", &roots);
        let folders: Vec<_> = flat.folders().collect();

        assert_eq!(folders[0].position, 0);
        assert_eq!(folders[0].parent_id, None);
        assert_eq!(folders[1].position, 1);
        assert_eq!(folders[2].parent_id.as_deref(), Some("r1"));
        assert_eq!(folders[2].position, 0);
        assert_eq!(folders[3].parent_id.as_deref(), Some("r1"));
        assert_eq!(folders[3].position, 1);
        assert!(folders.iter().all(|folder| folder.user_id == "u1"));
    }

    #[test]
    fn album_ownership_follows_enclosing_node_and_user() {
        let mut album = Album::new("x", "X", "Artist", "cover.jpg");
        album.folder_id = "wrong-folder".to_string();
        album.user_id = "wrong-user".to_string();
        album.position = 42;
        album.spotify_id = Some("sp-1".to_string());
        let roots = vec![TreeNode::new("f", "F")
            .with_album(Album::new("w", "W", "Artist", ""))
            .with_album(album)];

        let flat = flatten("u1", &roots);
        let albums: Vec<_> = flat.albums().collect();

        assert_eq!(albums[1].folder_id, "f");
        assert_eq!(albums[1].user_id, "u1");
        assert_eq!(albums[1].position, 1);
        assert_eq!(albums[1].spotify_id.as_deref(), Some("sp-1"));
        assert_eq!(albums[1].image_url, "cover.jpg");
    }

    #[test]
    fn empty_roots_flatten_to_nothing() {
        assert!(flatten("u1", &[]).rows.is_empty());
    }
}
