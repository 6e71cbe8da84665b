use crate::model::album::Album;
use crate::model::folder::{Folder, FolderId};
use crate::model::tree::TreeNode;
use log::warn;
use std::collections::{HashMap, HashSet};

/// Groups albums by owning folder, keeping their relative order.
pub fn group_albums_by_folder(albums: Vec<Album>) -> HashMap<FolderId, Vec<Album>> {
    let mut grouped: HashMap<FolderId, Vec<Album>> = HashMap::new();
    for album in albums {
        grouped
            .entry(album.folder_id.clone())
            .or_default()
            .push(album);
    }
    grouped
}

/// Builds the nested tree for one user's folder rows.
///
/// Roots and children keep the order of `folders`; albums keep the order of
/// their per-folder sequence. Every folder ends up in exactly one place:
/// - empty/unset parent: root;
/// - parent resolves: appended to that parent's `subfolders`;
/// - parent unknown (missing row or another user's folder): promoted to root;
/// - parent chain loops back on itself: the cycle member that comes first in
///   input order is promoted to root, which breaks the cycle. Folders that
///   merely hang off a cycle stay under their parent.
pub fn reconstruct(
    folders: &[Folder],
    mut albums_by_folder: HashMap<FolderId, Vec<Album>>,
) -> Vec<TreeNode> {
    let index_by_id: HashMap<&str, usize> = folders
        .iter()
        .enumerate()
        .map(|(index, folder)| (folder.id.as_str(), index))
        .collect();

    let mut parent_of: Vec<Option<usize>> = vec![None; folders.len()];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); folders.len()];
    let mut roots = Vec::new();

    for (index, folder) in folders.iter().enumerate() {
        let Some(parent_id) = folder.parent_ref() else {
            roots.push(index);
            continue;
        };
        match index_by_id.get(parent_id) {
            Some(&parent) => {
                parent_of[index] = Some(parent);
                children[parent].push(index);
            }
            None => {
                warn!(
                    "event=orphan_promoted module=tree reason=missing_parent folder_id={} parent_id={}",
                    folder.id, parent_id
                );
                roots.push(index);
            }
        }
    }

    let mut reachable = vec![false; folders.len()];
    for &root in &roots {
        mark_subtree(root, &children, &mut reachable);
    }
    for start in 0..folders.len() {
        if reachable[start] {
            continue;
        }
        let entry = cycle_entry(start, &parent_of);
        if let Some(parent) = parent_of[entry].take() {
            children[parent].retain(|&child| child != entry);
        }
        warn!(
            "event=orphan_promoted module=tree reason=parent_cycle folder_id={}",
            folders[entry].id
        );
        roots.push(entry);
        mark_subtree(entry, &children, &mut reachable);
    }

    let mut nodes: Vec<Option<TreeNode>> = folders
        .iter()
        .map(|folder| {
            let mut node = TreeNode::from_folder(folder);
            node.albums = albums_by_folder.remove(&folder.id).unwrap_or_default();
            Some(node)
        })
        .collect();

    roots
        .into_iter()
        .filter_map(|root| assemble(root, &children, &mut nodes))
        .collect()
}

fn mark_subtree(start: usize, children: &[Vec<usize>], reachable: &mut [bool]) {
    let mut stack = vec![start];
    while let Some(index) = stack.pop() {
        if reachable[index] {
            continue;
        }
        reachable[index] = true;
        stack.extend(children[index].iter().copied());
    }
}

/// Lowest-index folder on the parent cycle that `start`'s chain runs into.
fn cycle_entry(start: usize, parent_of: &[Option<usize>]) -> usize {
    let mut on_path = HashSet::new();
    let mut current = start;
    while on_path.insert(current) {
        match parent_of[current] {
            Some(parent) => current = parent,
            None => return current,
        }
    }

    let mut lowest = current;
    let mut member = parent_of[current];
    while let Some(index) = member {
        if index == current {
            break;
        }
        lowest = lowest.min(index);
        member = parent_of[index];
    }
    lowest
}

fn assemble(
    root: usize,
    children: &[Vec<usize>],
    nodes: &mut [Option<TreeNode>],
) -> Option<TreeNode> {
    let mut order = Vec::new();
    let mut pending = vec![root];
    while let Some(index) = pending.pop() {
        order.push(index);
        pending.extend(children[index].iter().copied());
    }

    // Every child sits after its parent in `order`, so walking it backwards
    // finishes each subtree before its parent takes it.
    for &index in order.iter().rev() {
        let subfolders: Vec<TreeNode> = children[index]
            .iter()
            .filter_map(|&child| nodes[child].take())
            .collect();
        if let Some(node) = nodes[index].as_mut() {
            node.subfolders = subfolders;
        }
    }
    nodes[root].take()
}
