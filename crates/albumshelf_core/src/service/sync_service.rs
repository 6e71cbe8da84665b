//! Tree synchronization service.
//!
//! # Responsibility
//! - Rebuild one user's nested tree from flat store rows.
//! - Atomically replace one user's stored hierarchy with a submitted tree.
//!
//! # Invariants
//! - A replace runs inside exactly one store transaction: delete everything the
//!   user owns, then write flattened rows in pre-order. Any failure discards
//!   the whole attempt.
//! - Rows owned by other users are never touched.
//! - Reads tolerate structural anomalies; writes never swallow store errors.
//! - A submitted tree deeper than `MAX_FOLDER_DEPTH` is rejected before the
//!   store is touched.

use crate::model::tree::{tree_depth, TreeNode, MAX_FOLDER_DEPTH};
use crate::repo::library_repo::{LibraryRepoError, LibraryRepository};
use crate::tree::{flatten, group_albums_by_folder, reconstruct, FlatRow};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Errors from sync service operations.
#[derive(Debug)]
pub enum SyncServiceError {
    /// Caller identity is blank after trim.
    InvalidUserId,
    /// Submitted tree nests folders deeper than allowed.
    TreeTooDeep { depth: usize, max_depth: usize },
    /// Store failure; for writes the transaction has been rolled back.
    Repo(LibraryRepoError),
}

impl Display for SyncServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUserId => write!(f, "user id must not be blank"),
            Self::TreeTooDeep { depth, max_depth } => write!(
                f,
                "folder tree is {depth} levels deep; at most {max_depth} are allowed"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SyncServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::InvalidUserId | Self::TreeTooDeep { .. } => None,
        }
    }
}

impl From<LibraryRepoError> for SyncServiceError {
    fn from(value: LibraryRepoError) -> Self {
        Self::Repo(value)
    }
}

/// Counts of rows written by one successful replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceSummary {
    pub folders_written: usize,
    pub albums_written: usize,
}

/// Whole-tree sync facade over a library repository.
pub struct SyncService<R: LibraryRepository> {
    repo: R,
}

impl<R: LibraryRepository> SyncService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Loads the user's tree. A user with no folders gets an empty vector.
    pub fn load_tree(&self, user_id: &str) -> Result<Vec<TreeNode>, SyncServiceError> {
        let user_id = normalize_user_id(user_id)?;
        let started_at = Instant::now();

        let folders = self.repo.list_folders_for_user(user_id)?;
        let albums = self.repo.list_albums_for_user(user_id)?;
        let album_count = albums.len();
        let roots = reconstruct(&folders, group_albums_by_folder(albums));

        info!(
            "event=library_load module=sync status=ok folders={} albums={} roots={} duration_ms={}",
            folders.len(),
            album_count,
            roots.len(),
            started_at.elapsed().as_millis()
        );
        Ok(roots)
    }

    /// Replaces everything the user owns with `roots`.
    ///
    /// Calling this twice with the same tree leaves the same stored state as
    /// calling it once.
    pub fn replace_tree(
        &self,
        user_id: &str,
        roots: &[TreeNode],
    ) -> Result<ReplaceSummary, SyncServiceError> {
        let user_id = normalize_user_id(user_id)?;
        let started_at = Instant::now();
        let depth = tree_depth(roots);
        if depth > MAX_FOLDER_DEPTH {
            warn!(
                "event=library_replace module=sync status=rejected error_code=tree_too_deep depth={} max_depth={}",
                depth, MAX_FOLDER_DEPTH
            );
            return Err(SyncServiceError::TreeTooDeep {
                depth,
                max_depth: MAX_FOLDER_DEPTH,
            });
        }
        let flat = flatten(user_id, roots);
        info!(
            "event=library_replace module=sync status=start roots={} folders={} albums={}",
            roots.len(),
            flat.folder_count(),
            flat.album_count()
        );

        let outcome = self.repo.in_transaction(|repo| {
            repo.delete_user_library(user_id)?;
            for row in &flat.rows {
                match row {
                    FlatRow::Folder(folder) => repo.create_folder(folder)?,
                    FlatRow::Album(album) => repo.add_album(album)?,
                }
            }
            Ok(ReplaceSummary {
                folders_written: flat.folder_count(),
                albums_written: flat.album_count(),
            })
        });

        match outcome {
            Ok(summary) => {
                info!(
                    "event=library_replace module=sync status=ok folders={} albums={} duration_ms={}",
                    summary.folders_written,
                    summary.albums_written,
                    started_at.elapsed().as_millis()
                );
                Ok(summary)
            }
            Err(err) => {
                error!(
                    "event=library_replace module=sync status=error duration_ms={} error_code=replace_rolled_back error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }
}

fn normalize_user_id(user_id: &str) -> Result<&str, SyncServiceError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(SyncServiceError::InvalidUserId);
    }
    Ok(trimmed)
}
