//! Single-entity library edits.
//!
//! # Responsibility
//! - Create, rename, collapse/expand, and delete one folder.
//! - Add, move, and remove one album.
//!
//! # Invariants
//! - Every operation is scoped to one user; rows owned by someone else are
//!   reported as not found.
//! - A new folder's parent must exist and belong to the same user.
//! - New folders never nest deeper than `MAX_FOLDER_DEPTH`.
//! - An album's `user_id` always equals its folder's `user_id`.
//! - These edits are individually atomic; none of them may run inside a
//!   replace-all transaction.

use crate::model::album::{Album, AlbumId};
use crate::model::folder::{Folder, FolderId};
use crate::model::tree::MAX_FOLDER_DEPTH;
use crate::repo::library_repo::{LibraryRepoError, LibraryRepository};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Errors from single-entity library operations.
#[derive(Debug)]
pub enum LibraryServiceError {
    /// Caller identity is blank after trim.
    InvalidUserId,
    /// Folder name is blank after trim.
    InvalidDisplayName,
    /// Folder does not exist or belongs to another user.
    FolderNotFound(FolderId),
    /// Album does not exist or belongs to another user.
    AlbumNotFound(AlbumId),
    /// Parent already sits at the deepest allowed level.
    FolderTooDeep { max_depth: usize },
    /// Repository-level failure.
    Repo(LibraryRepoError),
}

impl Display for LibraryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUserId => write!(f, "user id must not be blank"),
            Self::InvalidDisplayName => write!(f, "folder name must not be blank"),
            Self::FolderNotFound(id) => write!(f, "folder not found: {id}"),
            Self::AlbumNotFound(id) => write!(f, "album not found: {id}"),
            Self::FolderTooDeep { max_depth } => {
                write!(f, "folders cannot nest deeper than {max_depth} levels")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LibraryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LibraryRepoError> for LibraryServiceError {
    fn from(value: LibraryRepoError) -> Self {
        match value {
            LibraryRepoError::FolderNotFound(id) => Self::FolderNotFound(id),
            LibraryRepoError::AlbumNotFound(id) => Self::AlbumNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Folder/album editing facade.
pub struct LibraryService<R: LibraryRepository> {
    repo: R,
}

impl<R: LibraryRepository> LibraryService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an expanded folder appended after its last sibling.
    pub fn create_folder(
        &self,
        user_id: &str,
        parent_id: Option<&str>,
        name: impl Into<String>,
    ) -> Result<Folder, LibraryServiceError> {
        let user_id = normalize_user_id(user_id)?;
        let name = normalize_display_name(name.into())?;
        if let Some(parent_id) = parent_id {
            let parent = self.owned_folder(user_id, parent_id)?;
            if self.folder_depth(&parent)? >= MAX_FOLDER_DEPTH {
                return Err(LibraryServiceError::FolderTooDeep {
                    max_depth: MAX_FOLDER_DEPTH,
                });
            }
        }

        let mut folder = Folder::new(Uuid::new_v4().to_string(), user_id, name);
        folder.parent_id = parent_id.map(str::to_string);
        folder.position = self.repo.next_folder_position(user_id, parent_id)?;
        self.repo.create_folder(&folder)?;
        Ok(folder)
    }

    /// Renames one folder.
    pub fn rename_folder(
        &self,
        user_id: &str,
        folder_id: &str,
        name: impl Into<String>,
    ) -> Result<Folder, LibraryServiceError> {
        let user_id = normalize_user_id(user_id)?;
        let name = normalize_display_name(name.into())?;
        let mut folder = self.owned_folder(user_id, folder_id)?;
        folder.name = name;
        self.repo.update_folder(&folder)?;
        Ok(folder)
    }

    /// Flips the expanded flag and returns the new value.
    pub fn toggle_folder_expanded(
        &self,
        user_id: &str,
        folder_id: &str,
    ) -> Result<bool, LibraryServiceError> {
        let user_id = normalize_user_id(user_id)?;
        let mut folder = self.owned_folder(user_id, folder_id)?;
        folder.is_expanded = !folder.is_expanded;
        self.repo.update_folder(&folder)?;
        Ok(folder.is_expanded)
    }

    /// Deletes one folder with its whole subtree and albums.
    pub fn delete_folder(&self, user_id: &str, folder_id: &str) -> Result<(), LibraryServiceError> {
        let user_id = normalize_user_id(user_id)?;
        self.owned_folder(user_id, folder_id)?;
        self.repo.delete_folder(folder_id)?;
        Ok(())
    }

    /// Adds an album at the end of a folder.
    ///
    /// A blank album id is replaced with a fresh UUID. Folder, user, and
    /// position on the incoming album are ignored.
    pub fn add_album(
        &self,
        user_id: &str,
        folder_id: &str,
        mut album: Album,
    ) -> Result<Album, LibraryServiceError> {
        let user_id = normalize_user_id(user_id)?;
        let folder = self.owned_folder(user_id, folder_id)?;

        if album.id.trim().is_empty() {
            album.id = Uuid::new_v4().to_string();
        }
        album.folder_id = folder.id;
        album.user_id = folder.user_id;
        album.position = self.repo.next_album_position(folder_id)?;
        self.repo.add_album(&album)?;
        Ok(album)
    }

    /// Removes one album.
    pub fn remove_album(&self, user_id: &str, album_id: &str) -> Result<(), LibraryServiceError> {
        let user_id = normalize_user_id(user_id)?;
        self.owned_album(user_id, album_id)?;
        self.repo.remove_album(album_id)?;
        Ok(())
    }

    /// Lists one folder's albums in stored order.
    pub fn list_albums(
        &self,
        user_id: &str,
        folder_id: &str,
    ) -> Result<Vec<Album>, LibraryServiceError> {
        let user_id = normalize_user_id(user_id)?;
        self.owned_folder(user_id, folder_id)?;
        self.repo
            .list_albums_for_folder(folder_id)
            .map_err(Into::into)
    }

    /// Moves one album into `target_folder_id` at `target_position`.
    ///
    /// `None` appends. Out-of-range positions are clamped. Album positions in
    /// the source and target folders are renumbered densely from zero.
    pub fn move_album(
        &self,
        user_id: &str,
        album_id: &str,
        target_folder_id: &str,
        target_position: Option<i64>,
    ) -> Result<(), LibraryServiceError> {
        let user_id = normalize_user_id(user_id)?;
        let album = self.owned_album(user_id, album_id)?;
        self.owned_folder(user_id, target_folder_id)?;

        self.repo.in_transaction(|repo| {
            let mut target_ids: Vec<AlbumId> = repo
                .list_albums_for_folder(target_folder_id)?
                .into_iter()
                .map(|album| album.id)
                .filter(|id| id != album_id)
                .collect();
            let index = target_position
                .unwrap_or(target_ids.len() as i64)
                .clamp(0, target_ids.len() as i64) as usize;
            target_ids.insert(index, album_id.to_string());

            for (position, id) in target_ids.iter().enumerate() {
                repo.update_album_position(id, target_folder_id, position as i64)?;
            }

            if album.folder_id != target_folder_id {
                let source = repo.list_albums_for_folder(&album.folder_id)?;
                for (position, remaining) in source.iter().enumerate() {
                    repo.update_album_position(&remaining.id, &album.folder_id, position as i64)?;
                }
            }
            Ok(())
        })?;
        Ok(())
    }

    fn owned_folder(&self, user_id: &str, folder_id: &str) -> Result<Folder, LibraryServiceError> {
        match self.repo.get_folder(folder_id)? {
            Some(folder) if folder.user_id == user_id => Ok(folder),
            _ => Err(LibraryServiceError::FolderNotFound(folder_id.to_string())),
        }
    }

    /// Level of `folder` as the loaded tree will show it; roots are 1.
    ///
    /// Stops at a missing or foreign parent, where loading promotes the chain
    /// to root, and past `MAX_FOLDER_DEPTH`, which also bounds looping chains.
    fn folder_depth(&self, folder: &Folder) -> Result<usize, LibraryServiceError> {
        let mut depth = 1;
        let mut parent_id = folder.parent_ref().map(str::to_string);
        while let Some(id) = parent_id {
            if depth > MAX_FOLDER_DEPTH {
                break;
            }
            match self.repo.get_folder(&id)? {
                Some(parent) if parent.user_id == folder.user_id => {
                    depth += 1;
                    parent_id = parent.parent_ref().map(str::to_string);
                }
                _ => break,
            }
        }
        Ok(depth)
    }

    fn owned_album(&self, user_id: &str, album_id: &str) -> Result<Album, LibraryServiceError> {
        match self.repo.get_album(album_id)? {
            Some(album) if album.user_id == user_id => Ok(album),
            _ => Err(LibraryServiceError::AlbumNotFound(album_id.to_string())),
        }
    }
}

fn normalize_user_id(user_id: &str) -> Result<&str, LibraryServiceError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(LibraryServiceError::InvalidUserId);
    }
    Ok(trimmed)
}

fn normalize_display_name(value: String) -> Result<String, LibraryServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LibraryServiceError::InvalidDisplayName);
    }
    Ok(trimmed.to_string())
}
