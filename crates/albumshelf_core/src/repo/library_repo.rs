//! Library repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist folder and album rows for every user in one shared database.
//! - Keep SQL details and ordering behavior inside the repository boundary.
//!
//! # Invariants
//! - Folder listing is deterministic: `position ASC, id ASC`.
//! - Album listing is deterministic per folder: `position ASC, id ASC`.
//! - `in_transaction` commits only when the unit of work returns `Ok`.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::album::{Album, AlbumId};
use crate::model::folder::{Folder, FolderId};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const FOLDER_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    parent_id,
    name,
    is_expanded,
    position
FROM folders";

const ALBUM_SELECT_SQL: &str = "SELECT
    id,
    folder_id,
    user_id,
    spotify_id,
    name,
    artist,
    image_url,
    release_date,
    total_tracks,
    external_url,
    position
FROM albums";

/// Result type used by library repository operations.
pub type LibraryRepoResult<T> = Result<T, LibraryRepoError>;

/// Errors from library repository operations.
#[derive(Debug)]
pub enum LibraryRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target folder row does not exist.
    FolderNotFound(FolderId),
    /// Target album row does not exist.
    AlbumNotFound(AlbumId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid row model.
    InvalidData(String),
}

impl Display for LibraryRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::FolderNotFound(id) => write!(f, "folder not found: {id}"),
            Self::AlbumNotFound(id) => write!(f, "album not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "library repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "library repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "library repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid library data: {message}"),
        }
    }
}

impl Error for LibraryRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for LibraryRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for LibraryRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::from(value))
    }
}

/// Repository interface for the flat folder/album store.
pub trait LibraryRepository {
    /// Inserts one folder row as given.
    fn create_folder(&self, folder: &Folder) -> LibraryRepoResult<()>;
    /// Loads one folder by id.
    fn get_folder(&self, folder_id: &str) -> LibraryRepoResult<Option<Folder>>;
    /// Lists every folder owned by one user, in stored sibling order.
    fn list_folders_for_user(&self, user_id: &str) -> LibraryRepoResult<Vec<Folder>>;
    /// Overwrites name, parent, expanded flag, and position of one folder.
    fn update_folder(&self, folder: &Folder) -> LibraryRepoResult<()>;
    /// Deletes one folder; subfolders and albums cascade.
    fn delete_folder(&self, folder_id: &str) -> LibraryRepoResult<()>;
    /// Returns the position that appends after the last sibling.
    fn next_folder_position(
        &self,
        user_id: &str,
        parent_id: Option<&str>,
    ) -> LibraryRepoResult<i64>;
    /// Inserts one album row as given.
    fn add_album(&self, album: &Album) -> LibraryRepoResult<()>;
    /// Loads one album by id.
    fn get_album(&self, album_id: &str) -> LibraryRepoResult<Option<Album>>;
    /// Lists albums of one folder in stored order.
    fn list_albums_for_folder(&self, folder_id: &str) -> LibraryRepoResult<Vec<Album>>;
    /// Lists every album owned by one user, ordered by position.
    fn list_albums_for_user(&self, user_id: &str) -> LibraryRepoResult<Vec<Album>>;
    /// Deletes one album.
    fn remove_album(&self, album_id: &str) -> LibraryRepoResult<()>;
    /// Moves one album to a folder and position.
    fn update_album_position(
        &self,
        album_id: &str,
        folder_id: &str,
        position: i64,
    ) -> LibraryRepoResult<()>;
    /// Returns the position that appends after the last album in a folder.
    fn next_album_position(&self, folder_id: &str) -> LibraryRepoResult<i64>;
    /// Deletes every folder and album row owned by one user.
    fn delete_user_library(&self, user_id: &str) -> LibraryRepoResult<()>;
    /// Runs `work` inside one transaction.
    ///
    /// Writes made by `work` are committed when it returns `Ok` and discarded
    /// when it returns `Err`. Scopes must not nest.
    fn in_transaction<T, F>(&self, work: F) -> LibraryRepoResult<T>
    where
        Self: Sized,
        F: FnOnce(&Self) -> LibraryRepoResult<T>;
}

/// SQLite-backed library repository.
pub struct SqliteLibraryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLibraryRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> LibraryRepoResult<Self> {
        ensure_library_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl LibraryRepository for SqliteLibraryRepository<'_> {
    fn create_folder(&self, folder: &Folder) -> LibraryRepoResult<()> {
        self.conn.execute(
            "INSERT INTO folders (
                id,
                user_id,
                parent_id,
                name,
                is_expanded,
                position
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                folder.id.as_str(),
                folder.user_id.as_str(),
                folder.parent_ref(),
                folder.name.as_str(),
                bool_to_int(folder.is_expanded),
                folder.position,
            ],
        )?;
        Ok(())
    }

    fn get_folder(&self, folder_id: &str) -> LibraryRepoResult<Option<Folder>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FOLDER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([folder_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_folder_row(row)?));
        }
        Ok(None)
    }

    fn list_folders_for_user(&self, user_id: &str) -> LibraryRepoResult<Vec<Folder>> {
        let mut stmt = self.conn.prepare(&format!(
            "{FOLDER_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY position ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([user_id])?;
        let mut folders = Vec::new();
        while let Some(row) = rows.next()? {
            folders.push(parse_folder_row(row)?);
        }
        Ok(folders)
    }

    fn update_folder(&self, folder: &Folder) -> LibraryRepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE folders
             SET name = ?2,
                 parent_id = ?3,
                 is_expanded = ?4,
                 position = ?5
             WHERE id = ?1;",
            params![
                folder.id.as_str(),
                folder.name.as_str(),
                folder.parent_ref(),
                bool_to_int(folder.is_expanded),
                folder.position,
            ],
        )?;
        if changed == 0 {
            return Err(LibraryRepoError::FolderNotFound(folder.id.clone()));
        }
        Ok(())
    }

    fn delete_folder(&self, folder_id: &str) -> LibraryRepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM folders WHERE id = ?1;", [folder_id])?;
        if changed == 0 {
            return Err(LibraryRepoError::FolderNotFound(folder_id.to_string()));
        }
        Ok(())
    }

    fn next_folder_position(
        &self,
        user_id: &str,
        parent_id: Option<&str>,
    ) -> LibraryRepoResult<i64> {
        let next = match parent_id {
            Some(parent_id) => self.conn.query_row(
                "SELECT COALESCE(MAX(position), -1) + 1
                 FROM folders
                 WHERE user_id = ?1
                   AND parent_id = ?2;",
                params![user_id, parent_id],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(
                "SELECT COALESCE(MAX(position), -1) + 1
                 FROM folders
                 WHERE user_id = ?1
                   AND parent_id IS NULL;",
                [user_id],
                |row| row.get(0),
            )?,
        };
        Ok(next)
    }

    fn add_album(&self, album: &Album) -> LibraryRepoResult<()> {
        self.conn.execute(
            "INSERT INTO albums (
                id,
                folder_id,
                user_id,
                spotify_id,
                name,
                artist,
                image_url,
                release_date,
                total_tracks,
                external_url,
                position
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                album.id.as_str(),
                album.folder_id.as_str(),
                album.user_id.as_str(),
                album.spotify_id.as_deref(),
                album.name.as_str(),
                album.artist.as_str(),
                album.image_url.as_str(),
                album.release_date.as_deref(),
                i64::from(album.total_tracks),
                album.external_url.as_deref(),
                album.position,
            ],
        )?;
        Ok(())
    }

    fn get_album(&self, album_id: &str) -> LibraryRepoResult<Option<Album>> {
        let album = self
            .conn
            .query_row(
                &format!("{ALBUM_SELECT_SQL} WHERE id = ?1;"),
                [album_id],
                |row| Ok(parse_album_row(row)),
            )
            .optional()?;
        album.transpose()
    }

    fn list_albums_for_folder(&self, folder_id: &str) -> LibraryRepoResult<Vec<Album>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ALBUM_SELECT_SQL}
             WHERE folder_id = ?1
             ORDER BY position ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([folder_id])?;
        let mut albums = Vec::new();
        while let Some(row) = rows.next()? {
            albums.push(parse_album_row(row)?);
        }
        Ok(albums)
    }

    fn list_albums_for_user(&self, user_id: &str) -> LibraryRepoResult<Vec<Album>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ALBUM_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY position ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([user_id])?;
        let mut albums = Vec::new();
        while let Some(row) = rows.next()? {
            albums.push(parse_album_row(row)?);
        }
        Ok(albums)
    }

    fn remove_album(&self, album_id: &str) -> LibraryRepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM albums WHERE id = ?1;", [album_id])?;
        if changed == 0 {
            return Err(LibraryRepoError::AlbumNotFound(album_id.to_string()));
        }
        Ok(())
    }

    fn update_album_position(
        &self,
        album_id: &str,
        folder_id: &str,
        position: i64,
    ) -> LibraryRepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE albums
             SET folder_id = ?2,
                 position = ?3
             WHERE id = ?1;",
            params![album_id, folder_id, position],
        )?;
        if changed == 0 {
            return Err(LibraryRepoError::AlbumNotFound(album_id.to_string()));
        }
        Ok(())
    }

    fn next_album_position(&self, folder_id: &str) -> LibraryRepoResult<i64> {
        let next = self.conn.query_row(
            "SELECT COALESCE(MAX(position), -1) + 1
             FROM albums
             WHERE folder_id = ?1;",
            [folder_id],
            |row| row.get(0),
        )?;
        Ok(next)
    }

    fn delete_user_library(&self, user_id: &str) -> LibraryRepoResult<()> {
        self.conn
            .execute("DELETE FROM albums WHERE user_id = ?1;", [user_id])?;
        self.conn
            .execute("DELETE FROM folders WHERE user_id = ?1;", [user_id])?;
        Ok(())
    }

    fn in_transaction<T, F>(&self, work: F) -> LibraryRepoResult<T>
    where
        F: FnOnce(&Self) -> LibraryRepoResult<T>,
    {
        // Why: IMMEDIATE takes the write lock up front, so overlapping
        // replace-all writers serialize rather than interleave.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let outcome = work(self)?;
        tx.commit()?;
        Ok(outcome)
    }
}

fn parse_folder_row(row: &Row<'_>) -> LibraryRepoResult<Folder> {
    Ok(Folder {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        parent_id: row.get("parent_id")?,
        name: row.get("name")?,
        is_expanded: parse_flag(row.get("is_expanded")?, "folders.is_expanded")?,
        position: row.get("position")?,
    })
}

fn parse_album_row(row: &Row<'_>) -> LibraryRepoResult<Album> {
    let total_tracks = match row.get::<_, Option<i64>>("total_tracks")? {
        None => 0,
        Some(value) => u32::try_from(value).map_err(|_| {
            LibraryRepoError::InvalidData(format!(
                "invalid track count `{value}` in albums.total_tracks"
            ))
        })?,
    };

    Ok(Album {
        id: row.get("id")?,
        folder_id: row.get("folder_id")?,
        user_id: row.get("user_id")?,
        spotify_id: row.get("spotify_id")?,
        name: row.get("name")?,
        artist: row.get("artist")?,
        image_url: row.get("image_url")?,
        release_date: row.get("release_date")?,
        total_tracks,
        external_url: row.get("external_url")?,
        position: row.get("position")?,
    })
}

fn parse_flag(value: i64, column: &'static str) -> LibraryRepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(LibraryRepoError::InvalidData(format!(
            "invalid flag value `{other}` in {column}"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn ensure_library_connection_ready(conn: &Connection) -> LibraryRepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(LibraryRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let required: [(&'static str, &[&'static str]); 2] = [
        (
            "folders",
            &["id", "user_id", "parent_id", "name", "is_expanded", "position"],
        ),
        (
            "albums",
            &[
                "id",
                "folder_id",
                "user_id",
                "spotify_id",
                "name",
                "artist",
                "image_url",
                "release_date",
                "total_tracks",
                "external_url",
                "position",
            ],
        ),
    ];

    for (table, columns) in required {
        if !table_exists(conn, table)? {
            return Err(LibraryRepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(LibraryRepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> LibraryRepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> LibraryRepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
