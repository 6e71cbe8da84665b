//! JSON read/write entry points for one user's library.
//!
//! # Invariants
//! - `write_sync_json` never panics; every failure becomes `ok = false` with
//!   a message carrying the underlying error text.
//! - A successful write acknowledges with `ok = true` and an empty message.

use crate::model::tree::SyncDocument;
use crate::repo::library_repo::{LibraryRepoError, SqliteLibraryRepository};
use crate::service::sync_service::{ReplaceSummary, SyncService, SyncServiceError};
use log::{info, warn};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors raised at the sync boundary.
#[derive(Debug)]
pub enum SyncApiError {
    /// Request body is not a valid sync document.
    InvalidDocument(serde_json::Error),
    /// Response document could not be encoded.
    Encode(serde_json::Error),
    /// Connection is not a ready library store.
    Store(LibraryRepoError),
    /// Sync read/write failed.
    Sync(SyncServiceError),
}

impl Display for SyncApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDocument(err) => write!(f, "invalid sync document: {err}"),
            Self::Encode(err) => write!(f, "failed to encode sync document: {err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Sync(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SyncApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDocument(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Sync(err) => Some(err),
        }
    }
}

impl From<LibraryRepoError> for SyncApiError {
    fn from(value: LibraryRepoError) -> Self {
        Self::Store(value)
    }
}

impl From<SyncServiceError> for SyncApiError {
    fn from(value: SyncServiceError) -> Self {
        Self::Sync(value)
    }
}

/// Acknowledgment envelope for a sync write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncWriteResponse {
    /// Whether the whole document was stored.
    pub ok: bool,
    /// Empty on success; diagnostic text on failure.
    pub message: String,
}

impl SyncWriteResponse {
    fn success() -> Self {
        Self {
            ok: true,
            message: String::new(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Reads the user's library as a document.
pub fn read_sync_document(conn: &Connection, user_id: &str) -> Result<SyncDocument, SyncApiError> {
    let service = SyncService::new(SqliteLibraryRepository::try_new(conn)?);
    let folders = service.load_tree(user_id)?;
    Ok(SyncDocument { folders })
}

/// Reads the user's library as a JSON string.
pub fn read_sync_json(conn: &Connection, user_id: &str) -> Result<String, SyncApiError> {
    let document = read_sync_document(conn, user_id)?;
    serde_json::to_string(&document).map_err(SyncApiError::Encode)
}

/// Replaces the user's library with `document`.
pub fn write_sync_document(
    conn: &Connection,
    user_id: &str,
    document: &SyncDocument,
) -> Result<ReplaceSummary, SyncApiError> {
    let service = SyncService::new(SqliteLibraryRepository::try_new(conn)?);
    service
        .replace_tree(user_id, &document.folders)
        .map_err(Into::into)
}

/// Decodes `body` and replaces the user's library with it.
pub fn write_sync_json(conn: &Connection, user_id: &str, body: &str) -> SyncWriteResponse {
    let document: SyncDocument = match serde_json::from_str(body) {
        Ok(document) => document,
        Err(err) => {
            warn!(
                "event=sync_write module=api status=rejected error_code=invalid_document line={} column={}",
                err.line(),
                err.column()
            );
            return SyncWriteResponse::failure(SyncApiError::InvalidDocument(err).to_string());
        }
    };

    match write_sync_document(conn, user_id, &document) {
        Ok(summary) => {
            info!(
                "event=sync_write module=api status=ok folders={} albums={}",
                summary.folders_written, summary.albums_written
            );
            SyncWriteResponse::success()
        }
        Err(SyncApiError::Sync(err @ SyncServiceError::TreeTooDeep { .. })) => {
            warn!("event=sync_write module=api status=rejected error_code=tree_too_deep");
            SyncWriteResponse::failure(format!("invalid sync document: {err}"))
        }
        Err(err) => {
            warn!("event=sync_write module=api status=error error_code=save_failed");
            SyncWriteResponse::failure(format!("failed to save data: {err}"))
        }
    }
}
