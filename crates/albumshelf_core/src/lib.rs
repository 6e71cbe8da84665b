//! Core library for the album shelf.
//!
//! Keeps a user's nested folder/album tree in sync between clients and a flat
//! SQLite store: reconstruct on read, atomic replace-all on write.

pub mod api;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod tree;

pub use api::sync_api::{
    read_sync_document, read_sync_json, write_sync_document, write_sync_json, SyncApiError,
    SyncWriteResponse,
};
pub use config::{bootstrap, ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::album::{Album, AlbumId};
pub use model::folder::{Folder, FolderId, UserId};
pub use model::tree::{tree_depth, SyncDocument, TreeNode, MAX_FOLDER_DEPTH};
pub use repo::library_repo::{
    LibraryRepoError, LibraryRepoResult, LibraryRepository, SqliteLibraryRepository,
};
pub use service::library_service::{LibraryService, LibraryServiceError};
pub use service::sync_service::{ReplaceSummary, SyncService, SyncServiceError};
pub use tree::{flatten, group_albums_by_folder, reconstruct, FlatLibrary, FlatRow};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
