//! Library use-case services.
//!
//! # Responsibility
//! - `sync_service`: whole-tree read and atomic replace-all write.
//! - `library_service`: single-entity folder/album edits outside the sync core.
//!
//! # See also
//! - `crate::tree` for the pure conversions both directions rely on.

pub mod library_service;
pub mod sync_service;
