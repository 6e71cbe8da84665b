//! Sync boundary: the whole library as one JSON document.
//!
//! # Responsibility
//! - Decode client documents and hand the tree to the sync service.
//! - Encode reconstructed trees for clients.
//! - Translate store failures into a caller-visible envelope.

pub mod sync_api;
