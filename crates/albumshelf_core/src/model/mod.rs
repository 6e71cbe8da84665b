//! Library domain model shared by storage, tree conversion, and sync layers.
//!
//! # Responsibility
//! - Define the flat persisted rows (`Folder`, `Album`).
//! - Define the transient nested wire shape (`TreeNode`, `SyncDocument`).
//!
//! # Invariants
//! - Identities are opaque strings supplied by the client or minted upstream.
//! - `Album::user_id` always equals the owning folder's `user_id` once written.
//! - Tree nodes are never persisted; they are rebuilt on every read.

pub mod album;
pub mod folder;
pub mod tree;
