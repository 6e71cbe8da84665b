//! Flat store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Expose per-row CRUD for folders and albums plus the bulk per-user delete.
//! - Provide the transactional scope every replace-all write runs inside.
//!
//! # Invariants
//! - Reads are scoped to one user and ordered by `position ASC, id ASC`.
//! - Repository APIs return semantic not-found errors in addition to DB
//!   transport errors.

pub mod library_repo;
