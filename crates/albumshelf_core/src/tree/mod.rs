//! Pure conversions between flat rows and the nested library tree.
//!
//! # Responsibility
//! - `reconstruct`: flat folder/album rows -> ordered root nodes.
//! - `flatten`: nested nodes -> pre-order rows with parentage and positions.
//!
//! # Invariants
//! - Neither direction touches storage or fails.
//! - Reconstruction never drops a folder row: structural anomalies degrade to
//!   additional roots.

mod flatten;
mod reconstruct;

pub use flatten::{flatten, FlatLibrary, FlatRow};
pub use reconstruct::{group_albums_by_folder, reconstruct};
