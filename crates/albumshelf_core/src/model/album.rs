//! Album row model.
//!
//! The serialized shape doubles as the wire shape inside a sync document, so
//! fields that clients commonly omit (`folderId`, `userId`, `position`,
//! `totalTracks`) default on input and optional catalog fields are skipped
//! on output when absent. A `null` or negative `totalTracks` reads as 0.

use crate::model::folder::{FolderId, UserId};
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque album identifier.
pub type AlbumId = String;

/// One persisted album row, owned by exactly one folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: AlbumId,
    #[serde(default)]
    pub folder_id: FolderId,
    /// Denormalized from the owning folder for per-user queries.
    #[serde(default)]
    pub user_id: UserId,
    /// External catalog id (Spotify, Deezer, Apple), when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spotify_id: Option<String>,
    pub name: String,
    pub artist: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_track_count")]
    pub total_tracks: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(default)]
    pub position: i64,
}

impl Album {
    /// Creates an album with no folder assignment and no catalog metadata.
    pub fn new(
        id: impl Into<AlbumId>,
        name: impl Into<String>,
        artist: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            folder_id: FolderId::new(),
            user_id: UserId::new(),
            spotify_id: None,
            name: name.into(),
            artist: artist.into(),
            image_url: image_url.into(),
            release_date: None,
            total_tracks: 0,
            external_url: None,
            position: 0,
        }
    }
}

fn lenient_track_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let count = Option::<i64>::deserialize(deserializer)?.unwrap_or(0);
    Ok(u32::try_from(count.max(0)).unwrap_or(u32::MAX))
}
