use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::ArtistId;

/// A structured release entry inside a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub label: Option<String>,
}

/// Per-source profile data for one canonical artist.
///
/// One row per contributing source per ingestion; re-ingesting the same
/// source record updates the existing row, never duplicates it. The raw
/// payload is kept verbatim so the profile is attributable and
/// re-derivable from its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistProfile {
    pub artist_id: ArtistId,

    pub bio: Option<String>,
    pub short_bio: Option<String>,

    pub labels: Vec<String>,
    pub collaborators: Vec<String>,
    pub influences: Vec<String>,
    pub crews: Vec<String>,
    pub subgenres: Vec<String>,
    pub tags: Vec<String>,
    pub top_tracks: Vec<String>,
    pub career_highlights: Vec<String>,

    pub releases: Vec<Release>,

    /// Canonical name of the contributing source system.
    pub source_system: String,
    /// The record's identifier inside that source system.
    pub source_record_id: String,
    /// Priority copied from the priority table at write time; readers
    /// never re-derive trust.
    pub source_priority: u32,
    /// Match confidence in `[0, 1]` at the time the link was made.
    pub confidence: f64,
    /// Verbatim source payload, kept for audit and replay.
    pub raw_payload: serde_json::Value,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ArtistProfile {
    /// Create an empty profile shell for a (artist, source record) pair.
    #[must_use]
    pub fn new(
        artist_id: ArtistId,
        source_system: impl Into<String>,
        source_record_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            artist_id,
            bio: None,
            short_bio: None,
            labels: Vec::new(),
            collaborators: Vec::new(),
            influences: Vec::new(),
            crews: Vec::new(),
            subgenres: Vec::new(),
            tags: Vec::new(),
            top_tracks: Vec::new(),
            career_highlights: Vec::new(),
            releases: Vec::new(),
            source_system: source_system.into(),
            source_record_id: source_record_id.into(),
            source_priority: 0,
            confidence: 1.0,
            raw_payload: serde_json::Value::Null,
            created_at: now,
            updated_at: now,
        }
    }
}
