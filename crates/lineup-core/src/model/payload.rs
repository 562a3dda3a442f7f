use serde::{Deserialize, Serialize};

use crate::model::profile::Release;

/// A staged source record awaiting resolution, as loaded from the
/// `source_records` staging relation.
///
/// The payload stays opaque here; only the source adapters at the
/// ingestion boundary destructure source-specific shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub source_system: String,
    pub source_record_id: String,
    pub display_name: String,
    pub payload: serde_json::Value,
}

/// Photo/media attribution carried inside a payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetInput {
    pub url: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub source_page: Option<String>,
}

/// Gear row carried inside a payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GearInput {
    pub category: String,
    pub item: String,
    #[serde(default)]
    pub rider_notes: Option<String>,
}

/// The source-neutral profile payload the resolution engine consumes.
///
/// Source adapters map each system's raw JSON into this shape; the
/// engine never inspects anything beyond these fields, and `raw` is
/// stored verbatim alongside the destructured data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtistPayload {
    pub real_name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub active_years: Option<String>,
    pub popularity_rank: Option<u32>,

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

    pub photo: Option<AssetInput>,
    pub gear: Vec<GearInput>,

    /// The untouched source payload, kept for audit and replay.
    pub raw: serde_json::Value,
}
