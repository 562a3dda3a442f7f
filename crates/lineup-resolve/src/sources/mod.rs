//! Source payload adapters.
//!
//! Each contributing system ships a differently-shaped JSON payload.
//! Adapters destructure those shapes into the source-neutral
//! [`ArtistPayload`] at the ingestion boundary; the resolution engine
//! never looks inside the raw JSON itself. Whatever the adapter does,
//! the verbatim payload is preserved in `ArtistPayload::raw`.

pub mod legacy;
pub mod rag;
pub mod sync;

use lineup_core::model::ArtistPayload;
use lineup_core::source::SourceSystem;
use serde_json::Value;

/// Destructure a raw payload for the given source system.
///
/// Unknown systems (and sources without a dedicated shape, like manual
/// edits or raw scrapes) go through the generic field mapping.
#[must_use]
pub fn adapt(source_system: &str, payload: &Value) -> ArtistPayload {
    match SourceSystem::parse(source_system) {
        Some(SourceSystem::Legacy) => legacy::adapt(payload),
        Some(SourceSystem::Rag) => rag::adapt(payload),
        Some(SourceSystem::Sync) => sync::adapt(payload),
        Some(SourceSystem::Manual | SourceSystem::Scraper) | None => generic(payload),
    }
}

/// Best-effort mapping of common field names, payload kept verbatim.
fn generic(payload: &Value) -> ArtistPayload {
    ArtistPayload {
        real_name: str_at(payload, &["real_name", "realName"]),
        city: str_at(payload, &["city"]),
        country: str_at(payload, &["country"]),
        region: str_at(payload, &["region"]),
        active_years: str_at(payload, &["active_years", "activeYears", "years_active"]),
        popularity_rank: rank_at(payload, &["rank", "popularity_rank"]),
        bio: str_at(payload, &["bio", "biography"]),
        short_bio: str_at(payload, &["short_bio", "summary"]),
        labels: list_at(payload, &["labels"]),
        collaborators: list_at(payload, &["collaborators"]),
        influences: list_at(payload, &["influences"]),
        crews: list_at(payload, &["crews"]),
        subgenres: list_at(payload, &["subgenres", "genres"]),
        tags: list_at(payload, &["tags"]),
        top_tracks: list_at(payload, &["top_tracks", "tracks"]),
        career_highlights: list_at(payload, &["career_highlights", "highlights"]),
        releases: Vec::new(),
        photo: None,
        gear: Vec::new(),
        raw: payload.clone(),
    }
}

// ---------------------------------------------------------------------------
// Shared field helpers
// ---------------------------------------------------------------------------

/// First present key as a trimmed non-empty string.
pub(crate) fn str_at(payload: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(s) = payload.get(key).and_then(Value::as_str) {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// First present key as a list of non-empty strings.
pub(crate) fn list_at(payload: &Value, keys: &[&str]) -> Vec<String> {
    for key in keys {
        if let Some(items) = payload.get(key).and_then(Value::as_array) {
            return items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
    }
    Vec::new()
}

/// First present key as a u32 rank.
pub(crate) fn rank_at(payload: &Value, keys: &[&str]) -> Option<u32> {
    for key in keys {
        if let Some(n) = payload.get(key).and_then(Value::as_u64) {
            return u32::try_from(n).ok();
        }
    }
    None
}
