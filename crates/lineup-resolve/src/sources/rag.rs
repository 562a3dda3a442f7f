//! Adapter for the automatically-extracted knowledge-base export.
//!
//! The export nests its data under `extraction` with separate
//! biography, attribute, and entity blocks, and ships a discography
//! rather than a release list.

use lineup_core::model::{ArtistPayload, Release};
use serde_json::Value;

use super::{list_at, str_at};

#[must_use]
pub fn adapt(payload: &Value) -> ArtistPayload {
    let extraction = payload.get("extraction").unwrap_or(payload);
    let attributes = extraction.get("attributes").unwrap_or(&Value::Null);
    let entities = extraction.get("entities").unwrap_or(&Value::Null);
    let based_in = attributes.get("based_in").unwrap_or(&Value::Null);

    ArtistPayload {
        real_name: str_at(attributes, &["real_name"]),
        city: str_at(based_in, &["city"]),
        country: str_at(based_in, &["country"]),
        region: str_at(based_in, &["region"]),
        active_years: str_at(attributes, &["years_active"]),
        popularity_rank: None,
        bio: str_at(extraction, &["full_bio", "biography"]),
        short_bio: str_at(extraction, &["summary"]),
        labels: list_at(entities, &["labels"]),
        collaborators: list_at(entities, &["collaborators"]),
        influences: list_at(entities, &["influences"]),
        crews: list_at(entities, &["crews"]),
        subgenres: list_at(entities, &["genres", "subgenres"]),
        tags: list_at(extraction, &["tags"]),
        top_tracks: list_at(extraction, &["tracks", "top_tracks"]),
        career_highlights: list_at(extraction, &["highlights"]),
        releases: discography(extraction),
        photo: None,
        gear: Vec::new(),
        raw: payload.clone(),
    }
}

fn discography(extraction: &Value) -> Vec<Release> {
    extraction
        .get("discography")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let title = str_at(item, &["title", "name"])?;
                    Some(Release {
                        title,
                        year: item.get("year").and_then(Value::as_i64).map(|y| y as i32),
                        label: str_at(item, &["label"]),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}
