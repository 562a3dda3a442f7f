//! Adapter for the photo/content synchronization feed.
//!
//! The feed is asset-centric: its payloads carry a photo attribution
//! and a little context (caption, "City, Country" location, tags), not
//! a full profile.

use lineup_core::model::{ArtistPayload, AssetInput};
use serde_json::Value;

use super::{list_at, str_at};

#[must_use]
pub fn adapt(payload: &Value) -> ArtistPayload {
    let (city, country) = split_location(str_at(payload, &["location"]).as_deref());

    ArtistPayload {
        city,
        country,
        short_bio: str_at(payload, &["caption"]),
        tags: list_at(payload, &["tags"]),
        photo: photo(payload),
        raw: payload.clone(),
        ..ArtistPayload::default()
    }
}

/// Split a "City, Country" string; a single segment is the country.
fn split_location(location: Option<&str>) -> (Option<String>, Option<String>) {
    match location {
        Some(loc) => match loc.split_once(',') {
            Some((city, country)) => (
                Some(city.trim().to_string()),
                Some(country.trim().to_string()),
            ),
            None => (None, Some(loc.trim().to_string())),
        },
        None => (None, None),
    }
}

fn photo(payload: &Value) -> Option<AssetInput> {
    let photo = payload.get("photo")?;
    let url = str_at(photo, &["src", "url"])?;
    Some(AssetInput {
        url,
        author: str_at(photo, &["photographer", "author"]),
        license: str_at(photo, &["license"]),
        source_page: str_at(photo, &["page"]),
    })
}
