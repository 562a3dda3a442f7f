//! Adapter for the hand-curated legacy catalog.
//!
//! Legacy rows are flat and already close to the canonical shape; the
//! work here is field-by-field mapping plus the structured release,
//! photo, and gear sub-objects.

use lineup_core::model::{ArtistPayload, AssetInput, GearInput, Release};
use serde_json::Value;

use super::{list_at, rank_at, str_at};

#[must_use]
pub fn adapt(payload: &Value) -> ArtistPayload {
    ArtistPayload {
        real_name: str_at(payload, &["real_name"]),
        city: str_at(payload, &["city"]),
        country: str_at(payload, &["country"]),
        region: str_at(payload, &["region"]),
        active_years: str_at(payload, &["active_years"]),
        popularity_rank: rank_at(payload, &["rank"]),
        bio: str_at(payload, &["bio"]),
        short_bio: str_at(payload, &["short_bio"]),
        labels: list_at(payload, &["labels"]),
        collaborators: list_at(payload, &["collaborators"]),
        influences: list_at(payload, &["influences"]),
        crews: list_at(payload, &["crews"]),
        subgenres: list_at(payload, &["subgenres"]),
        tags: list_at(payload, &["tags"]),
        top_tracks: list_at(payload, &["top_tracks"]),
        career_highlights: list_at(payload, &["career_highlights"]),
        releases: releases(payload),
        photo: photo(payload),
        gear: gear(payload),
        raw: payload.clone(),
    }
}

fn releases(payload: &Value) -> Vec<Release> {
    payload
        .get("releases")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let title = str_at(item, &["title"])?;
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

fn photo(payload: &Value) -> Option<AssetInput> {
    let photo = payload.get("photo")?;
    let url = str_at(photo, &["url"])?;
    Some(AssetInput {
        url,
        author: str_at(photo, &["author"]),
        license: str_at(photo, &["license"]),
        source_page: str_at(photo, &["page"]),
    })
}

fn gear(payload: &Value) -> Vec<GearInput> {
    payload
        .get("gear")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    Some(GearInput {
                        category: str_at(item, &["category"])?,
                        item: str_at(item, &["item"])?,
                        rider_notes: str_at(item, &["rider_notes"]),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_legacy_row() {
        let payload = json!({
            "real_name": "Jeff Mills",
            "city": "Detroit",
            "country": "USA",
            "active_years": "1986-present",
            "rank": 1,
            "bio": "Co-founder of Underground Resistance.",
            "labels": ["Axis", "Tresor"],
            "releases": [
                {"title": "Waveform Transmission Vol. 1", "year": 1992, "label": "Tresor"},
                {"title": "The Bells"}
            ],
            "photo": {"url": "https://x/jm.jpg", "author": "A. Photographer", "license": "CC-BY"},
            "gear": [
                {"category": "decks", "item": "CDJ-2000", "rider_notes": "three decks"},
                {"category": "drum-machine", "item": "TR-909"}
            ]
        });

        let adapted = adapt(&payload);
        assert_eq!(adapted.real_name.as_deref(), Some("Jeff Mills"));
        assert_eq!(adapted.releases.len(), 2);
        assert_eq!(adapted.releases[0].year, Some(1992));
        assert!(adapted.releases[1].label.is_none());
        assert_eq!(adapted.photo.as_ref().unwrap().url, "https://x/jm.jpg");
        assert_eq!(adapted.gear.len(), 2);
        assert_eq!(adapted.gear[0].rider_notes.as_deref(), Some("three decks"));
        assert_eq!(adapted.raw, payload);
    }

    #[test]
    fn test_minimal_legacy_row() {
        let adapted = adapt(&json!({}));
        assert!(adapted.bio.is_none());
        assert!(adapted.releases.is_empty());
        assert!(adapted.photo.is_none());
        assert!(adapted.gear.is_empty());
    }

    #[test]
    fn test_release_without_title_is_dropped() {
        let adapted = adapt(&json!({"releases": [{"year": 1999}]}));
        assert!(adapted.releases.is_empty());
    }
}
