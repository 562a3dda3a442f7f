//! Read-side projector: reassemble a canonical artist into the flat
//! shape presentation code consumes.
//!
//! Pure read transform over the store. Performs no writes, and
//! tolerates artists with zero profiles, assets, or gear rows.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{ArtistProfile, CanonicalArtist, Release};
use crate::schema::Database;
use crate::Result;

/// The flat artist shape the legacy presentation layer expects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatArtist {
    pub name: String,
    pub sort_name: String,
    pub slug: String,
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

    pub photo_url: Option<String>,
    pub photo_author: Option<String>,
    pub photo_license: Option<String>,

    /// Gear grouped by category, categories in stable order.
    pub gear: BTreeMap<String, Vec<String>>,
    /// Rider notes concatenated across all gear rows.
    pub rider_notes: Option<String>,
}

/// Project the artist with the given slug, or `None` if the slug is
/// unknown. Never fails for a missing slug.
pub fn project_by_slug(db: &Database, slug: &str) -> Result<Option<FlatArtist>> {
    match db.find_artist_by_slug(slug)? {
        Some(artist) => Ok(Some(project(db, &artist)?)),
        None => Ok(None),
    }
}

/// Assemble the flat shape: the highest-priority profile, the primary
/// asset (or first available), and gear consolidated by category.
pub fn project(db: &Database, artist: &CanonicalArtist) -> Result<FlatArtist> {
    let mut flat = FlatArtist {
        name: artist.name.clone(),
        sort_name: artist.sort_name.clone(),
        slug: artist.slug.clone(),
        real_name: artist.real_name.clone(),
        city: artist.city.clone(),
        country: artist.country.clone(),
        region: artist.region.clone(),
        active_years: artist.active_years.clone(),
        popularity_rank: artist.popularity_rank,
        ..FlatArtist::default()
    };

    // Profiles arrive sorted by stamped priority descending; the first
    // one is the primary profile.
    let profiles = db.list_profiles_for_artist(&artist.id)?;
    if let Some(primary) = profiles.into_iter().next() {
        apply_profile(&mut flat, primary);
    }

    // Assets arrive primary-first.
    let assets = db.list_assets_for_artist(&artist.id)?;
    if let Some(asset) = assets.into_iter().next() {
        flat.photo_url = Some(asset.url);
        flat.photo_author = asset.author;
        flat.photo_license = asset.license;
    }

    let gear = db.list_gear_for_artist(&artist.id)?;
    let mut notes: Vec<String> = Vec::new();
    for item in gear {
        flat.gear.entry(item.category).or_default().push(item.item);
        if let Some(note) = item.rider_notes {
            if !note.is_empty() {
                notes.push(note);
            }
        }
    }
    if !notes.is_empty() {
        flat.rider_notes = Some(notes.join(" "));
    }

    Ok(flat)
}

fn apply_profile(flat: &mut FlatArtist, profile: ArtistProfile) {
    flat.bio = profile.bio;
    flat.short_bio = profile.short_bio;
    flat.labels = profile.labels;
    flat.collaborators = profile.collaborators;
    flat.influences = profile.influences;
    flat.crews = profile.crews;
    flat.subgenres = profile.subgenres;
    flat.tags = profile.tags;
    flat.top_tracks = profile.top_tracks;
    flat.career_highlights = profile.career_highlights;
    flat.releases = profile.releases;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArtistAsset, AssetType, GearItem};

    fn seeded_artist(db: &Database, name: &str) -> CanonicalArtist {
        let artist = CanonicalArtist::new(name);
        db.insert_artist(&artist).unwrap();
        artist
    }

    #[test]
    fn test_project_missing_slug_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(project_by_slug(&db, "nobody").unwrap().is_none());
    }

    #[test]
    fn test_project_bare_artist() {
        let db = Database::open_in_memory().unwrap();
        let _artist = seeded_artist(&db, "Jeff Mills");

        let flat = project_by_slug(&db, "jeff-mills").unwrap().unwrap();
        assert_eq!(flat.name, "Jeff Mills");
        assert!(flat.bio.is_none());
        assert!(flat.photo_url.is_none());
        assert!(flat.gear.is_empty());
        assert!(flat.rider_notes.is_none());
    }

    #[test]
    fn test_project_picks_highest_priority_profile() {
        let db = Database::open_in_memory().unwrap();
        let artist = seeded_artist(&db, "Jeff Mills");

        let mut sync = ArtistProfile::new(artist.id, "sync", "s-1");
        sync.source_priority = 60;
        sync.bio = Some("sync bio".to_string());
        let mut legacy = ArtistProfile::new(artist.id, "legacy", "l-1");
        legacy.source_priority = 80;
        legacy.bio = Some("legacy bio".to_string());
        legacy.labels = vec!["Axis".to_string()];
        db.upsert_profile(&sync).unwrap();
        db.upsert_profile(&legacy).unwrap();

        let flat = project_by_slug(&db, "jeff-mills").unwrap().unwrap();
        assert_eq!(flat.bio.as_deref(), Some("legacy bio"));
        assert_eq!(flat.labels, vec!["Axis"]);
    }

    #[test]
    fn test_project_prefers_primary_asset() {
        let db = Database::open_in_memory().unwrap();
        let artist = seeded_artist(&db, "Jeff Mills");

        let other = ArtistAsset::new(artist.id, AssetType::Photo, "https://x/b.jpg", "sync");
        let mut primary = ArtistAsset::new(artist.id, AssetType::Photo, "https://x/a.jpg", "sync");
        primary.is_primary = true;
        primary.author = Some("Photographer".to_string());
        db.upsert_asset(&other).unwrap();
        db.upsert_asset(&primary).unwrap();

        let flat = project_by_slug(&db, "jeff-mills").unwrap().unwrap();
        assert_eq!(flat.photo_url.as_deref(), Some("https://x/a.jpg"));
        assert_eq!(flat.photo_author.as_deref(), Some("Photographer"));
    }

    #[test]
    fn test_project_falls_back_to_first_asset() {
        let db = Database::open_in_memory().unwrap();
        let artist = seeded_artist(&db, "Jeff Mills");

        db.upsert_asset(&ArtistAsset::new(
            artist.id,
            AssetType::Photo,
            "https://x/only.jpg",
            "sync",
        ))
        .unwrap();

        let flat = project_by_slug(&db, "jeff-mills").unwrap().unwrap();
        assert_eq!(flat.photo_url.as_deref(), Some("https://x/only.jpg"));
    }

    #[test]
    fn test_project_groups_gear_and_joins_rider_notes() {
        let db = Database::open_in_memory().unwrap();
        let artist = seeded_artist(&db, "Jeff Mills");

        let mut decks = GearItem::new(artist.id, "decks", "CDJ-2000", "legacy");
        decks.rider_notes = Some("three decks".to_string());
        let mut mixer = GearItem::new(artist.id, "mixer", "DJM-900", "legacy");
        mixer.rider_notes = Some("rotary preferred".to_string());
        let drum = GearItem::new(artist.id, "drum-machine", "TR-909", "legacy");
        db.replace_gear_for_source(&artist.id, "legacy", &[decks, mixer, drum])
            .unwrap();

        let flat = project_by_slug(&db, "jeff-mills").unwrap().unwrap();
        assert_eq!(flat.gear["decks"], vec!["CDJ-2000"]);
        assert_eq!(flat.gear["mixer"], vec!["DJM-900"]);
        assert_eq!(flat.gear["drum-machine"], vec!["TR-909"]);
        assert_eq!(
            flat.rider_notes.as_deref(),
            Some("three decks rotary preferred")
        );
    }
}
