//! The resolution engine: decides, for one staged source record, which
//! canonical artist it belongs to, or creates one.
//!
//! Resolution is a strict four-step cascade. Each step only runs if the
//! previous found nothing:
//!
//! 1. source-map lookup (have we linked this exact record before?)
//! 2. slug lookup (does an artist with the derived slug exist?)
//! 3. fuzzy scan over existing artists, banded by score
//! 4. creation of a new canonical artist
//!
//! Concurrent creation of the same slug loses the race at the UNIQUE
//! constraint; the loser retries as a slug lookup instead of failing
//! the record.

use lineup_core::identity::{normalize, slugify};
use lineup_core::matching::{score, MatchBand};
use lineup_core::model::{
    ArtistAsset, ArtistId, ArtistPayload, ArtistProfile, AssetType, CanonicalArtist, GearItem,
    MatchMethod, MatchReason, MergeCandidate, MigrationLogEntry, SourceMapEntry, SourceRecord,
};
use lineup_core::schema::Database;
use lineup_core::source::SourcePriorities;
use serde_json::json;

use crate::error::{Error, Result};
use crate::sources;

/// Above this many canonical artists the fuzzy scan narrows to the
/// slug-prefix bucket of the incoming name instead of the full catalog.
pub const FUZZY_SCAN_CUTOFF: i64 = 5000;

/// What happened to one source record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A new canonical artist was created.
    Created(ArtistId),
    /// The record was already mapped; its profile data was refreshed.
    Updated(ArtistId),
    /// The record was linked to an existing artist.
    Merged(ArtistId),
    /// Ambiguous match: a pending merge candidate was filed, no link.
    Flagged {
        artist_id: ArtistId,
        candidate_id: i64,
    },
}

impl Resolution {
    /// The artist the record ended up associated with (for flagged
    /// records, the artist under review).
    #[must_use]
    pub fn artist_id(&self) -> ArtistId {
        match self {
            Self::Created(id) | Self::Updated(id) | Self::Merged(id) => *id,
            Self::Flagged { artist_id, .. } => *artist_id,
        }
    }
}

/// A resolution plus the audit-log entry written for it.
///
/// The log entry is handed back so a dry run can replay it after
/// rolling back: the audit trail is the one write that survives a
/// preview.
#[derive(Debug, Clone)]
pub struct ResolveOutcome {
    pub resolution: Resolution,
    pub log: MigrationLogEntry,
}

/// Stateless resolver over one database handle.
#[derive(Debug)]
pub struct ResolutionEngine<'a> {
    db: &'a Database,
    priorities: SourcePriorities,
}

impl<'a> ResolutionEngine<'a> {
    #[must_use]
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            priorities: SourcePriorities::default(),
        }
    }

    #[must_use]
    pub fn with_priorities(db: &'a Database, priorities: SourcePriorities) -> Self {
        Self { db, priorities }
    }

    /// Resolve one staged record, writing the profile data and the
    /// audit-log entry inside the caller's transaction.
    pub fn resolve(&self, record: &SourceRecord) -> Result<ResolveOutcome> {
        let name = record.display_name.trim();
        let slug = slugify(name);
        if name.is_empty() || slug.is_empty() {
            return Err(Error::MissingName {
                source_system: record.source_system.clone(),
                source_record_id: record.source_record_id.clone(),
            });
        }

        let payload = sources::adapt(&record.source_system, &record.payload);

        // Step 1: this exact record has been resolved before.
        if let Some(mapping) = self
            .db
            .find_mapping(&record.source_system, &record.source_record_id)?
        {
            self.attach(&mapping.artist_id, record, &payload, mapping.confidence)?;
            let log = self.log(
                "updated",
                record,
                Some(mapping.artist_id),
                json!({"method": mapping.method.name()}),
            )?;
            return Ok(ResolveOutcome {
                resolution: Resolution::Updated(mapping.artist_id),
                log,
            });
        }

        // Step 2: an artist already owns the derived slug.
        if let Some(artist) = self.db.find_artist_by_slug(&slug)? {
            return self.link(record, &payload, &artist, MatchMethod::Slug, 1.0);
        }

        // Step 3: fuzzy scan.
        if let Some((artist, best)) = self.best_fuzzy_match(name, &slug)? {
            match MatchBand::of(best) {
                MatchBand::AutoLink => {
                    let method = if normalize(name) == normalize(&artist.name) {
                        MatchMethod::ExactName
                    } else {
                        MatchMethod::FuzzyName
                    };
                    return self.link(record, &payload, &artist, method, best);
                }
                MatchBand::Review => return self.flag(record, &artist, best),
                MatchBand::NoMatch => {}
            }
        }

        // Step 4: nothing matched, create.
        self.create(record, &payload, name)
    }

    /// Scan existing artists in slug order and keep the best-scoring
    /// one; ties keep the earlier artist. On large catalogs the scan is
    /// bounded to the slug-prefix bucket of the incoming name.
    fn best_fuzzy_match(
        &self,
        name: &str,
        slug: &str,
    ) -> Result<Option<(CanonicalArtist, f64)>> {
        let candidates = if self.db.count_artists()? > FUZZY_SCAN_CUTOFF {
            match slug.chars().next() {
                Some(first) => self
                    .db
                    .list_artists_with_slug_prefix(&first.to_string())?,
                None => Vec::new(),
            }
        } else {
            self.db.list_artists()?
        };

        let mut best: Option<(CanonicalArtist, f64)> = None;
        for artist in candidates {
            let s = score(name, &artist.name);
            if best.as_ref().is_none_or(|(_, b)| s > *b) {
                best = Some((artist, s));
            }
        }
        Ok(best)
    }

    fn link(
        &self,
        record: &SourceRecord,
        payload: &ArtistPayload,
        artist: &CanonicalArtist,
        method: MatchMethod,
        confidence: f64,
    ) -> Result<ResolveOutcome> {
        self.db.insert_mapping(&SourceMapEntry::new(
            &record.source_system,
            &record.source_record_id,
            artist.id,
            confidence,
            method,
        ))?;
        self.attach(&artist.id, record, payload, confidence)?;

        let log = self.log(
            "merged",
            record,
            Some(artist.id),
            json!({
                "method": method.name(),
                "score": confidence,
                "slug": artist.slug,
            }),
        )?;
        Ok(ResolveOutcome {
            resolution: Resolution::Merged(artist.id),
            log,
        })
    }

    fn flag(
        &self,
        record: &SourceRecord,
        artist: &CanonicalArtist,
        best: f64,
    ) -> Result<ResolveOutcome> {
        let reason = MatchReason::new(
            "name-overlap",
            format!("{best:.2} against {}", artist.name),
        );
        // Re-running a migration before anyone reviewed the last run
        // must not file the same candidate again; refresh it instead.
        let candidate_id = match self.db.find_pending_candidate_id(
            &artist.id,
            &record.source_system,
            &record.source_record_id,
        )? {
            Some(id) => {
                self.db
                    .refresh_merge_candidate(id, best, std::slice::from_ref(&reason))?;
                id
            }
            None => {
                let candidate = MergeCandidate::new(
                    artist.id,
                    record.display_name.trim(),
                    &record.source_system,
                    &record.source_record_id,
                    best,
                )
                .with_reason(reason);
                self.db.insert_merge_candidate(&candidate)?
            }
        };
        self.db.set_artist_needs_review(&artist.id, true)?;

        let log = self.log(
            "flagged",
            record,
            Some(artist.id),
            json!({"score": best, "candidate_id": candidate_id}),
        )?;
        Ok(ResolveOutcome {
            resolution: Resolution::Flagged {
                artist_id: artist.id,
                candidate_id,
            },
            log,
        })
    }

    fn create(
        &self,
        record: &SourceRecord,
        payload: &ArtistPayload,
        name: &str,
    ) -> Result<ResolveOutcome> {
        let mut artist = CanonicalArtist::new(name).with_location(
            payload.city.clone(),
            payload.country.clone(),
            payload.region.clone(),
        );
        artist.real_name = payload.real_name.clone();
        artist.active_years = payload.active_years.clone();
        artist.popularity_rank = payload.popularity_rank;

        match self.db.insert_artist(&artist) {
            Ok(()) => {}
            // Lost a slug race: another writer created this artist
            // between our lookup and our insert. Link to the winner.
            Err(e) if e.is_constraint_violation() => {
                if let Some(existing) = self.db.find_artist_by_slug(&artist.slug)? {
                    return self.link(record, payload, &existing, MatchMethod::Slug, 1.0);
                }
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        }

        self.db.insert_mapping(&SourceMapEntry::new(
            &record.source_system,
            &record.source_record_id,
            artist.id,
            1.0,
            MatchMethod::NewCreation,
        ))?;
        self.attach(&artist.id, record, payload, 1.0)?;

        let log = self.log(
            "created",
            record,
            Some(artist.id),
            json!({"slug": artist.slug}),
        )?;
        Ok(ResolveOutcome {
            resolution: Resolution::Created(artist.id),
            log,
        })
    }

    /// Write the per-source data for an artist: profile upsert, photo
    /// attribution, gear replacement, alias capture, timestamp bump.
    fn attach(
        &self,
        artist_id: &ArtistId,
        record: &SourceRecord,
        payload: &ArtistPayload,
        confidence: f64,
    ) -> Result<()> {
        let mut profile =
            ArtistProfile::new(*artist_id, &record.source_system, &record.source_record_id);
        profile.bio = payload.bio.clone();
        profile.short_bio = payload.short_bio.clone();
        profile.labels = payload.labels.clone();
        profile.collaborators = payload.collaborators.clone();
        profile.influences = payload.influences.clone();
        profile.crews = payload.crews.clone();
        profile.subgenres = payload.subgenres.clone();
        profile.tags = payload.tags.clone();
        profile.top_tracks = payload.top_tracks.clone();
        profile.career_highlights = payload.career_highlights.clone();
        profile.releases = payload.releases.clone();
        profile.source_priority = self.priorities.priority_for(&record.source_system);
        profile.confidence = confidence;
        profile.raw_payload = payload.raw.clone();
        self.db.upsert_profile(&profile)?;

        if let Some(photo) = &payload.photo {
            let mut asset = ArtistAsset::new(
                *artist_id,
                AssetType::Photo,
                &photo.url,
                &record.source_system,
            );
            asset.author = photo.author.clone();
            asset.license = photo.license.clone();
            asset.source_page = photo.source_page.clone();
            // First photo in wins the primary slot; later ones are
            // alternates until someone repicks manually.
            asset.is_primary = !self.db.has_primary_asset(artist_id, AssetType::Photo)?;
            self.db.upsert_asset(&asset)?;
        }

        if !payload.gear.is_empty() {
            let gear: Vec<GearItem> = payload
                .gear
                .iter()
                .map(|g| {
                    let mut item =
                        GearItem::new(*artist_id, &g.category, &g.item, &record.source_system);
                    item.rider_notes = g.rider_notes.clone();
                    item
                })
                .collect();
            self.db
                .replace_gear_for_source(artist_id, &record.source_system, &gear)?;
        }

        if let Some(artist) = self.db.get_artist(artist_id)? {
            let incoming = record.display_name.trim();
            if !incoming.is_empty() && incoming != artist.name {
                self.db.insert_alias(artist_id, incoming, "source-name")?;
            }
            if let Some(real_name) = &payload.real_name {
                if real_name != &artist.name {
                    self.db.insert_alias(artist_id, real_name, "real-name")?;
                }
            }
        }
        self.db.touch_artist(artist_id)?;
        Ok(())
    }

    fn log(
        &self,
        operation: &str,
        record: &SourceRecord,
        artist_id: Option<ArtistId>,
        detail: serde_json::Value,
    ) -> Result<MigrationLogEntry> {
        let mut entry = MigrationLogEntry::new(
            operation,
            &record.source_system,
            &record.source_record_id,
        )
        .with_detail(detail);
        if let Some(id) = artist_id {
            entry = entry.for_artist(id);
        }
        self.db.append_migration_log(&entry)?;
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineup_core::model::CandidateStatus;
    use serde_json::json;

    fn record(system: &str, id: &str, name: &str, payload: serde_json::Value) -> SourceRecord {
        SourceRecord {
            source_system: system.to_string(),
            source_record_id: id.to_string(),
            display_name: name.to_string(),
            payload,
        }
    }

    #[test]
    fn test_unknown_record_creates_artist() {
        let db = Database::open_in_memory().unwrap();
        let engine = ResolutionEngine::new(&db);

        let outcome = engine
            .resolve(&record(
                "legacy",
                "jm-1",
                "Jeff Mills",
                json!({"bio": "Detroit techno pioneer", "city": "Detroit"}),
            ))
            .unwrap();

        let Resolution::Created(id) = outcome.resolution else {
            panic!("expected creation, got {:?}", outcome.resolution);
        };
        let artist = db.get_artist(&id).unwrap().unwrap();
        assert_eq!(artist.slug, "jeff-mills");
        assert_eq!(artist.city.as_deref(), Some("Detroit"));

        let mapping = db.find_mapping("legacy", "jm-1").unwrap().unwrap();
        assert_eq!(mapping.method, MatchMethod::NewCreation);
        assert_eq!(mapping.artist_id, id);

        let profiles = db.list_profiles_for_artist(&id).unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].bio.as_deref(), Some("Detroit techno pioneer"));
        assert_eq!(profiles[0].source_priority, 80);

        assert_eq!(outcome.log.operation, "created");
        assert_eq!(db.count_migration_log().unwrap(), 1);
    }

    #[test]
    fn test_second_ingest_updates_in_place() {
        let db = Database::open_in_memory().unwrap();
        let engine = ResolutionEngine::new(&db);

        let first = record("legacy", "jm-1", "Jeff Mills", json!({"bio": "v1"}));
        engine.resolve(&first).unwrap();

        let second = record("legacy", "jm-1", "Jeff Mills", json!({"bio": "v2"}));
        let outcome = engine.resolve(&second).unwrap();

        assert!(matches!(outcome.resolution, Resolution::Updated(_)));
        assert_eq!(db.count_artists().unwrap(), 1);
        assert_eq!(db.count_mappings().unwrap(), 1);

        let profiles = db
            .list_profiles_for_artist(&outcome.resolution.artist_id())
            .unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].bio.as_deref(), Some("v2"));
    }

    #[test]
    fn test_slug_match_merges_across_sources() {
        let db = Database::open_in_memory().unwrap();
        let engine = ResolutionEngine::new(&db);

        let created = engine
            .resolve(&record("legacy", "jm-1", "Jeff Mills", json!({})))
            .unwrap();
        let outcome = engine
            .resolve(&record("rag", "42", "Jeff Mills", json!({})))
            .unwrap();

        assert_eq!(
            outcome.resolution,
            Resolution::Merged(created.resolution.artist_id())
        );
        let mapping = db.find_mapping("rag", "42").unwrap().unwrap();
        assert_eq!(mapping.method, MatchMethod::Slug);
        assert_eq!(mapping.confidence, 1.0);
        assert_eq!(db.count_artists().unwrap(), 1);
        assert_eq!(outcome.log.operation, "merged");
    }

    #[test]
    fn test_exact_name_when_slugs_differ() {
        let db = Database::open_in_memory().unwrap();
        let engine = ResolutionEngine::new(&db);

        // "JeffMills" slugs to "jeffmills", "Jeff-Mills" to "jeff-mills";
        // their normal forms are identical.
        engine
            .resolve(&record("legacy", "jm-1", "JeffMills", json!({})))
            .unwrap();
        let outcome = engine
            .resolve(&record("rag", "42", "Jeff-Mills", json!({})))
            .unwrap();

        assert!(matches!(outcome.resolution, Resolution::Merged(_)));
        let mapping = db.find_mapping("rag", "42").unwrap().unwrap();
        assert_eq!(mapping.method, MatchMethod::ExactName);
        assert_eq!(db.count_artists().unwrap(), 1);
    }

    #[test]
    fn test_ambiguous_score_flags_for_review() {
        let db = Database::open_in_memory().unwrap();
        let engine = ResolutionEngine::new(&db);

        let created = engine
            .resolve(&record("legacy", "jm-1", "Jeff Mills", json!({})))
            .unwrap();
        // "Jeff Malone" vs "Jeff Mills": 8 of its chars occur in the
        // longer normal form of length 11, ~0.73, the review band.
        let outcome = engine
            .resolve(&record("rag", "42", "Jeff Malone", json!({})))
            .unwrap();

        let Resolution::Flagged {
            artist_id,
            candidate_id,
        } = outcome.resolution
        else {
            panic!("expected flag, got {:?}", outcome.resolution);
        };
        assert_eq!(artist_id, created.resolution.artist_id());

        // No link, no second artist, but a pending candidate and the
        // review flag on the existing artist.
        assert!(db.find_mapping("rag", "42").unwrap().is_none());
        assert_eq!(db.count_artists().unwrap(), 1);
        let candidate = db.get_merge_candidate(candidate_id).unwrap().unwrap();
        assert_eq!(candidate.status, CandidateStatus::Pending);
        assert_eq!(candidate.candidate_name, "Jeff Malone");
        assert!(db.get_artist(&artist_id).unwrap().unwrap().needs_review);
        assert_eq!(outcome.log.operation, "flagged");
    }

    #[test]
    fn test_rerun_refreshes_candidate_instead_of_duplicating() {
        let db = Database::open_in_memory().unwrap();
        let engine = ResolutionEngine::new(&db);

        engine
            .resolve(&record("legacy", "jm-1", "Jeff Mills", json!({})))
            .unwrap();
        let first = engine
            .resolve(&record("rag", "42", "Jeff Malone", json!({})))
            .unwrap();
        // Second pass over the same staged record, still unreviewed.
        let second = engine
            .resolve(&record("rag", "42", "Jeff Malone", json!({})))
            .unwrap();

        let Resolution::Flagged { candidate_id, .. } = first.resolution else {
            panic!("expected flag, got {:?}", first.resolution);
        };
        let Resolution::Flagged {
            candidate_id: rerun_id,
            ..
        } = second.resolution
        else {
            panic!("expected flag, got {:?}", second.resolution);
        };

        assert_eq!(rerun_id, candidate_id);
        assert_eq!(db.count_pending_candidates().unwrap(), 1);
        let candidate = db.get_merge_candidate(candidate_id).unwrap().unwrap();
        assert_eq!(candidate.reasons.len(), 1);

        // Once rejected, a later run files a fresh candidate.
        db.reject_merge_candidate(candidate_id).unwrap();
        let third = engine
            .resolve(&record("rag", "42", "Jeff Malone", json!({})))
            .unwrap();
        let Resolution::Flagged {
            candidate_id: fresh_id,
            ..
        } = third.resolution
        else {
            panic!("expected flag, got {:?}", third.resolution);
        };
        assert_ne!(fresh_id, candidate_id);
        assert_eq!(db.count_pending_candidates().unwrap(), 1);
    }

    #[test]
    fn test_unrelated_name_creates_second_artist() {
        let db = Database::open_in_memory().unwrap();
        let engine = ResolutionEngine::new(&db);

        engine
            .resolve(&record("legacy", "jm-1", "Jeff Mills", json!({})))
            .unwrap();
        let outcome = engine
            .resolve(&record("legacy", "cc-1", "Carl Cox", json!({})))
            .unwrap();

        assert!(matches!(outcome.resolution, Resolution::Created(_)));
        assert_eq!(db.count_artists().unwrap(), 2);
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let engine = ResolutionEngine::new(&db);

        let err = engine
            .resolve(&record("legacy", "x-1", "   ", json!({})))
            .unwrap_err();
        assert!(matches!(err, Error::MissingName { .. }));
        assert_eq!(db.count_artists().unwrap(), 0);
        assert_eq!(db.count_migration_log().unwrap(), 0);
    }

    #[test]
    fn test_first_photo_becomes_primary() {
        let db = Database::open_in_memory().unwrap();
        let engine = ResolutionEngine::new(&db);

        let outcome = engine
            .resolve(&record(
                "sync",
                "p-1",
                "Jeff Mills",
                json!({"photo": {"src": "https://cdn/a.jpg"}}),
            ))
            .unwrap();
        engine
            .resolve(&record(
                "sync",
                "p-2",
                "Jeff Mills",
                json!({"photo": {"src": "https://cdn/b.jpg"}}),
            ))
            .unwrap();

        let assets = db
            .list_assets_for_artist(&outcome.resolution.artist_id())
            .unwrap();
        assert_eq!(assets.len(), 2);
        assert!(assets[0].is_primary);
        assert_eq!(assets[0].url, "https://cdn/a.jpg");
        assert!(!assets[1].is_primary);
    }

    #[test]
    fn test_alias_recorded_for_variant_name() {
        let db = Database::open_in_memory().unwrap();
        let engine = ResolutionEngine::new(&db);

        let created = engine
            .resolve(&record("legacy", "jm-1", "Jeff Mills", json!({})))
            .unwrap();
        engine
            .resolve(&record("sync", "p-1", "JEFF MILLS", json!({})))
            .unwrap();

        let aliases = db
            .list_aliases_for_artist(&created.resolution.artist_id())
            .unwrap();
        assert_eq!(aliases, vec![("JEFF MILLS".to_string(), "source-name".to_string())]);
    }

    #[test]
    fn test_distinct_real_name_becomes_alias() {
        let db = Database::open_in_memory().unwrap();
        let engine = ResolutionEngine::new(&db);

        let outcome = engine
            .resolve(&record(
                "legacy",
                "pk-1",
                "Plastikman",
                json!({"real_name": "Richie Hawtin"}),
            ))
            .unwrap();

        let aliases = db
            .list_aliases_for_artist(&outcome.resolution.artist_id())
            .unwrap();
        assert_eq!(
            aliases,
            vec![("Richie Hawtin".to_string(), "real-name".to_string())]
        );
    }

    #[test]
    fn test_gear_attached_from_payload() {
        let db = Database::open_in_memory().unwrap();
        let engine = ResolutionEngine::new(&db);

        let outcome = engine
            .resolve(&record(
                "legacy",
                "jm-1",
                "Jeff Mills",
                json!({"gear": [{"category": "drum-machine", "item": "TR-909"}]}),
            ))
            .unwrap();

        let gear = db
            .list_gear_for_artist(&outcome.resolution.artist_id())
            .unwrap();
        assert_eq!(gear.len(), 1);
        assert_eq!(gear[0].item, "TR-909");
        assert_eq!(gear[0].source_system, "legacy");
    }
}
