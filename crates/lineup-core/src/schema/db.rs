use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use uuid::Uuid;

use crate::error::Result;
use crate::model::{
    ArtistAsset, ArtistId, ArtistProfile, AssetType, CanonicalArtist, CandidateStatus, GearItem,
    MatchMethod, MatchReason, MergeCandidate, MigrationLogEntry, SourceMapEntry, SourceRecord,
};

use super::migrations::MIGRATIONS;

/// A database connection with narrow read/write methods for every
/// canonical relation.
///
/// This is the sole I/O boundary of the core. The resolution engine,
/// runner, and projector all go through these methods; tests run them
/// against [`Database::open_in_memory`], which exercises the real
/// constraints (slug uniqueness included).
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }
}

// Transaction control for the migration runner. Dry runs wrap a whole
// run in one deferred transaction and roll it back; committing runs
// commit per page.
impl Database {
    pub fn begin_deferred(&self) -> Result<()> {
        self.conn.execute_batch("BEGIN DEFERRED")?;
        Ok(())
    }

    pub fn commit(&self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    pub fn rollback(&self) -> Result<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    /// Open a named savepoint. Used to isolate per-record failures
    /// inside a page transaction.
    pub fn savepoint(&self, name: &str) -> Result<()> {
        self.conn.execute_batch(&format!("SAVEPOINT {name}"))?;
        Ok(())
    }

    pub fn release_savepoint(&self, name: &str) -> Result<()> {
        self.conn.execute_batch(&format!("RELEASE SAVEPOINT {name}"))?;
        Ok(())
    }

    /// Undo everything since the savepoint, then release it.
    pub fn rollback_to_savepoint(&self, name: &str) -> Result<()> {
        self.conn
            .execute_batch(&format!("ROLLBACK TO SAVEPOINT {name}; RELEASE SAVEPOINT {name}"))?;
        Ok(())
    }
}

// Canonical artist CRUD
impl Database {
    /// Insert a new canonical artist.
    ///
    /// Fails with a constraint violation if the slug already exists;
    /// the resolution engine converts that into a lookup retry.
    pub fn insert_artist(&self, artist: &CanonicalArtist) -> Result<()> {
        self.conn.execute(
            "INSERT INTO canonical_artists (
                id, name, sort_name, slug, real_name, city, country, region,
                active_years, popularity_rank, is_active, needs_review,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            rusqlite::params![
                artist.id.to_string(),
                artist.name,
                artist.sort_name,
                artist.slug,
                artist.real_name,
                artist.city,
                artist.country,
                artist.region,
                artist.active_years,
                artist.popularity_rank.map(i64::from),
                artist.is_active,
                artist.needs_review,
                artist.created_at.to_rfc3339(),
                artist.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn find_artist_by_slug(&self, slug: &str) -> Result<Option<CanonicalArtist>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ARTIST_COLUMNS} FROM canonical_artists WHERE slug = ?1"
        ))?;
        let artist = stmt.query_row([slug], row_to_artist).optional()?;
        Ok(artist)
    }

    pub fn get_artist(&self, id: &ArtistId) -> Result<Option<CanonicalArtist>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ARTIST_COLUMNS} FROM canonical_artists WHERE id = ?1"
        ))?;
        let artist = stmt
            .query_row([id.to_string()], row_to_artist)
            .optional()?;
        Ok(artist)
    }

    /// All canonical artists in deterministic slug order.
    pub fn list_artists(&self) -> Result<Vec<CanonicalArtist>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ARTIST_COLUMNS} FROM canonical_artists ORDER BY slug"
        ))?;
        let artists = stmt
            .query_map([], row_to_artist)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(artists)
    }

    /// Canonical artists whose slug starts with the given prefix, in
    /// slug order. Used to bound the fuzzy scan on large catalogs.
    pub fn list_artists_with_slug_prefix(&self, prefix: &str) -> Result<Vec<CanonicalArtist>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ARTIST_COLUMNS} FROM canonical_artists WHERE slug LIKE ?1 ORDER BY slug"
        ))?;
        let pattern = format!("{}%", prefix.replace('%', "").replace('_', ""));
        let artists = stmt
            .query_map([pattern], row_to_artist)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(artists)
    }

    pub fn count_artists(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM canonical_artists", [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }

    /// Flip the needs-review flag, bumping the update timestamp.
    pub fn set_artist_needs_review(&self, id: &ArtistId, needs_review: bool) -> Result<()> {
        self.conn.execute(
            "UPDATE canonical_artists SET needs_review = ?2, updated_at = ?3 WHERE id = ?1",
            rusqlite::params![id.to_string(), needs_review, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Bump an artist's update timestamp after attaching source data.
    pub fn touch_artist(&self, id: &ArtistId) -> Result<()> {
        self.conn.execute(
            "UPDATE canonical_artists SET updated_at = ?2 WHERE id = ?1",
            rusqlite::params![id.to_string(), Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

// Profile CRUD
impl Database {
    /// Insert or update the profile for a (artist, source record) pair.
    ///
    /// The UNIQUE constraint makes re-ingestion an update; created_at
    /// is preserved on conflict.
    pub fn upsert_profile(&self, profile: &ArtistProfile) -> Result<()> {
        self.conn.execute(
            "INSERT INTO artist_profiles (
                artist_id, bio, short_bio, labels, collaborators, influences,
                crews, subgenres, tags, top_tracks, career_highlights, releases,
                source_system, source_record_id, source_priority, confidence,
                raw_payload, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)
            ON CONFLICT (artist_id, source_system, source_record_id) DO UPDATE SET
                bio = excluded.bio,
                short_bio = excluded.short_bio,
                labels = excluded.labels,
                collaborators = excluded.collaborators,
                influences = excluded.influences,
                crews = excluded.crews,
                subgenres = excluded.subgenres,
                tags = excluded.tags,
                top_tracks = excluded.top_tracks,
                career_highlights = excluded.career_highlights,
                releases = excluded.releases,
                source_priority = excluded.source_priority,
                confidence = excluded.confidence,
                raw_payload = excluded.raw_payload,
                updated_at = excluded.updated_at",
            rusqlite::params![
                profile.artist_id.to_string(),
                profile.bio,
                profile.short_bio,
                serde_json::to_string(&profile.labels)?,
                serde_json::to_string(&profile.collaborators)?,
                serde_json::to_string(&profile.influences)?,
                serde_json::to_string(&profile.crews)?,
                serde_json::to_string(&profile.subgenres)?,
                serde_json::to_string(&profile.tags)?,
                serde_json::to_string(&profile.top_tracks)?,
                serde_json::to_string(&profile.career_highlights)?,
                serde_json::to_string(&profile.releases)?,
                profile.source_system,
                profile.source_record_id,
                profile.source_priority,
                profile.confidence,
                serde_json::to_string(&profile.raw_payload)?,
                profile.created_at.to_rfc3339(),
                profile.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list_profiles_for_artist(&self, artist_id: &ArtistId) -> Result<Vec<ArtistProfile>> {
        let mut stmt = self.conn.prepare(
            "SELECT artist_id, bio, short_bio, labels, collaborators, influences,
                    crews, subgenres, tags, top_tracks, career_highlights, releases,
                    source_system, source_record_id, source_priority, confidence,
                    raw_payload, created_at, updated_at
             FROM artist_profiles
             WHERE artist_id = ?1
             ORDER BY source_priority DESC, source_system",
        )?;
        let profiles = stmt
            .query_map([artist_id.to_string()], row_to_profile)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(profiles)
    }

    pub fn count_profiles(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM artist_profiles", [], |row| row.get(0))?;
        Ok(count)
    }
}

// Asset and gear CRUD
impl Database {
    /// Whether the artist already has a primary asset of this type.
    pub fn has_primary_asset(&self, artist_id: &ArtistId, asset_type: AssetType) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM artist_assets
             WHERE artist_id = ?1 AND asset_type = ?2 AND is_primary = 1",
            rusqlite::params![artist_id.to_string(), asset_type.name()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Insert or refresh an asset attribution. An existing row for the
    /// same (artist, type, url) keeps its primary flag.
    pub fn upsert_asset(&self, asset: &ArtistAsset) -> Result<()> {
        self.conn.execute(
            "INSERT INTO artist_assets (
                artist_id, asset_type, url, author, license, source_page,
                source_system, is_primary
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (artist_id, asset_type, url) DO UPDATE SET
                author = excluded.author,
                license = excluded.license,
                source_page = excluded.source_page,
                source_system = excluded.source_system",
            rusqlite::params![
                asset.artist_id.to_string(),
                asset.asset_type.name(),
                asset.url,
                asset.author,
                asset.license,
                asset.source_page,
                asset.source_system,
                asset.is_primary,
            ],
        )?;
        Ok(())
    }

    pub fn list_assets_for_artist(&self, artist_id: &ArtistId) -> Result<Vec<ArtistAsset>> {
        let mut stmt = self.conn.prepare(
            "SELECT artist_id, asset_type, url, author, license, source_page,
                    source_system, is_primary
             FROM artist_assets
             WHERE artist_id = ?1
             ORDER BY is_primary DESC, id",
        )?;
        let assets = stmt
            .query_map([artist_id.to_string()], row_to_asset)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(assets)
    }

    /// Replace all gear rows a given source contributed for an artist.
    pub fn replace_gear_for_source(
        &self,
        artist_id: &ArtistId,
        source_system: &str,
        gear: &[GearItem],
    ) -> Result<()> {
        self.conn.execute(
            "DELETE FROM artist_gear WHERE artist_id = ?1 AND source_system = ?2",
            rusqlite::params![artist_id.to_string(), source_system],
        )?;
        for item in gear {
            self.conn.execute(
                "INSERT INTO artist_gear (artist_id, category, item, rider_notes, source_system)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    item.artist_id.to_string(),
                    item.category,
                    item.item,
                    item.rider_notes,
                    item.source_system,
                ],
            )?;
        }
        Ok(())
    }

    pub fn list_gear_for_artist(&self, artist_id: &ArtistId) -> Result<Vec<GearItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT artist_id, category, item, rider_notes, source_system
             FROM artist_gear
             WHERE artist_id = ?1
             ORDER BY category, id",
        )?;
        let gear = stmt
            .query_map([artist_id.to_string()], row_to_gear)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(gear)
    }
}

// Alias CRUD
impl Database {
    /// Record an alternate name. Duplicate aliases are ignored.
    pub fn insert_alias(&self, artist_id: &ArtistId, alias: &str, kind: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO artist_aliases (artist_id, alias, kind)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (artist_id, alias) DO NOTHING",
            rusqlite::params![artist_id.to_string(), alias, kind],
        )?;
        Ok(())
    }

    pub fn list_aliases_for_artist(&self, artist_id: &ArtistId) -> Result<Vec<(String, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT alias, kind FROM artist_aliases WHERE artist_id = ?1 ORDER BY alias",
        )?;
        let aliases = stmt
            .query_map([artist_id.to_string()], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(aliases)
    }
}

// Source map CRUD
impl Database {
    pub fn find_mapping(
        &self,
        source_system: &str,
        source_record_id: &str,
    ) -> Result<Option<SourceMapEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT source_system, source_record_id, artist_id, confidence,
                    match_method, created_at
             FROM artist_source_map
             WHERE source_system = ?1 AND source_record_id = ?2",
        )?;
        let mapping = stmt
            .query_row([source_system, source_record_id], row_to_mapping)
            .optional()?;
        Ok(mapping)
    }

    pub fn insert_mapping(&self, entry: &SourceMapEntry) -> Result<()> {
        self.conn.execute(
            "INSERT INTO artist_source_map (
                source_system, source_record_id, artist_id, confidence,
                match_method, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                entry.source_system,
                entry.source_record_id,
                entry.artist_id.to_string(),
                entry.confidence,
                entry.method.name(),
                entry.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn count_mappings(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM artist_source_map", [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }
}

// Merge candidate CRUD and review actions
impl Database {
    /// Insert a pending merge candidate, returning its row id.
    pub fn insert_merge_candidate(&self, candidate: &MergeCandidate) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO artist_merge_candidates (
                artist_id, candidate_name, source_system, source_record_id,
                score, reasons, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                candidate.artist_id.to_string(),
                candidate.candidate_name,
                candidate.source_system,
                candidate.source_record_id,
                candidate.score,
                serde_json::to_string(&candidate.reasons)?,
                candidate.status.name(),
                candidate.created_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_merge_candidate(&self, id: i64) -> Result<Option<MergeCandidate>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CANDIDATE_COLUMNS} FROM artist_merge_candidates WHERE id = ?1"
        ))?;
        let candidate = stmt.query_row([id], row_to_candidate).optional()?;
        Ok(candidate)
    }

    pub fn list_merge_candidates(
        &self,
        status: Option<CandidateStatus>,
    ) -> Result<Vec<MergeCandidate>> {
        match status {
            Some(status) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {CANDIDATE_COLUMNS} FROM artist_merge_candidates
                     WHERE status = ?1 ORDER BY created_at, id"
                ))?;
                let rows = stmt
                    .query_map([status.name()], row_to_candidate)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {CANDIDATE_COLUMNS} FROM artist_merge_candidates
                     ORDER BY created_at, id"
                ))?;
                let rows = stmt
                    .query_map([], row_to_candidate)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            }
        }
    }

    /// Row id of the pending candidate already filed for this
    /// (artist, source record) pair, if one exists.
    pub fn find_pending_candidate_id(
        &self,
        artist_id: &ArtistId,
        source_system: &str,
        source_record_id: &str,
    ) -> Result<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM artist_merge_candidates
                 WHERE artist_id = ?1 AND source_system = ?2
                   AND source_record_id = ?3 AND status = 'pending'",
                rusqlite::params![artist_id.to_string(), source_system, source_record_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    /// Overwrite the score and reasons of an existing pending candidate.
    pub fn refresh_merge_candidate(
        &self,
        id: i64,
        score: f64,
        reasons: &[MatchReason],
    ) -> Result<()> {
        self.conn.execute(
            "UPDATE artist_merge_candidates SET score = ?2, reasons = ?3
             WHERE id = ?1 AND status = 'pending'",
            rusqlite::params![id, score, serde_json::to_string(reasons)?],
        )?;
        Ok(())
    }

    pub fn count_pending_candidates(&self) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM artist_merge_candidates WHERE status = 'pending'",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Approve a pending candidate: mark it approved and retroactively
    /// insert the source-map row linking the source record to the
    /// artist, in one transaction. Returns the linked artist id.
    pub fn approve_merge_candidate(&self, id: i64) -> Result<ArtistId> {
        let candidate = self
            .get_merge_candidate(id)?
            .ok_or(crate::Error::NotFound {
                entity: "merge candidate",
                id: id.to_string(),
            })?;
        if candidate.status != CandidateStatus::Pending {
            return Err(crate::Error::InvalidData(format!(
                "merge candidate {id} is already {}",
                candidate.status.name()
            )));
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE artist_merge_candidates SET status = 'approved' WHERE id = ?1",
            [id],
        )?;
        tx.execute(
            "INSERT INTO artist_source_map (
                source_system, source_record_id, artist_id, confidence,
                match_method, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                candidate.source_system,
                candidate.source_record_id,
                candidate.artist_id.to_string(),
                candidate.score,
                MatchMethod::FuzzyName.name(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        Ok(candidate.artist_id)
    }

    /// Reject a pending candidate. Only flips status; no link is made.
    pub fn reject_merge_candidate(&self, id: i64) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE artist_merge_candidates SET status = 'rejected'
             WHERE id = ?1 AND status = 'pending'",
            [id],
        )?;
        if updated == 0 {
            return Err(crate::Error::NotFound {
                entity: "pending merge candidate",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

// Migration log
impl Database {
    /// Append an audit-trail entry. Never read back during resolution.
    pub fn append_migration_log(&self, entry: &MigrationLogEntry) -> Result<()> {
        self.conn.execute(
            "INSERT INTO artist_migration_log (
                operation, source_system, source_record_id, artist_id,
                detail, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                entry.operation,
                entry.source_system,
                entry.source_record_id,
                entry.artist_id.map(|id| id.to_string()),
                serde_json::to_string(&entry.detail)?,
                entry.at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn count_migration_log(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM artist_migration_log", [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }

    /// How many audit-trail entries carry the given operation. The
    /// status surface reports these as lifetime run totals.
    pub fn count_migration_log_operation(&self, operation: &str) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM artist_migration_log WHERE operation = ?1",
            [operation],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

// Staging relation the migration runner pages over
impl Database {
    /// Stage (or restage) a source record for resolution.
    pub fn stage_source_record(&self, record: &SourceRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO source_records (source_system, source_record_id, display_name, payload)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (source_system, source_record_id) DO UPDATE SET
                display_name = excluded.display_name,
                payload = excluded.payload",
            rusqlite::params![
                record.source_system,
                record.source_record_id,
                record.display_name,
                serde_json::to_string(&record.payload)?,
            ],
        )?;
        Ok(())
    }

    /// One page of staged records for a source system, in stable
    /// record-id order.
    pub fn fetch_source_page(
        &self,
        source_system: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<SourceRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT source_system, source_record_id, display_name, payload
             FROM source_records
             WHERE source_system = ?1
             ORDER BY source_record_id
             LIMIT ?2 OFFSET ?3",
        )?;
        let records = stmt
            .query_map(
                rusqlite::params![source_system, limit as i64, offset as i64],
                row_to_source_record,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    pub fn count_source_records(&self, source_system: &str) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM source_records WHERE source_system = ?1",
            [source_system],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

// ---------------------------------------------------------------------------
// Row mappers
// ---------------------------------------------------------------------------

const ARTIST_COLUMNS: &str = "id, name, sort_name, slug, real_name, city, country, region, \
     active_years, popularity_rank, is_active, needs_review, created_at, updated_at";

const CANDIDATE_COLUMNS: &str = "id, artist_id, candidate_name, source_system, source_record_id, \
     score, reasons, status, created_at";

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(Into::into)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn parse_artist_id(idx: usize, value: &str) -> rusqlite::Result<ArtistId> {
    Uuid::parse_str(value).map(ArtistId::from_uuid).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_json<T: serde::de::DeserializeOwned + Default>(value: &str) -> T {
    serde_json::from_str(value).unwrap_or_default()
}

fn row_to_artist(row: &rusqlite::Row) -> rusqlite::Result<CanonicalArtist> {
    Ok(CanonicalArtist {
        id: parse_artist_id(0, &row.get::<_, String>(0)?)?,
        name: row.get(1)?,
        sort_name: row.get(2)?,
        slug: row.get(3)?,
        real_name: row.get(4)?,
        city: row.get(5)?,
        country: row.get(6)?,
        region: row.get(7)?,
        active_years: row.get(8)?,
        popularity_rank: row
            .get::<_, Option<i64>>(9)?
            .and_then(|v| u32::try_from(v).ok()),
        is_active: row.get(10)?,
        needs_review: row.get(11)?,
        created_at: parse_timestamp(12, &row.get::<_, String>(12)?)?,
        updated_at: parse_timestamp(13, &row.get::<_, String>(13)?)?,
    })
}

fn row_to_profile(row: &rusqlite::Row) -> rusqlite::Result<ArtistProfile> {
    Ok(ArtistProfile {
        artist_id: parse_artist_id(0, &row.get::<_, String>(0)?)?,
        bio: row.get(1)?,
        short_bio: row.get(2)?,
        labels: parse_json(&row.get::<_, String>(3)?),
        collaborators: parse_json(&row.get::<_, String>(4)?),
        influences: parse_json(&row.get::<_, String>(5)?),
        crews: parse_json(&row.get::<_, String>(6)?),
        subgenres: parse_json(&row.get::<_, String>(7)?),
        tags: parse_json(&row.get::<_, String>(8)?),
        top_tracks: parse_json(&row.get::<_, String>(9)?),
        career_highlights: parse_json(&row.get::<_, String>(10)?),
        releases: parse_json(&row.get::<_, String>(11)?),
        source_system: row.get(12)?,
        source_record_id: row.get(13)?,
        source_priority: row.get::<_, i64>(14)?.try_into().unwrap_or(0),
        confidence: row.get(15)?,
        raw_payload: serde_json::from_str(&row.get::<_, String>(16)?)
            .unwrap_or(serde_json::Value::Null),
        created_at: parse_timestamp(17, &row.get::<_, String>(17)?)?,
        updated_at: parse_timestamp(18, &row.get::<_, String>(18)?)?,
    })
}

fn row_to_asset(row: &rusqlite::Row) -> rusqlite::Result<ArtistAsset> {
    let type_str: String = row.get(1)?;
    Ok(ArtistAsset {
        artist_id: parse_artist_id(0, &row.get::<_, String>(0)?)?,
        asset_type: AssetType::parse(&type_str).unwrap_or(AssetType::Photo),
        url: row.get(2)?,
        author: row.get(3)?,
        license: row.get(4)?,
        source_page: row.get(5)?,
        source_system: row.get(6)?,
        is_primary: row.get(7)?,
    })
}

fn row_to_gear(row: &rusqlite::Row) -> rusqlite::Result<GearItem> {
    Ok(GearItem {
        artist_id: parse_artist_id(0, &row.get::<_, String>(0)?)?,
        category: row.get(1)?,
        item: row.get(2)?,
        rider_notes: row.get(3)?,
        source_system: row.get(4)?,
    })
}

fn row_to_mapping(row: &rusqlite::Row) -> rusqlite::Result<SourceMapEntry> {
    let method_str: String = row.get(4)?;
    Ok(SourceMapEntry {
        source_system: row.get(0)?,
        source_record_id: row.get(1)?,
        artist_id: parse_artist_id(2, &row.get::<_, String>(2)?)?,
        confidence: row.get(3)?,
        method: MatchMethod::parse(&method_str).unwrap_or(MatchMethod::FuzzyName),
        created_at: parse_timestamp(5, &row.get::<_, String>(5)?)?,
    })
}

fn row_to_candidate(row: &rusqlite::Row) -> rusqlite::Result<MergeCandidate> {
    let status_str: String = row.get(7)?;
    Ok(MergeCandidate {
        id: Some(row.get(0)?),
        artist_id: parse_artist_id(1, &row.get::<_, String>(1)?)?,
        candidate_name: row.get(2)?,
        source_system: row.get(3)?,
        source_record_id: row.get(4)?,
        score: row.get(5)?,
        reasons: parse_json(&row.get::<_, String>(6)?),
        status: CandidateStatus::parse(&status_str).unwrap_or(CandidateStatus::Pending),
        created_at: parse_timestamp(8, &row.get::<_, String>(8)?)?,
    })
}

fn row_to_source_record(row: &rusqlite::Row) -> rusqlite::Result<SourceRecord> {
    Ok(SourceRecord {
        source_system: row.get(0)?,
        source_record_id: row.get(1)?,
        display_name: row.get(2)?,
        payload: serde_json::from_str(&row.get::<_, String>(3)?)
            .unwrap_or(serde_json::Value::Null),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MatchReason, Release};
    use serde_json::json;

    #[test]
    fn test_database_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_artist_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let artist = CanonicalArtist::new("Jeff Mills").with_real_name("Jeff Mills");
        db.insert_artist(&artist).unwrap();

        let found = db.find_artist_by_slug("jeff-mills").unwrap().unwrap();
        assert_eq!(found.id, artist.id);
        assert_eq!(found.name, "Jeff Mills");
        assert_eq!(found.sort_name, "Mills, Jeff");

        assert!(db.find_artist_by_slug("carl-cox").unwrap().is_none());
    }

    #[test]
    fn test_slug_uniqueness_enforced() {
        let db = Database::open_in_memory().unwrap();
        db.insert_artist(&CanonicalArtist::new("Jeff Mills")).unwrap();

        let err = db
            .insert_artist(&CanonicalArtist::new("Jeff Mills"))
            .unwrap_err();
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn test_profile_upsert_updates_not_duplicates() {
        let db = Database::open_in_memory().unwrap();
        let artist = CanonicalArtist::new("Jeff Mills");
        db.insert_artist(&artist).unwrap();

        let mut profile = ArtistProfile::new(artist.id, "legacy", "jm-1");
        profile.bio = Some("first bio".to_string());
        profile.labels = vec!["Axis".to_string()];
        profile.releases = vec![Release {
            title: "Waveform Transmission Vol. 1".to_string(),
            year: Some(1992),
            label: Some("Tresor".to_string()),
        }];
        db.upsert_profile(&profile).unwrap();

        profile.bio = Some("second bio".to_string());
        db.upsert_profile(&profile).unwrap();

        let profiles = db.list_profiles_for_artist(&artist.id).unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].bio.as_deref(), Some("second bio"));
        assert_eq!(profiles[0].releases[0].year, Some(1992));
    }

    #[test]
    fn test_profiles_listed_priority_descending() {
        let db = Database::open_in_memory().unwrap();
        let artist = CanonicalArtist::new("Jeff Mills");
        db.insert_artist(&artist).unwrap();

        let mut low = ArtistProfile::new(artist.id, "sync", "s-1");
        low.source_priority = 60;
        let mut high = ArtistProfile::new(artist.id, "legacy", "l-1");
        high.source_priority = 80;
        db.upsert_profile(&low).unwrap();
        db.upsert_profile(&high).unwrap();

        let profiles = db.list_profiles_for_artist(&artist.id).unwrap();
        assert_eq!(profiles[0].source_system, "legacy");
        assert_eq!(profiles[1].source_system, "sync");
    }

    #[test]
    fn test_mapping_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let artist = CanonicalArtist::new("Jeff Mills");
        db.insert_artist(&artist).unwrap();

        let entry = SourceMapEntry::new("legacy", "jm-1", artist.id, 1.0, MatchMethod::NewCreation);
        db.insert_mapping(&entry).unwrap();

        let found = db.find_mapping("legacy", "jm-1").unwrap().unwrap();
        assert_eq!(found.artist_id, artist.id);
        assert_eq!(found.method, MatchMethod::NewCreation);
        assert!(db.find_mapping("legacy", "other").unwrap().is_none());

        // Same pair twice is a constraint violation.
        let err = db.insert_mapping(&entry).unwrap_err();
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn test_candidate_approve_inserts_mapping() {
        let db = Database::open_in_memory().unwrap();
        let artist = CanonicalArtist::new("Jeff Mills");
        db.insert_artist(&artist).unwrap();

        let candidate = MergeCandidate::new(artist.id, "Jef Mills", "rag", "42", 0.7)
            .with_reason(MatchReason::new("name-overlap", "0.70"));
        let id = db.insert_merge_candidate(&candidate).unwrap();

        let linked = db.approve_merge_candidate(id).unwrap();
        assert_eq!(linked, artist.id);

        let mapping = db.find_mapping("rag", "42").unwrap().unwrap();
        assert_eq!(mapping.artist_id, artist.id);
        assert_eq!(mapping.confidence, 0.7);

        // A second approval is rejected.
        assert!(db.approve_merge_candidate(id).is_err());
    }

    #[test]
    fn test_candidate_reject_makes_no_link() {
        let db = Database::open_in_memory().unwrap();
        let artist = CanonicalArtist::new("Jeff Mills");
        db.insert_artist(&artist).unwrap();

        let id = db
            .insert_merge_candidate(&MergeCandidate::new(artist.id, "Jef Mills", "rag", "42", 0.7))
            .unwrap();
        db.reject_merge_candidate(id).unwrap();

        assert!(db.find_mapping("rag", "42").unwrap().is_none());
        let candidate = db.get_merge_candidate(id).unwrap().unwrap();
        assert_eq!(candidate.status, CandidateStatus::Rejected);
    }

    #[test]
    fn test_list_merge_candidates_filters_by_status() {
        let db = Database::open_in_memory().unwrap();
        let artist = CanonicalArtist::new("Jeff Mills");
        db.insert_artist(&artist).unwrap();

        let rejected = db
            .insert_merge_candidate(&MergeCandidate::new(artist.id, "Jef Mills", "rag", "42", 0.7))
            .unwrap();
        db.insert_merge_candidate(&MergeCandidate::new(artist.id, "Jeff Milz", "rag", "43", 0.65))
            .unwrap();
        db.reject_merge_candidate(rejected).unwrap();

        assert_eq!(db.list_merge_candidates(None).unwrap().len(), 2);
        let pending = db
            .list_merge_candidates(Some(CandidateStatus::Pending))
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].candidate_name, "Jeff Milz");
    }

    #[test]
    fn test_pending_candidate_lookup_and_refresh() {
        let db = Database::open_in_memory().unwrap();
        let artist = CanonicalArtist::new("Jeff Mills");
        db.insert_artist(&artist).unwrap();

        assert!(db
            .find_pending_candidate_id(&artist.id, "rag", "42")
            .unwrap()
            .is_none());

        let id = db
            .insert_merge_candidate(&MergeCandidate::new(artist.id, "Jef Mills", "rag", "42", 0.7))
            .unwrap();
        assert_eq!(
            db.find_pending_candidate_id(&artist.id, "rag", "42").unwrap(),
            Some(id)
        );

        db.refresh_merge_candidate(id, 0.72, &[MatchReason::new("name-overlap", "0.72")])
            .unwrap();
        let candidate = db.get_merge_candidate(id).unwrap().unwrap();
        assert_eq!(candidate.score, 0.72);
        assert_eq!(candidate.reasons.len(), 1);

        // Resolved candidates stop matching.
        db.reject_merge_candidate(id).unwrap();
        assert!(db
            .find_pending_candidate_id(&artist.id, "rag", "42")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_migration_log_counted_per_operation() {
        let db = Database::open_in_memory().unwrap();
        db.append_migration_log(&MigrationLogEntry::new("created", "legacy", "jm-1"))
            .unwrap();
        db.append_migration_log(&MigrationLogEntry::new("created", "legacy", "cc-1"))
            .unwrap();
        db.append_migration_log(&MigrationLogEntry::new("flagged", "rag", "42"))
            .unwrap();

        assert_eq!(db.count_migration_log().unwrap(), 3);
        assert_eq!(db.count_migration_log_operation("created").unwrap(), 2);
        assert_eq!(db.count_migration_log_operation("flagged").unwrap(), 1);
        assert_eq!(db.count_migration_log_operation("merged").unwrap(), 0);
    }

    #[test]
    fn test_asset_primary_tracking() {
        let db = Database::open_in_memory().unwrap();
        let artist = CanonicalArtist::new("Jeff Mills");
        db.insert_artist(&artist).unwrap();

        assert!(!db.has_primary_asset(&artist.id, AssetType::Photo).unwrap());

        let mut asset = ArtistAsset::new(artist.id, AssetType::Photo, "https://x/a.jpg", "sync");
        asset.is_primary = true;
        db.upsert_asset(&asset).unwrap();

        assert!(db.has_primary_asset(&artist.id, AssetType::Photo).unwrap());

        // Re-upserting the same url keeps the primary flag.
        asset.is_primary = false;
        asset.author = Some("Photographer".to_string());
        db.upsert_asset(&asset).unwrap();
        let assets = db.list_assets_for_artist(&artist.id).unwrap();
        assert_eq!(assets.len(), 1);
        assert!(assets[0].is_primary);
        assert_eq!(assets[0].author.as_deref(), Some("Photographer"));
    }

    #[test]
    fn test_gear_replaced_per_source() {
        let db = Database::open_in_memory().unwrap();
        let artist = CanonicalArtist::new("Jeff Mills");
        db.insert_artist(&artist).unwrap();

        let first = vec![GearItem::new(artist.id, "decks", "CDJ-3000", "legacy")];
        db.replace_gear_for_source(&artist.id, "legacy", &first)
            .unwrap();
        let second = vec![
            GearItem::new(artist.id, "decks", "CDJ-2000NXS2", "legacy"),
            GearItem::new(artist.id, "mixer", "DJM-900", "legacy"),
        ];
        db.replace_gear_for_source(&artist.id, "legacy", &second)
            .unwrap();

        let gear = db.list_gear_for_artist(&artist.id).unwrap();
        assert_eq!(gear.len(), 2);
        assert!(gear.iter().all(|g| g.item != "CDJ-3000"));
    }

    #[test]
    fn test_source_record_paging() {
        let db = Database::open_in_memory().unwrap();
        for i in 0..5 {
            db.stage_source_record(&SourceRecord {
                source_system: "legacy".to_string(),
                source_record_id: format!("r-{i}"),
                display_name: format!("Artist {i}"),
                payload: json!({"n": i}),
            })
            .unwrap();
        }

        let page = db.fetch_source_page("legacy", 0, 2).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].source_record_id, "r-0");

        let page = db.fetch_source_page("legacy", 4, 2).unwrap();
        assert_eq!(page.len(), 1);

        assert_eq!(db.count_source_records("legacy").unwrap(), 5);
        assert_eq!(db.count_source_records("rag").unwrap(), 0);
    }

    #[test]
    fn test_transaction_rollback_discards_writes() {
        let db = Database::open_in_memory().unwrap();
        db.begin_deferred().unwrap();
        db.insert_artist(&CanonicalArtist::new("Jeff Mills")).unwrap();
        db.rollback().unwrap();
        assert_eq!(db.count_artists().unwrap(), 0);
    }

    #[test]
    fn test_reopen_preserves_data_and_skips_migrations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lineup.db");

        {
            let db = Database::open(&path).unwrap();
            db.insert_artist(&CanonicalArtist::new("Jeff Mills")).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.count_artists().unwrap(), 1);
        let applied: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(applied, MIGRATIONS.len() as i64);
    }

    #[test]
    fn test_slug_prefix_listing() {
        let db = Database::open_in_memory().unwrap();
        db.insert_artist(&CanonicalArtist::new("Jeff Mills")).unwrap();
        db.insert_artist(&CanonicalArtist::new("Juan Atkins")).unwrap();
        db.insert_artist(&CanonicalArtist::new("Carl Cox")).unwrap();

        let js = db.list_artists_with_slug_prefix("j").unwrap();
        assert_eq!(js.len(), 2);
        assert!(js.iter().all(|a| a.slug.starts_with('j')));
    }
}
