/// A schema migration.
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

const MIGRATION_001: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Canonical artists: one row per real-world identity.
-- The slug is the only externally addressable key.
CREATE TABLE IF NOT EXISTS canonical_artists (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    sort_name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    real_name TEXT,
    city TEXT,
    country TEXT,
    region TEXT,
    active_years TEXT,
    popularity_rank INTEGER,
    is_active INTEGER NOT NULL DEFAULT 1,
    needs_review INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_artists_slug ON canonical_artists(slug);
CREATE INDEX IF NOT EXISTS idx_artists_sort_name ON canonical_artists(sort_name);

-- Per-source profile data. Re-ingesting the same source record updates
-- the row, never duplicates it.
CREATE TABLE IF NOT EXISTS artist_profiles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    artist_id TEXT NOT NULL REFERENCES canonical_artists(id),
    bio TEXT,
    short_bio TEXT,
    labels TEXT NOT NULL DEFAULT '[]',
    collaborators TEXT NOT NULL DEFAULT '[]',
    influences TEXT NOT NULL DEFAULT '[]',
    crews TEXT NOT NULL DEFAULT '[]',
    subgenres TEXT NOT NULL DEFAULT '[]',
    tags TEXT NOT NULL DEFAULT '[]',
    top_tracks TEXT NOT NULL DEFAULT '[]',
    career_highlights TEXT NOT NULL DEFAULT '[]',
    releases TEXT NOT NULL DEFAULT '[]',
    source_system TEXT NOT NULL,
    source_record_id TEXT NOT NULL,
    source_priority INTEGER NOT NULL,
    confidence REAL NOT NULL,
    raw_payload TEXT NOT NULL DEFAULT 'null',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (artist_id, source_system, source_record_id)
);

CREATE INDEX IF NOT EXISTS idx_profiles_artist_id ON artist_profiles(artist_id);

-- Media attributions. One primary per (artist, type) is enforced by
-- the resolution engine's write logic, not here.
CREATE TABLE IF NOT EXISTS artist_assets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    artist_id TEXT NOT NULL REFERENCES canonical_artists(id),
    asset_type TEXT NOT NULL,
    url TEXT NOT NULL,
    author TEXT,
    license TEXT,
    source_page TEXT,
    source_system TEXT NOT NULL,
    is_primary INTEGER NOT NULL DEFAULT 0,
    UNIQUE (artist_id, asset_type, url)
);

CREATE INDEX IF NOT EXISTS idx_assets_artist_id ON artist_assets(artist_id);

-- Gear and rider data, consolidated by the projector.
CREATE TABLE IF NOT EXISTS artist_gear (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    artist_id TEXT NOT NULL REFERENCES canonical_artists(id),
    category TEXT NOT NULL,
    item TEXT NOT NULL,
    rider_notes TEXT,
    source_system TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_gear_artist_id ON artist_gear(artist_id);

-- Alternate names (real names, stage-name variants).
CREATE TABLE IF NOT EXISTS artist_aliases (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    artist_id TEXT NOT NULL REFERENCES canonical_artists(id),
    alias TEXT NOT NULL,
    kind TEXT NOT NULL,
    UNIQUE (artist_id, alias)
);

-- The identity graph: each source record points at exactly one
-- canonical artist. Consulted before any new-artist creation.
CREATE TABLE IF NOT EXISTS artist_source_map (
    source_system TEXT NOT NULL,
    source_record_id TEXT NOT NULL,
    artist_id TEXT NOT NULL REFERENCES canonical_artists(id),
    confidence REAL NOT NULL,
    match_method TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (source_system, source_record_id)
);

CREATE INDEX IF NOT EXISTS idx_source_map_artist_id ON artist_source_map(artist_id);

-- Pending human-review items; never auto-resolved by the engine.
CREATE TABLE IF NOT EXISTS artist_merge_candidates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    artist_id TEXT NOT NULL REFERENCES canonical_artists(id),
    candidate_name TEXT NOT NULL,
    source_system TEXT NOT NULL,
    source_record_id TEXT NOT NULL,
    score REAL NOT NULL,
    reasons TEXT NOT NULL DEFAULT '[]',
    status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_candidates_status ON artist_merge_candidates(status);

-- Append-only audit trail; write-only during resolution.
CREATE TABLE IF NOT EXISTS artist_migration_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    operation TEXT NOT NULL,
    source_system TEXT NOT NULL,
    source_record_id TEXT NOT NULL,
    artist_id TEXT,
    detail TEXT NOT NULL DEFAULT 'null',
    created_at TEXT NOT NULL
);

-- Staging relation loaded by the sync/export jobs; the migration
-- runner pages over it.
CREATE TABLE IF NOT EXISTS source_records (
    source_system TEXT NOT NULL,
    source_record_id TEXT NOT NULL,
    display_name TEXT NOT NULL,
    payload TEXT NOT NULL DEFAULT 'null',
    PRIMARY KEY (source_system, source_record_id)
);
"#;

pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: MIGRATION_001,
}];
