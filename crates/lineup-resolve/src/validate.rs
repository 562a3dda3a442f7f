//! Referential-integrity checks over the canonical store.
//!
//! These catch damage the schema's constraints cannot express (most of
//! them involve rows orphaned by out-of-band edits). Findings are
//! reported, never repaired automatically.

use lineup_core::schema::Database;
use serde::Serialize;

use crate::error::Result;

/// Pending candidates older than this many days are reported as stale.
const STALE_CANDIDATE_DAYS: i64 = 30;

/// One integrity problem found in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Machine-readable check identifier.
    pub code: &'static str,
    pub detail: String,
}

impl Finding {
    fn new(code: &'static str, detail: String) -> Self {
        Self { code, detail }
    }
}

/// Run every integrity check and collect the findings. An empty result
/// means the store is consistent.
pub fn check(db: &Database) -> Result<Vec<Finding>> {
    let mut findings = Vec::new();

    duplicate_slugs(db, &mut findings)?;
    orphans(
        db,
        "orphan-profile",
        "artist_profiles",
        "source_system || '/' || source_record_id",
        &mut findings,
    )?;
    orphans(
        db,
        "orphan-mapping",
        "artist_source_map",
        "source_system || '/' || source_record_id",
        &mut findings,
    )?;
    orphans(
        db,
        "orphan-candidate",
        "artist_merge_candidates",
        "CAST(id AS TEXT)",
        &mut findings,
    )?;
    orphans(db, "orphan-asset", "artist_assets", "url", &mut findings)?;
    orphans(db, "orphan-gear", "artist_gear", "item", &mut findings)?;
    duplicate_primary_assets(db, &mut findings)?;
    confidence_bounds(db, &mut findings)?;
    stale_review_flags(db, &mut findings)?;
    stale_pending_candidates(db, &mut findings)?;

    Ok(findings)
}

/// Slugs that collide case-insensitively. The UNIQUE constraint
/// compares bytes, so a hand-edited slug that differs only in case
/// slips past it and shadows the lowercase original.
fn duplicate_slugs(db: &Database, findings: &mut Vec<Finding>) -> lineup_core::Result<()> {
    let mut stmt = db.conn().prepare(
        "SELECT lower(slug), COUNT(*) FROM canonical_artists
         GROUP BY lower(slug) HAVING COUNT(*) > 1",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for (slug, count) in rows {
        findings.push(Finding::new(
            "duplicate-slug",
            format!("{count} artists share the slug {slug}"),
        ));
    }
    Ok(())
}

/// Rows in a child relation whose artist_id no longer exists.
fn orphans(
    db: &Database,
    code: &'static str,
    table: &str,
    label_expr: &str,
    findings: &mut Vec<Finding>,
) -> lineup_core::Result<()> {
    let sql = format!(
        "SELECT {label_expr} FROM {table} t
         WHERE NOT EXISTS (SELECT 1 FROM canonical_artists a WHERE a.id = t.artist_id)"
    );
    let mut stmt = db.conn().prepare(&sql)?;
    let labels = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for label in labels {
        findings.push(Finding::new(
            code,
            format!("{table} row {label} references a missing artist"),
        ));
    }
    Ok(())
}

/// More than one primary asset per (artist, asset type).
fn duplicate_primary_assets(
    db: &Database,
    findings: &mut Vec<Finding>,
) -> lineup_core::Result<()> {
    let mut stmt = db.conn().prepare(
        "SELECT artist_id, asset_type, COUNT(*) FROM artist_assets
         WHERE is_primary = 1
         GROUP BY artist_id, asset_type
         HAVING COUNT(*) > 1",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for (artist_id, asset_type, count) in rows {
        findings.push(Finding::new(
            "duplicate-primary-asset",
            format!("artist {artist_id} has {count} primary {asset_type} assets"),
        ));
    }
    Ok(())
}

/// Mapping and profile confidences outside `[0, 1]`.
fn confidence_bounds(db: &Database, findings: &mut Vec<Finding>) -> lineup_core::Result<()> {
    for table in ["artist_source_map", "artist_profiles"] {
        let mut stmt = db.conn().prepare(&format!(
            "SELECT source_system, source_record_id, confidence FROM {table}
             WHERE confidence < 0.0 OR confidence > 1.0"
        ))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for (system, record_id, confidence) in rows {
            findings.push(Finding::new(
                "confidence-out-of-range",
                format!("{table} row {system}/{record_id} has confidence {confidence}"),
            ));
        }
    }
    Ok(())
}

/// Pending merge candidates nobody has reviewed for a long time.
fn stale_pending_candidates(db: &Database, findings: &mut Vec<Finding>) -> lineup_core::Result<()> {
    let cutoff = (chrono::Utc::now() - chrono::Duration::days(STALE_CANDIDATE_DAYS)).to_rfc3339();
    let mut stmt = db.conn().prepare(
        "SELECT id, candidate_name, created_at FROM artist_merge_candidates
         WHERE status = 'pending' AND created_at < ?1
         ORDER BY created_at",
    )?;
    let rows = stmt
        .query_map([cutoff], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for (id, name, created_at) in rows {
        findings.push(Finding::new(
            "stale-pending-candidate",
            format!("candidate #{id} ({name}) has been pending since {created_at}"),
        ));
    }
    Ok(())
}

/// Artists still flagged for review with no pending candidate left.
fn stale_review_flags(db: &Database, findings: &mut Vec<Finding>) -> lineup_core::Result<()> {
    let mut stmt = db.conn().prepare(
        "SELECT slug FROM canonical_artists a
         WHERE a.needs_review = 1
           AND NOT EXISTS (
             SELECT 1 FROM artist_merge_candidates c
             WHERE c.artist_id = a.id AND c.status = 'pending'
           )",
    )?;
    let slugs = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for slug in slugs {
        findings.push(Finding::new(
            "stale-review-flag",
            format!("artist {slug} is flagged for review but has no pending candidate"),
        ));
    }
    Ok(())
}
