use anyhow::Result;
use lineup_core::schema::Database;
use lineup_resolve::{Config, MigrationReport, MigrationStats};
use std::time::Instant;

/// Print lifetime resolution totals in the same fixed JSON report shape
/// the migrate and validate actions use. Counters come from the
/// append-only migration log, so they accumulate across runs; failed
/// records leave no log entry and the errors counter stays zero here.
pub fn show_status(config: &Config) -> Result<()> {
    let started = Instant::now();
    let db = Database::open(&config.database_path)?;

    let created = operation_total(&db, "created")?;
    let updated = operation_total(&db, "updated")?;
    let merged = operation_total(&db, "merged")?;
    let flagged = operation_total(&db, "flagged")?;
    let stats = MigrationStats {
        processed: created + updated + merged + flagged,
        created,
        updated,
        merged,
        errors: 0,
        flagged_for_review: flagged,
    };

    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let report = MigrationReport::new("status", stats, vec![], duration_ms);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn operation_total(db: &Database, operation: &str) -> Result<u64> {
    Ok(u64::try_from(db.count_migration_log_operation(operation)?).unwrap_or(0))
}
