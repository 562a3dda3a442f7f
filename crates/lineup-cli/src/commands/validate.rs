use anyhow::Result;
use lineup_core::schema::Database;
use lineup_resolve::{validate, Config, MigrationReport, MigrationStats};
use std::time::Instant;

/// Run the integrity checks and print the same fixed JSON report shape
/// the migrate actions use; findings land in the errors list.
pub fn run_validate(config: &Config) -> Result<()> {
    let started = Instant::now();
    let db = Database::open(&config.database_path)?;
    let findings = validate::check(&db)?;

    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let mut report = MigrationReport::new(
        "validate",
        MigrationStats::default(),
        findings
            .iter()
            .map(|f| format!("[{}] {}", f.code, f.detail))
            .collect(),
        duration_ms,
    );
    report.success = findings.is_empty();

    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.success {
        anyhow::bail!("validation found {} problem(s)", findings.len());
    }
    Ok(())
}
