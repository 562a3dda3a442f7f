use anyhow::Result;
use lineup_core::schema::Database;
use lineup_core::source::SourceSystem;
use lineup_resolve::{Config, MigrationRunner};

#[derive(Debug, Clone, Copy)]
pub enum Target {
    One(SourceSystem),
    All,
}

/// Run the migration and print the report as JSON on stdout.
pub fn run_migrate(
    config: &Config,
    target: Target,
    dry_run: bool,
    batch_size: Option<usize>,
    start_from: usize,
) -> Result<()> {
    let db = Database::open(&config.database_path)?;

    let runner = MigrationRunner::new(&db)
        .with_batch_size(batch_size.unwrap_or(config.batch_size))
        .with_start_from(start_from)
        .dry_run(dry_run);

    let report = match target {
        Target::One(source) => runner.run(source),
        Target::All => runner.run_all(),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.success {
        anyhow::bail!("migration {} failed", report.action);
    }
    Ok(())
}
