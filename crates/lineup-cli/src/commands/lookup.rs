use anyhow::Result;
use lineup_core::project;
use lineup_core::schema::Database;
use lineup_resolve::Config;
use serde_json::json;

/// Print the flat projection of one artist. A missing slug prints a
/// "not found" object and exits cleanly; callers treat it as data.
pub fn run_lookup(config: &Config, slug: &str) -> Result<()> {
    let db = Database::open(&config.database_path)?;

    match project::project_by_slug(&db, slug)? {
        Some(artist) => println!("{}", serde_json::to_string_pretty(&artist)?),
        None => println!(
            "{}",
            serde_json::to_string_pretty(&json!({"found": false, "slug": slug}))?
        ),
    }
    Ok(())
}
