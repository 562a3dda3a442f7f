use anyhow::Result;
use lineup_core::model::CandidateStatus;
use lineup_core::schema::Database;
use lineup_resolve::Config;

#[derive(Debug, clap::Subcommand)]
pub enum ReviewAction {
    /// List merge candidates (pending by default)
    List {
        /// Include approved and rejected candidates too
        #[arg(long)]
        all: bool,
    },
    /// Approve a candidate: link its source record to the artist
    Approve {
        /// Candidate id from `lineup review list`
        id: i64,
    },
    /// Reject a candidate: no link is made
    Reject {
        /// Candidate id from `lineup review list`
        id: i64,
    },
}

pub fn run_review(config: &Config, action: ReviewAction) -> Result<()> {
    let db = Database::open(&config.database_path)?;

    match action {
        ReviewAction::List { all } => {
            let status = if all { None } else { Some(CandidateStatus::Pending) };
            let candidates = db.list_merge_candidates(status)?;
            if candidates.is_empty() {
                println!("No merge candidates.");
                return Ok(());
            }
            for c in &candidates {
                let artist = db.get_artist(&c.artist_id)?;
                let artist_name = artist.map_or_else(|| "?".to_string(), |a| a.name);
                println!(
                    "  #{:<5} {:<9} {:.2}  {} ({}/{}) -> {}",
                    c.id.unwrap_or_default(),
                    c.status.name(),
                    c.score,
                    c.candidate_name,
                    c.source_system,
                    c.source_record_id,
                    artist_name,
                );
                for reason in &c.reasons {
                    println!("         {}: {}", reason.code, reason.detail);
                }
            }
        }
        ReviewAction::Approve { id } => {
            let artist_id = db.approve_merge_candidate(id)?;
            println!("Candidate #{id} approved; source record linked to {artist_id}.");
        }
        ReviewAction::Reject { id } => {
            db.reject_merge_candidate(id)?;
            println!("Candidate #{id} rejected.");
        }
    }
    Ok(())
}
