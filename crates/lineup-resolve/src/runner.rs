//! Paged migration runner over the staging relation.
//!
//! Commit mode wraps each page in its own transaction, so an aborted
//! run keeps every fully-committed page. A dry run wraps the whole run
//! in one deferred transaction and rolls it back at the end, which
//! preserves intra-batch dependencies (a record created on page one is
//! visible to a merge on page three) and therefore yields the exact
//! stats a committing run would. The audit log is the one write a dry
//! run keeps: collected entries are replayed after the rollback.
//!
//! Per-record failures are isolated with savepoints and counted, never
//! fatal. Cancellation is honored at page boundaries only; a page is
//! never torn.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use lineup_core::model::MigrationLogEntry;
use lineup_core::schema::Database;
use lineup_core::source::{SourcePriorities, SourceSystem};

use crate::engine::{Resolution, ResolutionEngine};
use crate::error::Result;
use crate::report::{MigrationReport, MigrationStats};

const DEFAULT_BATCH_SIZE: usize = 100;

const RECORD_SAVEPOINT: &str = "resolve_record";

/// Drives resolution over staged source records, one source system at
/// a time.
#[derive(Debug)]
pub struct MigrationRunner<'a> {
    db: &'a Database,
    priorities: SourcePriorities,
    batch_size: usize,
    start_from: usize,
    dry_run: bool,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> MigrationRunner<'a> {
    #[must_use]
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            priorities: SourcePriorities::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            start_from: 0,
            dry_run: false,
            cancel: None,
        }
    }

    #[must_use]
    pub fn with_priorities(mut self, priorities: SourcePriorities) -> Self {
        self.priorities = priorities;
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Skip the first `start_from` staged records of each source, for
    /// resuming an interrupted run.
    #[must_use]
    pub fn with_start_from(mut self, start_from: usize) -> Self {
        self.start_from = start_from;
        self
    }

    /// Preview mode: resolve everything, then roll it all back. Only
    /// the audit log survives.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Attach a cancellation flag, checked between pages.
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Migrate all staged records for one source system.
    ///
    /// Never returns an error: transaction-level failures produce an
    /// unsuccessful report instead, so batch callers always get the
    /// fixed response shape.
    pub fn run(&self, source: SourceSystem) -> MigrationReport {
        let action = format!("migrate_{}", source.name());
        let started = Instant::now();

        match self.run_source(source) {
            Ok((stats, errors)) => {
                MigrationReport::new(action, stats, errors, elapsed_ms(&started))
            }
            Err(e) => MigrationReport::failed(action, e.to_string(), elapsed_ms(&started)),
        }
    }

    /// Migrate every source system in priority order under one report.
    pub fn run_all(&self) -> MigrationReport {
        let started = Instant::now();
        let mut stats = MigrationStats::default();
        let mut errors = Vec::new();

        for &source in SourceSystem::all() {
            match self.run_source(source) {
                Ok((source_stats, source_errors)) => {
                    stats.absorb(&source_stats);
                    errors.extend(source_errors);
                }
                Err(e) => {
                    return MigrationReport::failed(
                        "migrate_all",
                        format!("{}: {e}", source.name()),
                        elapsed_ms(&started),
                    );
                }
            }
            if self.cancelled() {
                break;
            }
        }
        MigrationReport::new("migrate_all", stats, errors, elapsed_ms(&started))
    }

    fn run_source(&self, source: SourceSystem) -> Result<(MigrationStats, Vec<String>)> {
        let engine = ResolutionEngine::with_priorities(self.db, self.priorities.clone());
        let mut stats = MigrationStats::default();
        let mut errors = Vec::new();
        let mut replay: Vec<MigrationLogEntry> = Vec::new();

        if self.dry_run {
            self.db.begin_deferred()?;
            let outcome = self.process_pages(source, &engine, &mut stats, &mut errors, &mut replay);
            // Roll back regardless of how processing went.
            self.db.rollback()?;
            outcome?;
            for entry in &replay {
                self.db.append_migration_log(entry)?;
            }
        } else {
            self.process_paged_commits(source, &engine, &mut stats, &mut errors)?;
        }

        log::info!(
            "{} {}: {} processed, {} created, {} updated, {} merged, {} flagged, {} errors",
            if self.dry_run { "dry-run" } else { "migrate" },
            source.name(),
            stats.processed,
            stats.created,
            stats.updated,
            stats.merged,
            stats.flagged_for_review,
            stats.errors,
        );
        Ok((stats, errors))
    }

    /// Dry-run body: all pages inside the caller's open transaction.
    fn process_pages(
        &self,
        source: SourceSystem,
        engine: &ResolutionEngine,
        stats: &mut MigrationStats,
        errors: &mut Vec<String>,
        replay: &mut Vec<MigrationLogEntry>,
    ) -> Result<()> {
        let mut offset = self.start_from;
        loop {
            if self.cancelled() {
                return Ok(());
            }
            let page = self.db.fetch_source_page(source.name(), offset, self.batch_size)?;
            if page.is_empty() {
                return Ok(());
            }
            offset += page.len();
            for record in &page {
                self.process_record(engine, record, stats, errors, Some(replay))?;
            }
        }
    }

    /// Commit-mode body: one committed transaction per page.
    fn process_paged_commits(
        &self,
        source: SourceSystem,
        engine: &ResolutionEngine,
        stats: &mut MigrationStats,
        errors: &mut Vec<String>,
    ) -> Result<()> {
        let mut offset = self.start_from;
        loop {
            if self.cancelled() {
                return Ok(());
            }
            let page = self.db.fetch_source_page(source.name(), offset, self.batch_size)?;
            if page.is_empty() {
                return Ok(());
            }
            offset += page.len();

            self.db.begin_deferred()?;
            for record in &page {
                if let Err(e) = self.process_record(engine, record, stats, errors, None) {
                    self.db.rollback()?;
                    return Err(e);
                }
            }
            self.db.commit()?;
        }
    }

    /// Resolve one record behind a savepoint so its failure cannot
    /// poison the rest of the page.
    fn process_record(
        &self,
        engine: &ResolutionEngine,
        record: &lineup_core::model::SourceRecord,
        stats: &mut MigrationStats,
        errors: &mut Vec<String>,
        replay: Option<&mut Vec<MigrationLogEntry>>,
    ) -> Result<()> {
        stats.processed += 1;
        self.db.savepoint(RECORD_SAVEPOINT)?;
        match engine.resolve(record) {
            Ok(outcome) => {
                self.db.release_savepoint(RECORD_SAVEPOINT)?;
                match outcome.resolution {
                    Resolution::Created(_) => stats.created += 1,
                    Resolution::Updated(_) => stats.updated += 1,
                    Resolution::Merged(_) => stats.merged += 1,
                    Resolution::Flagged { .. } => stats.flagged_for_review += 1,
                }
                if let Some(replay) = replay {
                    replay.push(outcome.log);
                }
            }
            Err(e) => {
                self.db.rollback_to_savepoint(RECORD_SAVEPOINT)?;
                stats.errors += 1;
                errors.push(format!(
                    "{}/{}: {e}",
                    record.source_system, record.source_record_id
                ));
                log::warn!(
                    "failed to resolve {}/{}: {e}",
                    record.source_system,
                    record.source_record_id
                );
            }
        }
        Ok(())
    }
}

fn elapsed_ms(started: &Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
