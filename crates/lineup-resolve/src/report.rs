//! Aggregate run statistics and the fixed JSON response shape returned
//! to the batch-trigger surface.

use serde::{Deserialize, Serialize};

/// Per-action counters accumulated by the migration runner.
///
/// Dry runs and committing runs over the same batch produce identical
/// counts, so operators can diff previews against real output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationStats {
    pub processed: u64,
    pub created: u64,
    pub updated: u64,
    pub merged: u64,
    pub errors: u64,
    #[serde(rename = "flaggedForReview")]
    pub flagged_for_review: u64,
}

impl MigrationStats {
    /// Fold another stats block into this one (for migrate-all runs).
    pub fn absorb(&mut self, other: &Self) {
        self.processed += other.processed;
        self.created += other.created;
        self.updated += other.updated;
        self.merged += other.merged;
        self.errors += other.errors;
        self.flagged_for_review += other.flagged_for_review;
    }
}

/// The response shape for every batch action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationReport {
    pub success: bool,
    pub action: String,
    pub stats: MigrationStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    pub duration_ms: u64,
}

impl MigrationReport {
    /// Build a report from a finished run. Per-record errors do not
    /// make the run unsuccessful; only total failures do.
    #[must_use]
    pub fn new(
        action: impl Into<String>,
        stats: MigrationStats,
        error_messages: Vec<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            success: true,
            action: action.into(),
            stats,
            errors: if error_messages.is_empty() {
                None
            } else {
                Some(error_messages)
            },
            duration_ms,
        }
    }

    /// Build a report for a run that failed outright (page fetch).
    #[must_use]
    pub fn failed(action: impl Into<String>, message: String, duration_ms: u64) -> Self {
        Self {
            success: false,
            action: action.into(),
            stats: MigrationStats::default(),
            errors: Some(vec![message]),
            duration_ms,
        }
    }
}
