use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::ArtistId;

/// One append-only audit-trail entry for a resolution mutation.
///
/// Write-only from the core's perspective; never read back during
/// resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationLogEntry {
    /// Operation kind: "created", "updated", "merged", "flagged".
    pub operation: String,
    pub source_system: String,
    pub source_record_id: String,
    pub artist_id: Option<ArtistId>,
    /// Arbitrary structured detail (method, score, slug, ...).
    pub detail: serde_json::Value,
    pub at: DateTime<Utc>,
}

impl MigrationLogEntry {
    #[must_use]
    pub fn new(
        operation: impl Into<String>,
        source_system: impl Into<String>,
        source_record_id: impl Into<String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            source_system: source_system.into(),
            source_record_id: source_record_id.into(),
            artist_id: None,
            detail: serde_json::Value::Null,
            at: Utc::now(),
        }
    }

    #[must_use]
    pub fn for_artist(mut self, artist_id: ArtistId) -> Self {
        self.artist_id = Some(artist_id);
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = detail;
        self
    }
}
