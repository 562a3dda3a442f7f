use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::ArtistId;

/// Review status of a merge candidate.
///
/// Transitions pending -> approved/rejected only via an explicit review
/// action; the engine never auto-resolves a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateStatus {
    Pending,
    Approved,
    Rejected,
}

impl CandidateStatus {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// One structured reason a match was proposed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReason {
    /// Short machine-readable code ("name-overlap", "containment", ...).
    pub code: String,
    pub detail: String,
}

impl MatchReason {
    #[must_use]
    pub fn new(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            detail: detail.into(),
        }
    }
}

/// A pending human-review item: an incoming source record whose best
/// match landed in the ambiguous score band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeCandidate {
    /// Row id, populated when read back from the store.
    pub id: Option<i64>,
    /// The existing canonical artist the record might merge into.
    pub artist_id: ArtistId,
    /// Display name of the not-yet-linked incoming record.
    pub candidate_name: String,
    pub source_system: String,
    pub source_record_id: String,
    pub score: f64,
    pub reasons: Vec<MatchReason>,
    pub status: CandidateStatus,
    pub created_at: DateTime<Utc>,
}

impl MergeCandidate {
    #[must_use]
    pub fn new(
        artist_id: ArtistId,
        candidate_name: impl Into<String>,
        source_system: impl Into<String>,
        source_record_id: impl Into<String>,
        score: f64,
    ) -> Self {
        Self {
            id: None,
            artist_id,
            candidate_name: candidate_name.into(),
            source_system: source_system.into(),
            source_record_id: source_record_id.into(),
            score,
            reasons: Vec::new(),
            status: CandidateStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_reason(mut self, reason: MatchReason) -> Self {
        self.reasons.push(reason);
        self
    }
}
