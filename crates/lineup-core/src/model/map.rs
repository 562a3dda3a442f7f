use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::ArtistId;

/// How a source record was linked to its canonical artist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchMethod {
    /// Slug derived from the candidate name matched an existing artist.
    Slug,
    /// Normalized names matched exactly.
    ExactName,
    /// Fuzzy score at or above the auto-link threshold.
    FuzzyName,
    /// No match found; a new canonical artist was created.
    NewCreation,
}

impl MatchMethod {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Slug => "slug",
            Self::ExactName => "exact-name",
            Self::FuzzyName => "fuzzy-name",
            Self::NewCreation => "new-creation",
        }
    }

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "slug" => Some(Self::Slug),
            "exact-name" => Some(Self::ExactName),
            "fuzzy-name" => Some(Self::FuzzyName),
            "new-creation" => Some(Self::NewCreation),
            _ => None,
        }
    }
}

/// One edge of the identity graph: a (source system, source record)
/// pair pointing at exactly one canonical artist.
///
/// This relation is the single source of truth for "have we seen this
/// source record before" and is consulted before any creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMapEntry {
    pub source_system: String,
    pub source_record_id: String,
    pub artist_id: ArtistId,
    pub confidence: f64,
    pub method: MatchMethod,
    pub created_at: DateTime<Utc>,
}

impl SourceMapEntry {
    #[must_use]
    pub fn new(
        source_system: impl Into<String>,
        source_record_id: impl Into<String>,
        artist_id: ArtistId,
        confidence: f64,
        method: MatchMethod,
    ) -> Self {
        Self {
            source_system: source_system.into(),
            source_record_id: source_record_id.into(),
            artist_id,
            confidence,
            method,
            created_at: Utc::now(),
        }
    }
}
