//! Contributing source systems and their trust ranking.
//!
//! The priority table resolves field-level conflicts when the same
//! canonical artist has profile data from more than one source. It is
//! stamped onto each profile at write time so readers never re-derive
//! trust, and injected into the resolution engine at construction so
//! tests can substitute alternate orders.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A contributing source system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceSystem {
    /// Manual edits by an operator.
    Manual,
    /// The hand-curated legacy catalog.
    Legacy,
    /// The photo/content synchronization feed.
    Sync,
    /// The automatically-extracted knowledge-base export.
    Rag,
    /// Raw scraped data.
    Scraper,
}

/// Canonical string names for each [`SourceSystem`] variant, matching
/// the keys used in source-map and profile rows.
const SOURCE_NAMES: &[(SourceSystem, &str)] = &[
    (SourceSystem::Manual, "manual"),
    (SourceSystem::Legacy, "legacy"),
    (SourceSystem::Sync, "sync"),
    (SourceSystem::Rag, "rag"),
    (SourceSystem::Scraper, "scraper"),
];

impl SourceSystem {
    /// The canonical string name stored in the database.
    #[must_use]
    pub fn name(self) -> &'static str {
        for &(s, name) in SOURCE_NAMES {
            if s == self {
                return name;
            }
        }
        "unknown"
    }

    /// Parse a string name into a [`SourceSystem`] (case-insensitive).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        for &(s, canonical) in SOURCE_NAMES {
            if canonical.eq_ignore_ascii_case(name) {
                return Some(s);
            }
        }
        None
    }

    /// All known source systems, highest trust first.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[
            Self::Manual,
            Self::Legacy,
            Self::Sync,
            Self::Rag,
            Self::Scraper,
        ]
    }
}

impl std::fmt::Display for SourceSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable source-name to priority table (higher wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcePriorities {
    priorities: HashMap<String, u32>,
}

impl Default for SourcePriorities {
    /// Fixed production ordering: manual edits highest, then the
    /// hand-authored legacy catalog, then the sync feed, then
    /// automatically extracted data, with raw scrapes lowest.
    fn default() -> Self {
        Self::from_pairs([
            ("manual", 100),
            ("legacy", 80),
            ("sync", 60),
            ("rag", 40),
            ("scraper", 20),
        ])
    }
}

impl SourcePriorities {
    /// Build a priority table from explicit pairs (for tests and
    /// alternate configurations).
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, u32)>) -> Self {
        Self {
            priorities: pairs
                .into_iter()
                .map(|(name, p)| (name.to_string(), p))
                .collect(),
        }
    }

    /// Priority for a source name. Unknown sources rank lowest (0).
    #[must_use]
    pub fn priority_for(&self, source: &str) -> u32 {
        if let Some(&priority) = self.priorities.get(source) {
            return priority;
        }
        self.priorities
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(source))
            .map(|(_, &priority)| priority)
            .unwrap_or(0)
    }

    /// Priority for a known source system.
    #[must_use]
    pub fn priority_of(&self, source: SourceSystem) -> u32 {
        self.priority_for(source.name())
    }
}
