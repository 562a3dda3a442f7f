use serde::{Deserialize, Serialize};

use crate::model::ids::ArtistId;

/// One piece of stage/studio gear attributed to an artist, with
/// optional rider notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearItem {
    pub artist_id: ArtistId,
    /// Grouping key used by the projector ("decks", "mixer", ...).
    pub category: String,
    pub item: String,
    #[serde(default)]
    pub rider_notes: Option<String>,
    pub source_system: String,
}

impl GearItem {
    #[must_use]
    pub fn new(
        artist_id: ArtistId,
        category: impl Into<String>,
        item: impl Into<String>,
        source_system: impl Into<String>,
    ) -> Self {
        Self {
            artist_id,
            category: category.into(),
            item: item.into(),
            rider_notes: None,
            source_system: source_system.into(),
        }
    }
}
