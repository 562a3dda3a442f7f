use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{slugify, sort_key};
use crate::model::ids::ArtistId;

/// One deduplicated identity record per real-world artist or act.
///
/// Created exactly once by the resolution engine and never deleted by
/// this subsystem. The slug is globally unique and is the only key
/// presentation code may address; the id stays internal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalArtist {
    pub id: ArtistId,
    pub name: String,
    pub sort_name: String,
    pub slug: String,
    pub real_name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub active_years: Option<String>,
    pub popularity_rank: Option<u32>,
    pub is_active: bool,
    pub needs_review: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CanonicalArtist {
    /// Create a new canonical artist from a display name, deriving the
    /// slug and sortable name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            slug: slugify(&name),
            sort_name: sort_key(&name),
            id: ArtistId::new(),
            name,
            real_name: None,
            city: None,
            country: None,
            region: None,
            active_years: None,
            popularity_rank: None,
            is_active: true,
            needs_review: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_real_name(mut self, real_name: impl Into<String>) -> Self {
        self.real_name = Some(real_name.into());
        self
    }

    #[must_use]
    pub fn with_location(
        mut self,
        city: Option<String>,
        country: Option<String>,
        region: Option<String>,
    ) -> Self {
        self.city = city;
        self.country = country;
        self.region = region;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artist_new_derives_keys() {
        let artist = CanonicalArtist::new("Jeff Mills");
        assert_eq!(artist.slug, "jeff-mills");
        assert_eq!(artist.sort_name, "Mills, Jeff");
        assert!(artist.is_active);
        assert!(!artist.needs_review);
    }

    #[test]
    fn test_artist_builder() {
        let artist = CanonicalArtist::new("Plastikman")
            .with_real_name("Richie Hawtin")
            .with_location(Some("Windsor".to_string()), Some("Canada".to_string()), None);

        assert_eq!(artist.real_name.as_deref(), Some("Richie Hawtin"));
        assert_eq!(artist.city.as_deref(), Some("Windsor"));
        assert!(artist.region.is_none());
    }
}
