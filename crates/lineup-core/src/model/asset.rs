use serde::{Deserialize, Serialize};

use crate::model::ids::ArtistId;

/// The kind of media an asset attribution describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    Photo,
    Logo,
    PressKit,
}

impl AssetType {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Logo => "logo",
            Self::PressKit => "press-kit",
        }
    }

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "photo" => Some(Self::Photo),
            "logo" => Some(Self::Logo),
            "press-kit" => Some(Self::PressKit),
            _ => None,
        }
    }
}

/// A media attribution linked to a canonical artist.
///
/// At most one primary per (artist, asset type); the resolution
/// engine's write path enforces this, not a hard constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistAsset {
    pub artist_id: ArtistId,
    pub asset_type: AssetType,
    pub url: String,
    pub author: Option<String>,
    pub license: Option<String>,
    /// Page the asset was attributed from, for license compliance.
    pub source_page: Option<String>,
    pub source_system: String,
    pub is_primary: bool,
}

impl ArtistAsset {
    #[must_use]
    pub fn new(
        artist_id: ArtistId,
        asset_type: AssetType,
        url: impl Into<String>,
        source_system: impl Into<String>,
    ) -> Self {
        Self {
            artist_id,
            asset_type,
            url: url.into(),
            author: None,
            license: None,
            source_page: None,
            source_system: source_system.into(),
            is_primary: false,
        }
    }
}
