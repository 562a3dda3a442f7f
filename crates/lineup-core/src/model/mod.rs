pub mod artist;
pub mod asset;
pub mod candidate;
pub mod gear;
pub mod ids;
pub mod log;
pub mod map;
pub mod payload;
pub mod profile;

pub use artist::CanonicalArtist;
pub use asset::{ArtistAsset, AssetType};
pub use candidate::{CandidateStatus, MatchReason, MergeCandidate};
pub use gear::GearItem;
pub use ids::ArtistId;
pub use log::MigrationLogEntry;
pub use map::{MatchMethod, SourceMapEntry};
pub use payload::{ArtistPayload, AssetInput, GearInput, SourceRecord};
pub use profile::{ArtistProfile, Release};
