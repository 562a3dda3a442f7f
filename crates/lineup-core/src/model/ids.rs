use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }
    };
}

define_id!(
    ArtistId,
    "Internal identifier for a canonical artist. Never exposed to readers; the slug is the only externally addressable key."
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artist_id_generation() {
        let id1 = ArtistId::new();
        let id2 = ArtistId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_artist_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = ArtistId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_artist_id_display_parses_back() {
        let id = ArtistId::new();
        let parsed = Uuid::parse_str(&id.to_string()).unwrap();
        assert_eq!(ArtistId::from_uuid(parsed), id);
    }
}
