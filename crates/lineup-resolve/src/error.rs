use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] lineup_core::Error),

    #[error("missing or unusable name for {source_system}/{source_record_id}")]
    MissingName {
        source_system: String,
        source_record_id: String,
    },
}

impl Error {
    /// Whether the underlying cause is a store constraint violation.
    #[must_use]
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Core(e) if e.is_constraint_violation())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
