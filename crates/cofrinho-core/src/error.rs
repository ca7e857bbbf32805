use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Parcel {parcel} is outside 1..={count}")]
    IndexOutOfRange { parcel: u32, count: u32 },
    #[error("Plan not found: {0}")]
    PlanNotFound(Uuid),
    #[error("Card not found: {0}")]
    CardNotFound(Uuid),
    #[error("Persistence failed: {0}")]
    Persistence(String),
    #[error("Unsupported schema version {0}")]
    UnsupportedSchema(u8),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
}

impl CoreError {
    /// True for failures raised by the persistence collaborator rather than by input.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            CoreError::Persistence(_)
                | CoreError::Io(_)
                | CoreError::Serde(_)
                | CoreError::UnsupportedSchema(_)
        )
    }
}
