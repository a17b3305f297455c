use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown preference: {0}")]
    UnknownPreference(String),

    #[error("invalid slot count: {0} (expected 0..=2)")]
    InvalidSlotCount(u8),
}

pub type ModelResult<T> = Result<T, ModelError>;
