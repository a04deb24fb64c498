//! Error types for cadenza

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CadenzaError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CadenzaError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

pub type Result<T> = std::result::Result<T, CadenzaError>;
