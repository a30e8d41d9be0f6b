//! Error types for the notch filter bank

use thiserror::Error;

/// Core error type
///
/// Every variant is recoverable: a failed mutation leaves the channel
/// exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotchError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Channel {channel} out of range (bank has {count} channels)")]
    OutOfRange { channel: usize, count: usize },

    #[error("Filter design failed: {0}")]
    DesignFailure(String),
}

impl NotchError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    pub fn design(message: impl Into<String>) -> Self {
        Self::DesignFailure(message.into())
    }
}

/// Result type alias
pub type NotchResult<T> = Result<T, NotchError>;
