/// Convenience result type used across the crate.
pub type TransitionResult<T> = Result<T, TransitionError>;

/// Top-level error taxonomy.
///
/// Decoding errors are produced by [`crate::ByteBuffer`] reads and are absorbed by the decoder;
/// the playback runtime only surfaces errors through [`crate::TransitionSet`] lookups.
#[derive(thiserror::Error, Debug)]
pub enum TransitionError {
    /// A read ran past the end of the readable region.
    #[error("truncated buffer: need {need} byte(s) at offset {at}, {remaining} remaining")]
    Truncated {
        /// Bytes the read required.
        need: usize,
        /// Reader position when the read was attempted.
        at: usize,
        /// Bytes left in the readable region.
        remaining: usize,
    },

    /// Structurally invalid timeline data.
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid caller-provided arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// Data that is understood but deliberately not acted upon.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Wrapped lower-level error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TransitionError {
    /// Build a [`TransitionError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`TransitionError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TransitionError::Unsupported`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// `true` for errors caused by running out of input.
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
