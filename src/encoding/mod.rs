pub mod bincode;
pub mod keycode;

use crate::error::Result;

pub use keycode::{merge, split, KeyBuilder};

/// Trait for values stored under window state keys.
///
/// Values don't need to preserve ordering, so they go through the value
/// codec rather than the key codec.
pub trait Value {
    /// Encode the value to bytes
    fn encode(&self) -> Result<Vec<u8>>;

    /// Decode bytes back to the original value type
    fn decode(bytes: &[u8]) -> Result<Self>
    where
        Self: Sized;
}

/// Error type for encoding operations
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("Invalid encoding format: {0}")]
    InvalidFormat(String),

    #[error("Truncated data")]
    TruncatedData,

    #[error("Invalid UTF-8 sequence")]
    InvalidUtf8,
}
