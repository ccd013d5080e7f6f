use thiserror::Error;

use crate::ecc::ErrorTolerance;

/// Errors produced while building or rendering a code.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// The text does not fit in a version 40 symbol at the requested level.
    #[error("Link is too long for a code ({length} bytes, at most {capacity} at level {level})")]
    PayloadTooLarge {
        length: usize,
        capacity: usize,
        level: ErrorTolerance,
    },

    /// PNG encoding of the raster fallback failed.
    #[error("Image error: {0}")]
    Raster(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, EncodeError>;
