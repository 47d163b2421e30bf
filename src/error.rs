//! Error types for the compositing pipeline.
//!
//! Only the background image and the export encode can fail a call. Font
//! fallback and out-of-domain element geometry are absorbed locally with a
//! logged warning so one bad element never blanks the rest of the poster.

/// Failure of one composite pass. Nothing is partially rendered; the
/// previous surface, if any, stays exportable.
#[derive(Debug, thiserror::Error)]
pub enum CompositeError {
    #[error("failed to decode background image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("failed to read background image: {0}")]
    Io(#[from] std::io::Error),

    #[error("surface dimensions must be non-zero")]
    EmptySurface,
}

/// Failure of an export request.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// No composite pass has succeeded yet; there is no surface to encode.
    #[error("nothing has been composited yet")]
    NotComposited,

    #[error("failed to encode surface: {0}")]
    Encode(#[from] image::ImageError),
}
