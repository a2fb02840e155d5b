//! Error types for iriscode.

use thiserror::Error;

/// Result alias for iriscode operations.
pub type IrisResult<T> = std::result::Result<T, IrisError>;

/// Errors that can occur while turning an eye image into an iris code.
///
/// Segmentation and normalization failures are terminal for the image being
/// processed: no partial template is produced. Matching never fails.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IrisError {
    /// Width or height is zero, or their product overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// The backing buffer does not hold the requested image.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A configuration parameter is outside its valid domain.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },
    /// Fewer than two boundary circles were detected.
    #[error("segmentation failed: found {found} circle(s), need at least 2")]
    SegmentationFailure { found: usize },
    /// The boundary pair cannot describe a non-degenerate annulus.
    #[error("normalization failed: {reason}")]
    NormalizationFailure { reason: &'static str },
    /// The Gabor filter bank could not be built.
    #[error("feature extraction failed: {reason}")]
    FeatureExtractionFailure { reason: &'static str },
    /// Template and mask of a record disagree on geometry.
    #[error("record mismatch: {reason}")]
    RecordMismatch { reason: &'static str },
    /// Image decoding failed (`image-io` feature).
    #[error("image load failed: {reason}")]
    ImageLoadFailure { reason: String },
}
