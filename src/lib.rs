//! Iris recognition core: boundary segmentation, Daugman rubber-sheet
//! normalization, Gabor iris codes, intensity noise masks and masked
//! Hamming-distance matching.
//!
//! The stages are pure functions over borrowed grayscale images and can be
//! used individually or through [`IrisPipeline`]. Optional features add
//! orientation-parallel encoding (`rayon`), an `f32x8` convolution kernel
//! (`simd`), file decoding (`image-io`), tracing spans (`tracing`) and
//! serialization of records and configs (`serde`).

pub mod encode;
pub mod image;
pub mod kernel;
pub mod mask;
pub mod matcher;
pub mod normalize;
pub mod pipeline;
pub mod record;
pub mod segment;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use encode::{FeatureEncoder, GaborBank, GaborConfig, IrisTemplate};
pub use crate::image::{BorderMode, ImageView, OwnedImage};
pub use mask::{create_mask, IrisMask, MaskConfig};
pub use matcher::{
    hamming_details, hamming_distance, HammingDetails, Match, MatchConfig, MatchDecision, Matcher,
};
pub use normalize::{normalize_iris, NormalizeConfig, NormalizedIris};
pub use pipeline::{Extraction, IrisPipeline, PipelineConfig};
pub use record::EnrollmentRecord;
pub use segment::{BoundaryPair, Circle, SegmentConfig, Segmenter};
pub use util::{IrisError, IrisResult};
