//! End-to-end enrollment and verification.
//!
//! Image → segmentation → rubber-sheet normalization → {Gabor encoding,
//! noise mask} → [`EnrollmentRecord`]; two records → masked Hamming
//! distance → decision. Every stage is a pure function of its inputs, so one
//! pipeline can be shared across threads.

use crate::encode::{FeatureEncoder, GaborConfig};
use crate::image::ImageView;
use crate::mask::{create_mask, MaskConfig};
use crate::matcher::{Match, MatchConfig, Matcher};
use crate::normalize::{normalize_iris, NormalizeConfig, NormalizedIris};
use crate::record::EnrollmentRecord;
use crate::segment::{BoundaryPair, SegmentConfig, Segmenter};
use crate::trace::{trace_event, trace_span};
use crate::util::IrisResult;

/// Configuration for every pipeline stage.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineConfig {
    pub segment: SegmentConfig,
    pub normalize: NormalizeConfig,
    pub mask: MaskConfig,
    pub gabor: GaborConfig,
    #[cfg_attr(feature = "serde", serde(rename = "match"))]
    pub matching: MatchConfig,
}

impl PipelineConfig {
    /// Validates all stage configurations.
    pub fn validate(&self) -> IrisResult<()> {
        self.segment.validate()?;
        self.normalize.validate()?;
        self.mask.validate()?;
        self.gabor.validate()?;
        self.matching.validate()
    }
}

/// Intermediate and final products for one image.
#[derive(Clone, Debug)]
pub struct Extraction {
    pub boundaries: BoundaryPair,
    pub normalized: NormalizedIris,
    pub record: EnrollmentRecord,
}

/// Compiled pipeline: validated configuration plus the Gabor bank.
#[derive(Clone, Debug)]
pub struct IrisPipeline {
    segmenter: Segmenter,
    normalize: NormalizeConfig,
    mask: MaskConfig,
    encoder: FeatureEncoder,
    matcher: Matcher,
}

impl IrisPipeline {
    /// Validates `cfg` and builds the filter bank.
    pub fn new(cfg: PipelineConfig) -> IrisResult<Self> {
        cfg.validate()?;
        Ok(Self {
            segmenter: Segmenter::new(cfg.segment)?,
            normalize: cfg.normalize,
            mask: cfg.mask,
            encoder: FeatureEncoder::new(&cfg.gabor)?,
            matcher: Matcher::new().with_config(cfg.matching),
        })
    }

    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Builds a record from known boundaries, skipping segmentation.
    pub fn extract_with_boundaries(
        &self,
        image: ImageView<'_, u8>,
        boundaries: BoundaryPair,
    ) -> IrisResult<Extraction> {
        let normalized = normalize_iris(image, &boundaries, &self.normalize)?;
        let template = self.encoder.encode(&normalized);
        let mask = create_mask(&normalized, &self.mask)?;
        let record = EnrollmentRecord::new(template, mask)?;
        Ok(Extraction {
            boundaries,
            normalized,
            record,
        })
    }

    /// Runs segmentation, normalization, encoding and masking.
    pub fn extract(&self, image: ImageView<'_, u8>) -> IrisResult<Extraction> {
        let _span =
            trace_span!("pipeline", width = image.width(), height = image.height()).entered();
        let boundaries = self.segmenter.segment(image)?;
        trace_event!(
            "boundaries",
            pupil_radius = boundaries.pupil.radius,
            iris_radius = boundaries.iris.radius
        );
        self.extract_with_boundaries(image, boundaries)
    }

    /// Produces the record to persist for an enrollment image.
    pub fn enroll(&self, image: ImageView<'_, u8>) -> IrisResult<EnrollmentRecord> {
        Ok(self.extract(image)?.record)
    }

    /// Compares a live capture against an enrolled record.
    pub fn verify(
        &self,
        image: ImageView<'_, u8>,
        enrolled: &EnrollmentRecord,
    ) -> IrisResult<Match> {
        let query = self.enroll(image)?;
        Ok(self.matcher.compare(&query, enrolled))
    }
}
