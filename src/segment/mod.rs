//! Pupil and iris boundary localization.
//!
//! The segmenter runs a gradient-directed circular Hough transform, collects
//! every detected circle and then applies an ascending-radius tie-break: the
//! smallest circle is taken as the pupil and the largest as the iris, while
//! any circles strictly between them are discarded. This is a heuristic that
//! works for eye images where the two boundaries dominate the edge map; it is
//! not a geometric guarantee.

mod gradient;
mod hough;
mod smooth;

use crate::image::ImageView;
use crate::trace::{trace_event, trace_span};
use crate::util::{IrisError, IrisResult};
use gradient::Gradients;
use hough::{radii_for_center, Accumulator};

/// Circle in image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circle {
    /// Center column.
    pub x: f32,
    /// Center row.
    pub y: f32,
    /// Radius in pixels; positive for any detected circle.
    pub radius: f32,
}

impl Circle {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self { x, y, radius }
    }

    /// Returns true when all parameters are finite and the radius is positive.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.radius.is_finite() && self.radius > 0.0
    }
}

/// Detected pupil and iris boundaries.
///
/// A usable pair has `iris.radius > pupil.radius`; centers are expected to be
/// close but this is not enforced.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundaryPair {
    pub pupil: Circle,
    pub iris: Circle,
}

impl BoundaryPair {
    /// Picks the pupil and iris from an unordered set of circles.
    ///
    /// Circles are sorted by ascending radius; the first becomes the pupil,
    /// the last the iris. Fails with [`IrisError::SegmentationFailure`] when
    /// fewer than two circles are supplied.
    pub fn from_circles(mut circles: Vec<Circle>) -> IrisResult<Self> {
        if circles.len() < 2 {
            return Err(IrisError::SegmentationFailure {
                found: circles.len(),
            });
        }
        circles.sort_by(|a, b| a.radius.total_cmp(&b.radius));
        let discarded = circles.len() - 2;
        if discarded > 0 {
            trace_event!("segment_discarded_circles", count = discarded);
        }
        Ok(Self {
            pupil: circles[0],
            iris: circles[circles.len() - 1],
        })
    }
}

/// Hough transform tuning. Defaults are tuned for close-up NIR/visible eye
/// images around 320x280 pixels.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SegmentConfig {
    /// Image pixels per accumulator cell (>= 1 coarsens the accumulator).
    pub accumulator_resolution: f32,
    /// Minimum distance in pixels between two detected centers.
    pub min_center_distance: f32,
    /// Minimum Sobel magnitude for an edge point.
    pub edge_threshold: f32,
    /// Minimum raw vote mass around a smoothed accumulator maximum for it to
    /// become a center.
    pub accumulator_threshold: u32,
    /// Smallest radius searched, in pixels.
    pub min_radius: u32,
    /// Largest radius searched, in pixels.
    pub max_radius: u32,
    /// Minimum edge support per unit circumference for a radius to be kept.
    pub radius_support: f32,
    /// Minimum spacing in pixels between radii reported for one center.
    pub min_radius_gap: u32,
    /// Minimum |cos| between the edge gradient and the radial direction.
    pub gradient_alignment: f32,
    /// Gaussian sigma, in pixels, applied to the gradient field before edge
    /// directions are read; 0 keeps raw Sobel directions.
    pub direction_sigma: f32,
    /// Gaussian sigma, in accumulator cells, used to locate vote maxima. The
    /// support window spans `ceil(2 * sigma)` cells on each side.
    pub accumulator_sigma: f32,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            accumulator_resolution: 1.2,
            min_center_distance: 100.0,
            edge_threshold: 50.0,
            accumulator_threshold: 70,
            min_radius: 20,
            max_radius: 120,
            radius_support: 0.3,
            min_radius_gap: 8,
            gradient_alignment: 0.7,
            direction_sigma: 2.0,
            accumulator_sigma: 1.0,
        }
    }
}

impl SegmentConfig {
    /// Checks every parameter against its valid domain.
    pub fn validate(&self) -> IrisResult<()> {
        if !self.accumulator_resolution.is_finite() || self.accumulator_resolution <= 0.0 {
            return Err(IrisError::InvalidConfig {
                reason: "accumulator_resolution must be finite and > 0",
            });
        }
        if !self.min_center_distance.is_finite() || self.min_center_distance < 0.0 {
            return Err(IrisError::InvalidConfig {
                reason: "min_center_distance must be finite and >= 0",
            });
        }
        if !self.edge_threshold.is_finite() || self.edge_threshold < 0.0 {
            return Err(IrisError::InvalidConfig {
                reason: "edge_threshold must be finite and >= 0",
            });
        }
        if self.accumulator_threshold == 0 {
            return Err(IrisError::InvalidConfig {
                reason: "accumulator_threshold must be > 0",
            });
        }
        if self.min_radius < 2 || self.max_radius < self.min_radius {
            return Err(IrisError::InvalidConfig {
                reason: "radius window must satisfy 2 <= min_radius <= max_radius",
            });
        }
        if !(self.radius_support > 0.0 && self.radius_support <= 1.0) {
            return Err(IrisError::InvalidConfig {
                reason: "radius_support must lie in (0, 1]",
            });
        }
        if self.min_radius_gap == 0 {
            return Err(IrisError::InvalidConfig {
                reason: "min_radius_gap must be > 0",
            });
        }
        if !(0.0..=1.0).contains(&self.gradient_alignment) {
            return Err(IrisError::InvalidConfig {
                reason: "gradient_alignment must lie in [0, 1]",
            });
        }
        if !self.direction_sigma.is_finite() || self.direction_sigma < 0.0 {
            return Err(IrisError::InvalidConfig {
                reason: "direction_sigma must be finite and >= 0",
            });
        }
        if !self.accumulator_sigma.is_finite() || self.accumulator_sigma <= 0.0 {
            return Err(IrisError::InvalidConfig {
                reason: "accumulator_sigma must be finite and > 0",
            });
        }
        Ok(())
    }
}

/// Locates pupil and iris boundaries in grayscale eye images.
#[derive(Clone, Debug, Default)]
pub struct Segmenter {
    cfg: SegmentConfig,
}

impl Segmenter {
    /// Creates a segmenter after validating its configuration.
    pub fn new(cfg: SegmentConfig) -> IrisResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &SegmentConfig {
        &self.cfg
    }

    /// Detects every circle the Hough transform supports.
    pub fn detect_circles(&self, image: ImageView<'_, u8>) -> Vec<Circle> {
        let _span =
            trace_span!("segment", width = image.width(), height = image.height()).entered();

        let edges =
            Gradients::sobel(image).edges(self.cfg.edge_threshold, self.cfg.direction_sigma);
        let mut acc = Accumulator::new(
            image.width(),
            image.height(),
            self.cfg.accumulator_resolution,
        );
        {
            let _vote = trace_span!("hough_vote", edges = edges.len()).entered();
            acc.vote(&edges, image.width(), image.height(), &self.cfg);
        }

        let mut circles = Vec::new();
        for center in acc.peaks(&self.cfg) {
            circles.extend(radii_for_center(center, &edges, &self.cfg));
        }
        trace_event!("segment_circles", count = circles.len());
        circles
    }

    /// Detects the pupil and iris boundaries.
    pub fn segment(&self, image: ImageView<'_, u8>) -> IrisResult<BoundaryPair> {
        BoundaryPair::from_circles(self.detect_circles(image))
    }
}
