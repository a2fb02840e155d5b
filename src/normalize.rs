//! Daugman rubber-sheet normalization.
//!
//! The annulus between the pupil and iris boundaries is unwrapped into a
//! fixed `radial_resolution x angular_resolution` rectangle. Row `i` holds
//! radius `r_i`, evenly spaced over `[pupil.radius, iris.radius]`; column `j`
//! holds angle `θ_j = 2πj / angular_resolution` over `[0, 2π)`. Every sample
//! is anchored at the iris center:
//!
//! `x = iris.x + r_i cos θ_j`, `y = iris.y + r_i sin θ_j`
//!
//! and read with bilinear interpolation and clamp-to-edge borders.

use crate::image::sample::sample_bilinear;
use crate::image::{BorderMode, ImageView, OwnedImage};
use crate::segment::BoundaryPair;
use crate::trace::trace_span;
use crate::util::math::{polar_angle, round_to_u8};
use crate::util::{IrisError, IrisResult};

/// Output geometry of the rubber-sheet unwrap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NormalizeConfig {
    /// Number of radial samples (output rows).
    pub radial_resolution: usize,
    /// Number of angular samples (output columns).
    pub angular_resolution: usize,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            radial_resolution: 64,
            angular_resolution: 512,
        }
    }
}

impl NormalizeConfig {
    pub fn validate(&self) -> IrisResult<()> {
        if self.radial_resolution == 0 || self.angular_resolution == 0 {
            return Err(IrisError::InvalidConfig {
                reason: "normalization resolutions must be > 0",
            });
        }
        Ok(())
    }
}

/// Unwrapped iris texture; rows are radii, columns are angles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedIris {
    img: OwnedImage,
}

impl NormalizedIris {
    /// Wraps an already normalized buffer of `radial x angular` samples.
    pub fn new(data: Vec<u8>, radial: usize, angular: usize) -> IrisResult<Self> {
        Ok(Self {
            img: OwnedImage::new(data, angular, radial)?,
        })
    }

    /// Number of radial samples (rows).
    pub fn radial_resolution(&self) -> usize {
        self.img.height()
    }

    /// Number of angular samples (columns).
    pub fn angular_resolution(&self) -> usize {
        self.img.width()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.img.data().len()
    }

    /// Always false; normalized irises are never empty.
    pub fn is_empty(&self) -> bool {
        self.img.data().is_empty()
    }

    /// Row-major samples.
    pub fn data(&self) -> &[u8] {
        self.img.data()
    }

    /// Borrowed view of the unwrapped texture.
    pub fn view(&self) -> ImageView<'_, u8> {
        self.img.view()
    }
}

/// Unwraps the iris annulus described by `boundaries` from `image`.
///
/// Fails with [`IrisError::NormalizationFailure`] unless both circles are
/// finite with positive radii and `iris.radius > pupil.radius`.
pub fn normalize_iris(
    image: ImageView<'_, u8>,
    boundaries: &BoundaryPair,
    cfg: &NormalizeConfig,
) -> IrisResult<NormalizedIris> {
    cfg.validate()?;
    let pupil = boundaries.pupil;
    let iris = boundaries.iris;
    if !pupil.is_valid() || !iris.is_valid() {
        return Err(IrisError::NormalizationFailure {
            reason: "boundary circles must be finite with positive radius",
        });
    }
    if iris.radius <= pupil.radius {
        return Err(IrisError::NormalizationFailure {
            reason: "iris radius must exceed pupil radius",
        });
    }

    let rows = cfg.radial_resolution;
    let cols = cfg.angular_resolution;
    let _span = trace_span!("normalize", rows = rows, cols = cols).entered();

    let trig: Vec<(f32, f32)> = (0..cols).map(|j| polar_angle(j, cols).sin_cos()).collect();
    let span = iris.radius - pupil.radius;
    let mut out = Vec::with_capacity(rows * cols);
    for i in 0..rows {
        let t = if rows > 1 {
            i as f32 / (rows - 1) as f32
        } else {
            0.0
        };
        let r = pupil.radius + span * t;
        for &(sin_t, cos_t) in &trig {
            let x = iris.x + r * cos_t;
            let y = iris.y + r * sin_t;
            out.push(round_to_u8(sample_bilinear(image, x, y, BorderMode::Clamp)));
        }
    }

    NormalizedIris::new(out, rows, cols)
}
