//! Intensity-threshold noise mask over the normalized iris.

use crate::normalize::NormalizedIris;
use crate::trace::{trace_event, trace_span};
use crate::util::{IrisError, IrisResult};

/// Intensity window for usable iris samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MaskConfig {
    /// Samples strictly darker than this are excluded (eyelashes, shadows).
    pub low_threshold: u8,
    /// Samples strictly brighter than this are excluded (specular reflections).
    pub high_threshold: u8,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            low_threshold: 50,
            high_threshold: 230,
        }
    }
}

impl MaskConfig {
    pub fn validate(&self) -> IrisResult<()> {
        if self.low_threshold > self.high_threshold {
            return Err(IrisError::InvalidConfig {
                reason: "low_threshold must not exceed high_threshold",
            });
        }
        Ok(())
    }
}

/// Per-sample validity over a normalized iris; `true` marks a usable sample.
///
/// Deserialization checks the flag count against the declared geometry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "MaskParts"))]
pub struct IrisMask {
    radial: usize,
    angular: usize,
    valid: Vec<bool>,
}

impl IrisMask {
    /// Builds a mask from row-major validity flags.
    pub fn new(valid: Vec<bool>, radial: usize, angular: usize) -> IrisResult<Self> {
        let needed = radial
            .checked_mul(angular)
            .filter(|&n| n > 0)
            .ok_or(IrisError::InvalidDimensions {
                width: angular,
                height: radial,
            })?;
        if valid.len() != needed {
            return Err(IrisError::BufferTooSmall {
                needed,
                got: valid.len(),
            });
        }
        Ok(Self {
            radial,
            angular,
            valid,
        })
    }

    /// Checks that the flag count agrees with the declared geometry.
    pub fn validate(&self) -> IrisResult<()> {
        let needed = self.radial.checked_mul(self.angular).unwrap_or(usize::MAX);
        if needed == 0 || self.valid.len() != needed {
            return Err(IrisError::BufferTooSmall {
                needed,
                got: self.valid.len(),
            });
        }
        Ok(())
    }

    /// Mask with every sample usable.
    pub fn all_valid(radial: usize, angular: usize) -> IrisResult<Self> {
        Self::new(vec![true; radial * angular], radial, angular)
    }

    pub fn radial_resolution(&self) -> usize {
        self.radial
    }

    pub fn angular_resolution(&self) -> usize {
        self.angular
    }

    /// Number of samples covered by the mask.
    pub fn len(&self) -> usize {
        self.valid.len()
    }

    /// Always false; masks are never empty.
    pub fn is_empty(&self) -> bool {
        self.valid.is_empty()
    }

    /// Row-major validity flags.
    pub fn as_slice(&self) -> &[bool] {
        &self.valid
    }

    /// Returns whether sample `idx` (row-major) is usable.
    pub fn is_valid(&self, idx: usize) -> bool {
        self.valid.get(idx).copied().unwrap_or(false)
    }

    /// Number of usable samples.
    pub fn valid_count(&self) -> usize {
        self.valid.iter().filter(|&&v| v).count()
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct MaskParts {
    radial: usize,
    angular: usize,
    valid: Vec<bool>,
}

#[cfg(feature = "serde")]
impl TryFrom<MaskParts> for IrisMask {
    type Error = IrisError;

    fn try_from(parts: MaskParts) -> IrisResult<Self> {
        Self::new(parts.valid, parts.radial, parts.angular)
    }
}

/// Marks samples outside `[low_threshold, high_threshold]` as unusable.
pub fn create_mask(normalized: &NormalizedIris, cfg: &MaskConfig) -> IrisResult<IrisMask> {
    cfg.validate()?;
    let _span = trace_span!("create_mask").entered();
    let valid: Vec<bool> = normalized
        .data()
        .iter()
        .map(|&v| v >= cfg.low_threshold && v <= cfg.high_threshold)
        .collect();
    let mask = IrisMask::new(
        valid,
        normalized.radial_resolution(),
        normalized.angular_resolution(),
    )?;
    trace_event!(
        "mask_coverage",
        valid = mask.valid_count(),
        total = mask.len()
    );
    Ok(mask)
}
