//! Iris code extraction with a bank of oriented Gabor filters.
//!
//! For each orientation, in bank order, the normalized iris is convolved with
//! the complex Gabor kernel. Each sample contributes two consecutive bits,
//! `real > 0` then `imag > 0`, scanned in row-major order. The per-orientation
//! sequences are concatenated, so bit `k` of a template belongs to
//! orientation `k / (2N)` and sample `(k % (2N)) / 2`, with `N` the sample
//! count. The matcher relies on exactly this layout.

mod gabor;

pub use gabor::{GaborBank, GaborConfig, GaborKernel};

use crate::kernel::{convolve_complex, ActiveKernel, FlippedFilter, PaddedImage};
use crate::normalize::NormalizedIris;
use crate::trace::trace_span;
use crate::util::{IrisError, IrisResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Binary iris code with its source geometry.
///
/// Deserialization checks the word count against the declared geometry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "TemplateParts"))]
pub struct IrisTemplate {
    orientations: usize,
    radial: usize,
    angular: usize,
    words: Vec<u64>,
}

impl IrisTemplate {
    /// Builds a template from unpacked bits in template order.
    pub fn from_bits(
        bits: &[bool],
        orientations: usize,
        radial: usize,
        angular: usize,
    ) -> IrisResult<Self> {
        let len = template_len(orientations, radial, angular)?;
        if bits.len() != len {
            return Err(IrisError::BufferTooSmall {
                needed: len,
                got: bits.len(),
            });
        }
        let mut words = vec![0u64; len.div_ceil(64)];
        for (i, &b) in bits.iter().enumerate() {
            if b {
                words[i / 64] |= 1u64 << (i % 64);
            }
        }
        Ok(Self {
            orientations,
            radial,
            angular,
            words,
        })
    }

    /// Number of filter orientations.
    pub fn orientations(&self) -> usize {
        self.orientations
    }

    /// Radial resolution of the source normalized iris.
    pub fn radial_resolution(&self) -> usize {
        self.radial
    }

    /// Angular resolution of the source normalized iris.
    pub fn angular_resolution(&self) -> usize {
        self.angular
    }

    /// Bit length: `orientations * 2 * radial * angular`.
    pub fn len(&self) -> usize {
        self.orientations * 2 * self.radial * self.angular
    }

    /// Always false for a constructed template.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns bit `idx`, or `false` past the end.
    pub fn bit(&self, idx: usize) -> bool {
        if idx >= self.len() {
            return false;
        }
        (self.words[idx / 64] >> (idx % 64)) & 1 == 1
    }

    /// Packed bits, least significant bit first; trailing bits are zero.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Iterates over all bits in template order.
    pub fn iter_bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len()).map(|i| self.bit(i))
    }

    /// Returns true when `other` was produced with the same geometry.
    pub fn same_geometry(&self, other: &IrisTemplate) -> bool {
        self.orientations == other.orientations
            && self.radial == other.radial
            && self.angular == other.angular
            && self.words.len() == other.words.len()
    }

    /// Checks that the packed storage agrees with the declared geometry.
    pub fn validate(&self) -> IrisResult<()> {
        let len = template_len(self.orientations, self.radial, self.angular)?;
        if self.words.len() != len.div_ceil(64) {
            return Err(IrisError::BufferTooSmall {
                needed: len.div_ceil(64),
                got: self.words.len(),
            });
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct TemplateParts {
    orientations: usize,
    radial: usize,
    angular: usize,
    words: Vec<u64>,
}

#[cfg(feature = "serde")]
impl TryFrom<TemplateParts> for IrisTemplate {
    type Error = IrisError;

    fn try_from(parts: TemplateParts) -> IrisResult<Self> {
        let template = Self {
            orientations: parts.orientations,
            radial: parts.radial,
            angular: parts.angular,
            words: parts.words,
        };
        template.validate()?;
        Ok(template)
    }
}

fn template_len(orientations: usize, radial: usize, angular: usize) -> IrisResult<usize> {
    if orientations == 0 {
        return Err(IrisError::FeatureExtractionFailure {
            reason: "at least one orientation is required",
        });
    }
    orientations
        .checked_mul(2)
        .and_then(|v| v.checked_mul(radial))
        .and_then(|v| v.checked_mul(angular))
        .filter(|&n| n > 0)
        .ok_or(IrisError::InvalidDimensions {
            width: angular,
            height: radial,
        })
}

/// Precompiled Gabor bank that turns normalized irises into templates.
#[derive(Clone, Debug)]
pub struct FeatureEncoder {
    bank: GaborBank,
    parallel: bool,
}

impl FeatureEncoder {
    /// Compiles the filter bank described by `cfg`.
    pub fn new(cfg: &GaborConfig) -> IrisResult<Self> {
        Ok(Self {
            bank: GaborBank::new(cfg)?,
            parallel: cfg.parallel,
        })
    }

    /// Returns the compiled bank.
    pub fn bank(&self) -> &GaborBank {
        &self.bank
    }

    /// Whether orientation passes run concurrently.
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Template length produced for a normalized iris of the given size.
    pub fn template_len(&self, radial: usize, angular: usize) -> usize {
        self.bank.len() * 2 * radial * angular
    }

    /// Encodes a normalized iris into a binary template.
    ///
    /// Total over any normalized iris; orientation passes may run in
    /// parallel but are always reassembled in bank order.
    pub fn encode(&self, normalized: &NormalizedIris) -> IrisTemplate {
        let radial = normalized.radial_resolution();
        let angular = normalized.angular_resolution();
        let _span = trace_span!(
            "encode",
            orientations = self.bank.len(),
            radial = radial,
            angular = angular
        )
        .entered();

        let half = self.bank.max_half();
        let padded = PaddedImage::new(normalized.view(), half, half);
        let segments = self.orientation_codes(&padded);

        let samples = radial * angular;
        let len = self.bank.len() * 2 * samples;
        let mut words = vec![0u64; len.div_ceil(64)];
        for (o, segment) in segments.iter().enumerate() {
            let base = o * 2 * samples;
            for (i, &b) in segment.iter().enumerate() {
                if b {
                    let k = base + i;
                    words[k / 64] |= 1u64 << (k % 64);
                }
            }
        }

        IrisTemplate {
            orientations: self.bank.len(),
            radial,
            angular,
            words,
        }
    }

    fn orientation_codes(&self, padded: &PaddedImage) -> Vec<Vec<bool>> {
        #[cfg(feature = "rayon")]
        {
            if self.parallel {
                return self
                    .bank
                    .kernels()
                    .par_iter()
                    .map(|kernel| orientation_code(padded, kernel))
                    .collect();
            }
        }

        self.bank
            .kernels()
            .iter()
            .map(|kernel| orientation_code(padded, kernel))
            .collect()
    }
}

/// Interleaved sign bits `[re0, im0, re1, im1, ...]` for one orientation.
fn orientation_code(padded: &PaddedImage, kernel: &GaborKernel) -> Vec<bool> {
    let filter = FlippedFilter {
        half: kernel.half(),
        real: kernel.real(),
        imag: kernel.imag(),
    };
    let (real, imag) = convolve_complex::<ActiveKernel>(padded, &filter);
    let mut bits = Vec::with_capacity(real.len() * 2);
    for (re, im) in real.iter().zip(&imag) {
        bits.push(*re > 0.0);
        bits.push(*im > 0.0);
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::{FeatureEncoder, GaborConfig, IrisTemplate};
    use crate::mask::IrisMask;
    use crate::matcher::hamming_distance;
    use crate::normalize::NormalizedIris;

    fn textured(radial: usize, angular: usize) -> NormalizedIris {
        let data = (0..radial * angular)
            .map(|i| {
                let x = (i % angular) as f32;
                let y = (i / angular) as f32;
                (128.0 + 60.0 * (0.6 * x).sin() + 40.0 * (0.45 * y + 0.2 * x).cos()) as u8
            })
            .collect();
        NormalizedIris::new(data, radial, angular).unwrap()
    }

    #[test]
    fn from_bits_round_trips_through_words() {
        let bits: Vec<bool> = (0..2 * 2 * 3 * 13).map(|i| i % 3 == 0).collect();
        let tpl = IrisTemplate::from_bits(&bits, 2, 3, 13).unwrap();
        assert_eq!(tpl.len(), 156);
        assert_eq!(tpl.words().len(), 3);
        assert!(tpl.iter_bits().eq(bits.iter().copied()));
        assert!(!tpl.bit(10_000));
    }

    #[test]
    fn template_layout_interleaves_real_and_imag_per_orientation() {
        let cfg = GaborConfig {
            orientations_deg: vec![0.0, 90.0],
            ..GaborConfig::default()
        };
        let encoder = FeatureEncoder::new(&cfg).unwrap();
        let norm = textured(6, 20);
        let full = encoder.encode(&norm);

        for (o, angle) in [0.0f32, 90.0].iter().enumerate() {
            let single = FeatureEncoder::new(&GaborConfig {
                orientations_deg: vec![*angle],
                ..GaborConfig::default()
            })
            .unwrap()
            .encode(&norm);
            let seg = 2 * 6 * 20;
            for k in 0..seg {
                assert_eq!(full.bit(o * seg + k), single.bit(k), "orientation {o} bit {k}");
            }
        }
    }

    #[test]
    fn overflowing_geometry_is_rejected_and_never_matches() {
        let bad = IrisTemplate {
            orientations: 1 << 62,
            radial: 1,
            angular: 2,
            words: vec![0],
        };
        assert!(bad.validate().is_err());

        let mask = IrisMask::all_valid(1, 2).unwrap();
        assert_eq!(hamming_distance(&bad, &bad, &mask, &mask), 1.0);
    }

    #[test]
    fn short_word_storage_is_rejected() {
        let tpl = IrisTemplate {
            orientations: 1,
            radial: 8,
            angular: 8,
            words: vec![0],
        };
        assert!(tpl.validate().is_err());
        let mask = IrisMask::all_valid(8, 8).unwrap();
        assert_eq!(hamming_distance(&tpl, &tpl, &mask, &mask), 1.0);
    }

    #[test]
    fn encoding_is_deterministic() {
        let norm = textured(8, 32);
        let encoder = FeatureEncoder::new(&GaborConfig::default()).unwrap();
        let a = encoder.encode(&norm);
        let b = encoder.encode(&norm);
        assert_eq!(a.len(), 4 * 2 * 8 * 32);
        assert_eq!(encoder.template_len(8, 32), a.len());
        assert_eq!(a, b);
    }
}
