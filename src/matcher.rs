//! Mask-weighted Hamming distance between iris codes.
//!
//! Each [`IrisMask`] covers the normalized samples, while templates carry
//! `orientations * 2` bits per sample. Masks are therefore expanded into
//! template space following the encoder layout (orientation, then sample,
//! then real/imaginary) before the two expanded masks are ANDed. Only bit
//! positions valid in both masks take part in the comparison.
//!
//! Earlier iris-code matchers tiled a single mask across both codes and
//! ANDed it with itself, so the second capture's occlusions were ignored.
//! Here the enrolled and query masks stay distinct and both constrain
//! the comparison.
//!
//! Matching never fails: when no position is usable, when an input is
//! internally inconsistent, or when the inputs disagree on geometry, the
//! distance is 1.0 (maximal, never a match).

use crate::encode::IrisTemplate;
use crate::mask::IrisMask;
use crate::record::EnrollmentRecord;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{IrisError, IrisResult};

/// Distance returned when nothing can be compared.
pub const WORST_DISTANCE: f32 = 1.0;

/// Counts behind a Hamming distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HammingDetails {
    /// Normalized distance in `[0, 1]`.
    pub distance: f32,
    /// Bit positions valid in both masks.
    pub valid_bits: u64,
    /// Valid positions where the templates differ.
    pub differing_bits: u64,
}

impl HammingDetails {
    fn worst() -> Self {
        Self {
            distance: WORST_DISTANCE,
            valid_bits: 0,
            differing_bits: 0,
        }
    }
}

/// Expands a sample mask into packed template-space validity bits.
///
/// Sample `p` validates bits `o * 2N + 2p` and `o * 2N + 2p + 1` for every
/// orientation `o`, where `N` is the mask length.
pub fn expand_mask(mask: &IrisMask, orientations: usize) -> Vec<u64> {
    let samples = mask.len();
    let segment = 2 * samples;
    let len = orientations * segment;
    let mut words = vec![0u64; len.div_ceil(64)];
    for o in 0..orientations {
        let base = o * segment;
        for (p, &valid) in mask.as_slice().iter().enumerate() {
            if !valid {
                continue;
            }
            for k in [base + 2 * p, base + 2 * p + 1] {
                words[k / 64] |= 1u64 << (k % 64);
            }
        }
    }
    words
}

fn consistent(template: &IrisTemplate, mask: &IrisMask) -> bool {
    template.validate().is_ok() && mask.validate().is_ok()
}

fn mask_fits(template: &IrisTemplate, mask: &IrisMask) -> bool {
    template.radial_resolution() == mask.radial_resolution()
        && template.angular_resolution() == mask.angular_resolution()
}

/// Mask-weighted Hamming distance with the raw counts.
pub fn hamming_details(
    template_a: &IrisTemplate,
    template_b: &IrisTemplate,
    mask_a: &IrisMask,
    mask_b: &IrisMask,
) -> HammingDetails {
    let _span = trace_span!("hamming_distance").entered();

    if !consistent(template_a, mask_a) || !consistent(template_b, mask_b) {
        trace_warn!(
            "match_inconsistent_input",
            words_a = template_a.words().len(),
            words_b = template_b.words().len()
        );
        return HammingDetails::worst();
    }
    if !template_a.same_geometry(template_b)
        || !mask_fits(template_a, mask_a)
        || !mask_fits(template_b, mask_b)
    {
        trace_warn!(
            "match_geometry_mismatch",
            bits_a = template_a.len(),
            bits_b = template_b.len()
        );
        return HammingDetails::worst();
    }

    let orientations = template_a.orientations();
    let valid_a = expand_mask(mask_a, orientations);
    let valid_b = expand_mask(mask_b, orientations);

    let mut valid_bits = 0u64;
    let mut differing_bits = 0u64;
    for (((&wa, &wb), &va), &vb) in template_a
        .words()
        .iter()
        .zip(template_b.words())
        .zip(&valid_a)
        .zip(&valid_b)
    {
        let both = va & vb;
        valid_bits += u64::from(both.count_ones());
        differing_bits += u64::from(((wa ^ wb) & both).count_ones());
    }

    if valid_bits == 0 {
        trace_warn!("match_no_valid_bits", bits = template_a.len());
        return HammingDetails::worst();
    }

    let distance = (differing_bits as f64 / valid_bits as f64) as f32;
    trace_event!(
        "hamming",
        distance = distance,
        valid_bits = valid_bits,
        differing_bits = differing_bits
    );
    HammingDetails {
        distance,
        valid_bits,
        differing_bits,
    }
}

/// Normalized Hamming distance over positions valid in both masks.
pub fn hamming_distance(
    template_a: &IrisTemplate,
    template_b: &IrisTemplate,
    mask_a: &IrisMask,
    mask_b: &IrisMask,
) -> f32 {
    hamming_details(template_a, template_b, mask_a, mask_b).distance
}

/// Accept/reject outcome for a distance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchDecision {
    Match,
    NoMatch,
}

/// Decision threshold applied by callers; the distance itself is threshold-free.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MatchConfig {
    /// Distances strictly below this are matches.
    pub threshold: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { threshold: 0.38 }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> IrisResult<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(IrisError::InvalidConfig {
                reason: "match threshold must lie in [0, 1]",
            });
        }
        Ok(())
    }

    /// `Match` when `distance < threshold`.
    pub fn decide(&self, distance: f32) -> MatchDecision {
        if distance < self.threshold {
            MatchDecision::Match
        } else {
            MatchDecision::NoMatch
        }
    }
}

/// Distance plus decision for a pair of records.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Match {
    pub details: HammingDetails,
    pub decision: MatchDecision,
}

/// Compares enrollment records and applies the configured threshold.
#[derive(Clone, Debug, Default)]
pub struct Matcher {
    cfg: MatchConfig,
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the decision configuration.
    pub fn with_config(mut self, cfg: MatchConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Compares two records.
    pub fn compare(&self, query: &EnrollmentRecord, enrolled: &EnrollmentRecord) -> Match {
        let details = hamming_details(
            query.template(),
            enrolled.template(),
            query.mask(),
            enrolled.mask(),
        );
        Match {
            details,
            decision: self.cfg.decide(details.distance),
        }
    }
}
