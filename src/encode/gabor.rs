//! Gabor filter bank construction.
//!
//! Kernels follow the classic scikit-image parameterization: an isotropic
//! Gaussian envelope whose width is derived from the spatial frequency and
//! the half-response bandwidth in octaves, modulated by a complex carrier
//! along the filter orientation.

use crate::util::math::sin_cos_deg;
use crate::util::{IrisError, IrisResult};
use std::f32::consts::PI;

/// Gabor bank parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GaborConfig {
    /// Carrier frequency in cycles per pixel, in `(0, 0.5]`.
    pub frequency: f32,
    /// Filter orientations in degrees; their order fixes the template layout.
    pub orientations_deg: Vec<f32>,
    /// Half-response spatial frequency bandwidth in octaves.
    pub bandwidth: f32,
    /// Kernel support in standard deviations of the envelope.
    pub n_stds: f32,
    /// Filter orientations concurrently (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for GaborConfig {
    fn default() -> Self {
        Self {
            frequency: 0.1,
            orientations_deg: vec![0.0, 45.0, 90.0, 135.0],
            bandwidth: 1.0,
            n_stds: 3.0,
            parallel: false,
        }
    }
}

impl GaborConfig {
    /// Checks the bank parameters.
    pub fn validate(&self) -> IrisResult<()> {
        if self.orientations_deg.is_empty() {
            return Err(IrisError::FeatureExtractionFailure {
                reason: "at least one orientation is required",
            });
        }
        if self.orientations_deg.iter().any(|a| !a.is_finite()) {
            return Err(IrisError::FeatureExtractionFailure {
                reason: "orientations must be finite",
            });
        }
        if !(self.frequency > 0.0 && self.frequency <= 0.5) {
            return Err(IrisError::FeatureExtractionFailure {
                reason: "frequency must lie in (0, 0.5]",
            });
        }
        if !self.bandwidth.is_finite() || self.bandwidth <= 0.0 {
            return Err(IrisError::FeatureExtractionFailure {
                reason: "bandwidth must be finite and > 0",
            });
        }
        if !self.n_stds.is_finite() || self.n_stds <= 0.0 {
            return Err(IrisError::FeatureExtractionFailure {
                reason: "n_stds must be finite and > 0",
            });
        }
        Ok(())
    }

    /// Envelope standard deviation in pixels.
    pub fn sigma(&self) -> f32 {
        let b = 2.0f32.powf(self.bandwidth);
        let prefactor = (1.0 / PI) * (std::f32::consts::LN_2 / 2.0).sqrt() * (b + 1.0) / (b - 1.0);
        prefactor / self.frequency
    }
}

/// Complex Gabor kernel on a square `(2 * half + 1)^2` grid.
///
/// Coefficients are stored row-major and already flipped, so that sliding
/// them over the image as a correlation yields a true convolution.
#[derive(Clone, Debug)]
pub struct GaborKernel {
    half: usize,
    real: Vec<f32>,
    imag: Vec<f32>,
}

impl GaborKernel {
    /// Builds the kernel for one orientation.
    pub fn new(frequency: f32, sigma: f32, n_stds: f32, orientation_deg: f32) -> Self {
        let (st, ct) = sin_cos_deg(orientation_deg);
        let extent = (n_stds * sigma * ct)
            .abs()
            .max((n_stds * sigma * st).abs())
            .max(1.0);
        let half = extent.ceil() as usize;
        let size = 2 * half + 1;
        let norm = 1.0 / (2.0 * PI * sigma * sigma);
        let inv_two_sigma_sq = 1.0 / (2.0 * sigma * sigma);

        let mut real = vec![0.0f32; size * size];
        let mut imag = vec![0.0f32; size * size];
        for row in 0..size {
            let y = row as f32 - half as f32;
            for col in 0..size {
                let x = col as f32 - half as f32;
                let rot_x = x * ct + y * st;
                let rot_y = -x * st + y * ct;
                let envelope = norm * (-(rot_x * rot_x + rot_y * rot_y) * inv_two_sigma_sq).exp();
                let (sin_c, cos_c) = (2.0 * PI * frequency * rot_x).sin_cos();
                let flipped = (size - 1 - row) * size + (size - 1 - col);
                real[flipped] = envelope * cos_c;
                imag[flipped] = envelope * sin_c;
            }
        }

        Self {
            half,
            real,
            imag,
        }
    }

    /// Half-size of the square support.
    pub fn half(&self) -> usize {
        self.half
    }

    /// Side length of the square support.
    pub fn size(&self) -> usize {
        2 * self.half + 1
    }

    /// Flipped real coefficients, row-major.
    pub fn real(&self) -> &[f32] {
        &self.real
    }

    /// Flipped imaginary coefficients, row-major.
    pub fn imag(&self) -> &[f32] {
        &self.imag
    }
}

/// Ordered set of Gabor kernels, one per orientation.
#[derive(Clone, Debug)]
pub struct GaborBank {
    kernels: Vec<GaborKernel>,
}

impl GaborBank {
    /// Builds all kernels described by `cfg`.
    pub fn new(cfg: &GaborConfig) -> IrisResult<Self> {
        cfg.validate()?;
        let sigma = cfg.sigma();
        let kernels = cfg
            .orientations_deg
            .iter()
            .map(|&angle| GaborKernel::new(cfg.frequency, sigma, cfg.n_stds, angle))
            .collect();
        Ok(Self { kernels })
    }

    /// Kernels in orientation order.
    pub fn kernels(&self) -> &[GaborKernel] {
        &self.kernels
    }

    /// Number of orientations.
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    /// True when the bank has no kernels (never the case once built).
    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    /// Largest kernel half-size in the bank.
    pub fn max_half(&self) -> usize {
        self.kernels.iter().map(GaborKernel::half).max().unwrap_or(0)
    }
}
