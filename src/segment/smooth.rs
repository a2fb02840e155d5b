//! Separable Gaussian smoothing of `f32` maps.
//!
//! Kernels use `radius = ceil(3 * sigma)` (at least 1) and are normalized to
//! unit sum. Borders clamp to the nearest sample.

use crate::image::border::{map_index, BorderMode};

/// Sampled, normalized 1D Gaussian.
#[derive(Clone, Debug)]
pub(crate) struct GaussianKernel1D {
    pub radius: usize,
    pub taps: Vec<f32>,
}

impl GaussianKernel1D {
    /// `sigma` must be finite and positive; callers validate configs first.
    pub(crate) fn new(sigma: f32) -> Self {
        let radius = ((3.0 * sigma).ceil() as usize).max(1);
        let two_sigma_sq = 2.0 * sigma * sigma;
        let mut taps: Vec<f32> = (0..2 * radius + 1)
            .map(|i| {
                let x = i as f32 - radius as f32;
                (-(x * x) / two_sigma_sq).exp()
            })
            .collect();
        let sum: f32 = taps.iter().sum();
        for t in &mut taps {
            *t /= sum;
        }
        Self { radius, taps }
    }
}

/// Blurs a row-major `width x height` map with `kernel` along both axes.
pub(crate) fn blur(
    data: &[f32],
    width: usize,
    height: usize,
    kernel: &GaussianKernel1D,
) -> Vec<f32> {
    debug_assert_eq!(data.len(), width * height);
    let r = kernel.radius as isize;

    let mut horiz = vec![0.0f32; data.len()];
    for y in 0..height {
        let row = &data[y * width..(y + 1) * width];
        for x in 0..width {
            let mut acc = 0.0f32;
            for (k, &t) in kernel.taps.iter().enumerate() {
                let sx = map_index(x as isize + k as isize - r, width, BorderMode::Clamp);
                acc += t * row[sx];
            }
            horiz[y * width + x] = acc;
        }
    }

    let mut out = vec![0.0f32; data.len()];
    for y in 0..height {
        for (k, &t) in kernel.taps.iter().enumerate() {
            let sy = map_index(y as isize + k as isize - r, height, BorderMode::Clamp);
            let src = &horiz[sy * width..(sy + 1) * width];
            let dst = &mut out[y * width..(y + 1) * width];
            for (d, &s) in dst.iter_mut().zip(src) {
                *d += t * s;
            }
        }
    }
    out
}
