//! Convolution kernels for Gabor filter responses.
//!
//! Filtering is expressed as row dot products over a reflect-padded copy of
//! the input, so the same code path serves interior and border pixels. The
//! dot product itself is pluggable through [`ResponseKernel`]: a scalar
//! reference and an optional `f32x8` variant (`simd` feature).

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

use crate::image::border::{map_index, BorderMode};
use crate::image::ImageView;

/// Inner product used by the convolution loop.
pub trait ResponseKernel {
    /// Returns `Σ a[i] * b[i]` over the common length.
    fn dot(a: &[f32], b: &[f32]) -> f32;
}

/// Kernel selected at compile time.
#[cfg(not(feature = "simd"))]
pub(crate) type ActiveKernel = scalar::ScalarKernel;
#[cfg(feature = "simd")]
pub(crate) type ActiveKernel = simd::SimdKernel;

/// Reflect-padded `f32` copy of an image.
pub(crate) struct PaddedImage {
    width: usize,
    height: usize,
    pad_x: usize,
    pad_y: usize,
    stride: usize,
    data: Vec<f32>,
}

impl PaddedImage {
    /// Pads `src` by `pad_x` columns and `pad_y` rows on each side.
    pub(crate) fn new(src: ImageView<'_, u8>, pad_x: usize, pad_y: usize) -> Self {
        let width = src.width();
        let height = src.height();
        let stride = width + 2 * pad_x;
        let rows = height + 2 * pad_y;
        let mut data = Vec::with_capacity(stride * rows);
        for py in 0..rows {
            let sy = map_index(py as isize - pad_y as isize, height, BorderMode::Reflect);
            for px in 0..stride {
                let sx = map_index(px as isize - pad_x as isize, width, BorderMode::Reflect);
                data.push(src.get(sx, sy).copied().map_or(0.0, f32::from));
            }
        }
        Self {
            width,
            height,
            pad_x,
            pad_y,
            stride,
            data,
        }
    }

    fn window(&self, x: usize, padded_row: usize, len: usize) -> &[f32] {
        let start = padded_row * self.stride + x;
        &self.data[start..start + len]
    }
}

/// Square filter stored pre-flipped so convolution becomes correlation.
pub(crate) struct FlippedFilter<'a> {
    pub half: usize,
    pub real: &'a [f32],
    pub imag: &'a [f32],
}

/// Convolves the padded image with a complex filter.
///
/// Returns `(real, imag)` response maps of the unpadded image size in
/// row-major order. The image must be padded by at least `filter.half`.
pub(crate) fn convolve_complex<K: ResponseKernel>(
    src: &PaddedImage,
    filter: &FlippedFilter<'_>,
) -> (Vec<f32>, Vec<f32>) {
    debug_assert!(src.pad_x >= filter.half && src.pad_y >= filter.half);
    let size = 2 * filter.half + 1;
    let n = src.width * src.height;
    let mut real = Vec::with_capacity(n);
    let mut imag = Vec::with_capacity(n);

    let off_x = src.pad_x - filter.half;
    let off_y = src.pad_y - filter.half;
    for y in 0..src.height {
        for x in 0..src.width {
            let mut re = 0.0f32;
            let mut im = 0.0f32;
            for ky in 0..size {
                let window = src.window(x + off_x, y + off_y + ky, size);
                let k = ky * size;
                re += K::dot(window, &filter.real[k..k + size]);
                im += K::dot(window, &filter.imag[k..k + size]);
            }
            real.push(re);
            imag.push(im);
        }
    }
    (real, imag)
}
