//! SIMD dot product using the `wide` crate.
//!
//! Processes eight lanes at a time with `f32x8` and finishes the tail with
//! scalar arithmetic. Results may differ from the scalar kernel in the last
//! bits because of the summation order.

use crate::kernel::ResponseKernel;
use wide::f32x8;

const LANES: usize = 8;

#[inline]
fn load_f32x8(slice: &[f32]) -> f32x8 {
    f32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

#[inline]
fn hsum(v: f32x8) -> f32 {
    v.to_array().iter().sum()
}

/// Eight-lane dot product.
pub struct SimdKernel;

impl ResponseKernel for SimdKernel {
    #[inline]
    fn dot(a: &[f32], b: &[f32]) -> f32 {
        let len = a.len().min(b.len());
        let simd_end = len / LANES * LANES;

        let mut acc = f32x8::ZERO;
        let mut i = 0;
        while i < simd_end {
            acc += load_f32x8(&a[i..]) * load_f32x8(&b[i..]);
            i += LANES;
        }

        let mut tail = 0.0f32;
        for j in simd_end..len {
            tail += a[j] * b[j];
        }
        hsum(acc) + tail
    }
}
