//! Scalar reference dot product.

use crate::kernel::ResponseKernel;

/// Plain iterator-based dot product.
pub struct ScalarKernel;

impl ResponseKernel for ScalarKernel {
    #[inline]
    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }
}
