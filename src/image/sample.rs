//! Bilinear sampling with an explicit border policy.

use crate::image::border::{map_index, BorderMode};
use crate::image::ImageView;

/// Samples `img` at the sub-pixel position `(x, y)` with bilinear weights.
///
/// Integer coordinates address pixel centers. Neighbours that fall outside
/// the image are resolved with `border`; non-finite coordinates read the
/// top-left corner through the same policy.
pub fn sample_bilinear(img: ImageView<'_, u8>, x: f32, y: f32, border: BorderMode) -> f32 {
    let (x, y) = if x.is_finite() && y.is_finite() {
        (x, y)
    } else {
        (0.0, 0.0)
    };
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let x0 = x0 as isize;
    let y0 = y0 as isize;

    let a = pixel_at(img, x0, y0, border);
    let b = pixel_at(img, x0 + 1, y0, border);
    let c = pixel_at(img, x0, y0 + 1, border);
    let d = pixel_at(img, x0 + 1, y0 + 1, border);

    let top = a * (1.0 - fx) + b * fx;
    let bottom = c * (1.0 - fx) + d * fx;
    top * (1.0 - fy) + bottom * fy
}

fn pixel_at(img: ImageView<'_, u8>, x: isize, y: isize, border: BorderMode) -> f32 {
    let xi = map_index(x, img.width(), border);
    let yi = map_index(y, img.height(), border);
    img.get(xi, yi).copied().map_or(0.0, f32::from)
}
