//! Decoding image files into grayscale buffers via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Decoding errors are
//! reported as [`IrisError::ImageLoadFailure`] and happen upstream of the
//! recognition core.

use crate::image::OwnedImage;
use crate::util::{IrisError, IrisResult};
use std::path::Path;

/// Converts any decoded image to 8-bit luma.
pub fn owned_from_dynamic_image(img: &image::DynamicImage) -> IrisResult<OwnedImage> {
    let gray = img.to_luma8();
    let width = gray.width() as usize;
    let height = gray.height() as usize;
    OwnedImage::new(gray.into_raw(), width, height)
}

/// Loads an eye image from disk and converts it to grayscale.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> IrisResult<OwnedImage> {
    let img = image::open(path).map_err(|err| IrisError::ImageLoadFailure {
        reason: err.to_string(),
    })?;
    owned_from_dynamic_image(&img)
}
