//! Linear rescaling of disparity maps to the 8-bit visualization range.

use crate::disparity::DisparityMap;
use crate::image::OwnedImage;

/// Sentinel intensity written for invalid pixels.
pub const INVALID_INTENSITY: u8 = 0;

/// Maps valid disparities linearly onto `[0, 255]` using the observed valid
/// range; invalid pixels become [`INVALID_INTENSITY`]. An all-invalid or
/// constant-valued map produces a uniform zero image. Normalizing a map whose
/// valid range is already exactly `[0, 255]` is the identity on valid pixels.
pub fn normalize_disparity(map: &DisparityMap) -> OwnedImage {
    let width = map.width();
    let height = map.height();
    let mut data = vec![INVALID_INTENSITY; width * height];

    if let Some((lo, hi)) = map.valid_range() {
        let span = hi - lo;
        if span > 0.0 {
            let scale = 255.0 / span;
            for y in 0..height {
                for x in 0..width {
                    if let Some(d) = map.get(x, y) {
                        data[y * width + x] = ((d - lo) * scale).round() as u8;
                    }
                }
            }
        }
    }

    OwnedImage::from_vec(data, width, height).expect("normalized buffer matches map geometry")
}
