//! Loading and saving grayscale images via the `image` crate.

use crate::image::OwnedImage;
use crate::util::{SgmError, SgmResult};
use std::path::Path;

/// Creates an owned image from a grayscale image buffer.
pub fn owned_from_gray_image(img: &image::GrayImage) -> SgmResult<OwnedImage> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    OwnedImage::from_vec(img.as_raw().clone(), width, height)
}

/// Loads an image from disk and converts it to 8-bit grayscale.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> SgmResult<OwnedImage> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|err| SgmError::Load {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    owned_from_gray_image(&img.to_luma8())
}

/// Writes an owned image to disk; the format follows the file extension.
pub fn save_gray_image<P: AsRef<Path>>(img: &OwnedImage, path: P) -> SgmResult<()> {
    let path = path.as_ref();
    let buf = image::GrayImage::from_raw(
        img.width() as u32,
        img.height() as u32,
        img.data().to_vec(),
    )
    .ok_or(SgmError::BufferTooSmall {
        needed: img.width() * img.height(),
        got: img.data().len(),
    })?;
    buf.save(path).map_err(|err| SgmError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::Other, err.to_string()),
    })
}
