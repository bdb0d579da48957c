//! Grayscale image grids and stereo pairs.
//!
//! `ImageView` is a borrowed 2D view into a 1D `u8` buffer with an explicit
//! stride (elements between row starts, so a stride larger than the width
//! represents padded rows). `OwnedImage` is the contiguous owned counterpart.
//! Both are immutable once constructed; the matcher only ever reads them.

use crate::util::{SgmError, SgmResult};

pub mod io;

/// Borrowed 2D grayscale view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a> ImageView<'a> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [u8], width: usize, height: usize) -> SgmResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [u8], width: usize, height: usize, stride: usize) -> SgmResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(SgmError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the intensity at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.stride + x).copied()
    }

    /// Returns the intensity at `(x, y)` with coordinates clamped into bounds.
    ///
    /// Border-replicate sampling used by the windowed cost kernel.
    #[inline]
    pub fn get_clamped(&self, x: isize, y: isize) -> u8 {
        let cx = x.clamp(0, self.width as isize - 1) as usize;
        let cy = y.clamp(0, self.height as isize - 1) as usize;
        self.data[cy * self.stride + cx]
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [u8]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.stride;
        self.data.get(start..start + self.width)
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> SgmResult<usize> {
    if width == 0 || height == 0 {
        return Err(SgmError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(SgmError::InvalidStride { width, stride });
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(SgmError::InvalidDimensions { width, height })?;
    Ok(needed)
}

/// Owned contiguous grayscale image buffer.
#[derive(Clone, Debug)]
pub struct OwnedImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl OwnedImage {
    /// Creates an owned image from a vector holding exactly `width * height`
    /// row-major samples.
    pub fn from_vec(data: Vec<u8>, width: usize, height: usize) -> SgmResult<Self> {
        if width == 0 || height == 0 {
            return Err(SgmError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(SgmError::InvalidDimensions { width, height })?;
        if data.len() != needed {
            return Err(SgmError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the raw row-major samples.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns a borrowed view over the full image.
    pub fn view(&self) -> ImageView<'_> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }
}

/// A rectified stereo pair. Both grids share identical dimensions.
#[derive(Debug)]
pub struct StereoPair {
    left: OwnedImage,
    right: OwnedImage,
}

impl StereoPair {
    /// Builds a pair, rejecting mismatched geometries.
    pub fn new(left: OwnedImage, right: OwnedImage) -> SgmResult<Self> {
        if left.width() != right.width() || left.height() != right.height() {
            return Err(SgmError::DimensionMismatch {
                left_width: left.width(),
                left_height: left.height(),
                right_width: right.width(),
                right_height: right.height(),
            });
        }
        Ok(Self { left, right })
    }

    pub fn left(&self) -> &OwnedImage {
        &self.left
    }

    pub fn right(&self) -> &OwnedImage {
        &self.right
    }

    pub fn width(&self) -> usize {
        self.left.width()
    }

    pub fn height(&self) -> usize {
        self.left.height()
    }
}

#[cfg(test)]
mod tests {
    use super::{ImageView, OwnedImage, StereoPair};
    use crate::util::SgmError;

    #[test]
    fn view_rejects_short_buffer() {
        let data = vec![0u8; 5];
        let err = ImageView::from_slice(&data, 3, 2).unwrap_err();
        assert!(matches!(err, SgmError::BufferTooSmall { needed: 6, got: 5 }));
    }

    #[test]
    fn view_with_stride_indexes_rows() {
        let data: Vec<u8> = (0..12).collect();
        let view = ImageView::new(&data, 3, 3, 4).unwrap();
        assert_eq!(view.row(1).unwrap(), &[4, 5, 6]);
        assert_eq!(view.get(2, 2), Some(10));
        assert_eq!(view.get(3, 0), None);
    }

    #[test]
    fn clamped_access_replicates_border() {
        let data = vec![1u8, 2, 3, 4];
        let view = ImageView::from_slice(&data, 2, 2).unwrap();
        assert_eq!(view.get_clamped(-3, 0), 1);
        assert_eq!(view.get_clamped(5, 5), 4);
    }

    #[test]
    fn owned_image_rejects_wrong_length() {
        let err = OwnedImage::from_vec(vec![0u8; 5], 3, 2).unwrap_err();
        assert!(matches!(err, SgmError::BufferTooSmall { needed: 6, got: 5 }));
    }

    #[test]
    fn pair_rejects_dimension_mismatch() {
        let left = OwnedImage::from_vec(vec![0; 6], 3, 2).unwrap();
        let right = OwnedImage::from_vec(vec![0; 4], 2, 2).unwrap();
        assert!(matches!(
            StereoPair::new(left, right).unwrap_err(),
            SgmError::DimensionMismatch { .. }
        ));
    }
}
