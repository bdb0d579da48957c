//! Block-matching cost volume construction.
//!
//! The cost of pixel `(x, y)` at candidate disparity `d` is the sum of
//! absolute differences between the matching window centered at `(x, y)` in
//! the base image and the window centered at `(x - sign*(min_disparity + d), y)`
//! in the matched image. Samples outside either image replicate the nearest
//! border pixel, so costs stay comparable across the whole disparity axis and
//! border effects never leak into path aggregation. Candidates whose matching
//! window leaves the matched image are screened out later, during selection.

use crate::image::ImageView;
use crate::params::SgmParams;
use crate::util::{SgmError, SgmResult};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Flat `(y * width + x) * num_disparities + d` cost array.
///
/// Shared shape for the raw and the aggregated volume; both are built once
/// per stereo pair and discarded after the next stage consumes them.
#[derive(Debug)]
pub struct CostVolume {
    data: Vec<u32>,
    width: usize,
    height: usize,
    num_disparities: usize,
}

impl CostVolume {
    pub(crate) fn zeroed(width: usize, height: usize, num_disparities: usize) -> Self {
        Self {
            data: vec![0; width * height * num_disparities],
            width,
            height,
            num_disparities,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_disparities(&self) -> usize {
        self.num_disparities
    }

    /// Cost at `(x, y, d)`.
    pub fn cost(&self, x: usize, y: usize, d: usize) -> u32 {
        self.data[(y * self.width + x) * self.num_disparities + d]
    }

    /// Per-pixel slice of all candidate costs.
    pub fn costs_at(&self, x: usize, y: usize) -> &[u32] {
        let base = (y * self.width + x) * self.num_disparities;
        &self.data[base..base + self.num_disparities]
    }

    pub(crate) fn data(&self) -> &[u32] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u32] {
        &mut self.data
    }
}

/// Which image anchors the disparity axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchDirection {
    /// Base = left image; candidate `d` shifts the window left in the right image.
    LeftToRight,
    /// Base = right image; the disparity axis is negated (window shifts right).
    RightToLeft,
}

impl MatchDirection {
    fn sign(self) -> i32 {
        match self {
            MatchDirection::LeftToRight => 1,
            MatchDirection::RightToLeft => -1,
        }
    }
}

/// Builds the raw matching cost volume. Pure function of its inputs.
pub fn build_cost_volume(
    base: ImageView<'_>,
    matched: ImageView<'_>,
    params: &SgmParams,
    direction: MatchDirection,
) -> SgmResult<CostVolume> {
    params.validate()?;
    if base.width() != matched.width() || base.height() != matched.height() {
        return Err(SgmError::DimensionMismatch {
            left_width: base.width(),
            left_height: base.height(),
            right_width: matched.width(),
            right_height: matched.height(),
        });
    }

    let width = base.width();
    let height = base.height();
    let num_disparities = params.num_disparities;
    let mut volume = CostVolume::zeroed(width, height, num_disparities);
    let row_stride = width * num_disparities;

    #[cfg(feature = "rayon")]
    volume
        .data_mut()
        .par_chunks_mut(row_stride)
        .enumerate()
        .for_each(|(y, row)| fill_cost_row(base, matched, params, direction, y, row));

    #[cfg(not(feature = "rayon"))]
    for (y, row) in volume.data_mut().chunks_mut(row_stride).enumerate() {
        fill_cost_row(base, matched, params, direction, y, row);
    }

    Ok(volume)
}

fn fill_cost_row(
    base: ImageView<'_>,
    matched: ImageView<'_>,
    params: &SgmParams,
    direction: MatchDirection,
    y: usize,
    row_costs: &mut [u32],
) {
    let half = (params.block_size / 2) as isize;
    let sign = direction.sign();
    let num_disparities = params.num_disparities;

    for x in 0..base.width() {
        let pixel_costs = &mut row_costs[x * num_disparities..(x + 1) * num_disparities];
        for (d, slot) in pixel_costs.iter_mut().enumerate() {
            let shift = (sign * (params.min_disparity + d as i32)) as isize;
            let mut acc = 0u32;
            for wy in -half..=half {
                let sy = y as isize + wy;
                for wx in -half..=half {
                    let sx = x as isize + wx;
                    let bv = base.get_clamped(sx, sy);
                    let mv = matched.get_clamped(sx - shift, sy);
                    acc += (bv as i32 - mv as i32).unsigned_abs();
                }
            }
            *slot = acc;
        }
    }
}
