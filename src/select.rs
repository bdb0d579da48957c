//! Winner-take-all disparity selection with sub-pixel refinement.

use crate::cost::{CostVolume, MatchDirection};
use crate::disparity::DisparityMap;
use crate::params::SgmParams;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Selector output: the disparity map plus the per-pixel cost evidence the
/// uniqueness filter needs.
pub struct WtaResult {
    pub map: DisparityMap,
    /// Minimum aggregated cost per pixel.
    pub(crate) best_cost: Vec<u32>,
    /// Best aggregated cost at a disparity at least 2 away from the winner.
    /// Equal to `best_cost` when no such runner-up exists, so the uniqueness
    /// margin of an evidence-free pixel is zero.
    pub(crate) second_cost: Vec<u32>,
}

/// Per-row geometry needed to restrict candidates to disparities whose
/// matching window lies fully inside the matched image. A window shifted out
/// of bounds compares against replicated border content and is no evidence of
/// a match, so it participates in neither the winner nor the runner-up search.
#[derive(Clone, Copy)]
struct CandidateWindow {
    width: usize,
    half: i32,
    min_disparity: i32,
    num_disparities: usize,
    direction: MatchDirection,
}

impl CandidateWindow {
    /// In-bounds candidate interval `[lo, hi]` for pixel column `x`, or
    /// `None` when every candidate window leaves the matched image.
    fn range_at(&self, x: usize) -> Option<(usize, usize)> {
        let x = x as i32;
        let last = self.width as i32 - 1;
        let (lo, hi) = match self.direction {
            // matched column = x - (min + d); window spans +-half around it.
            MatchDirection::LeftToRight => (
                x + self.half - last - self.min_disparity,
                x - self.half - self.min_disparity,
            ),
            // matched column = x + (min + d).
            MatchDirection::RightToLeft => (
                self.half - x - self.min_disparity,
                last - x - self.half - self.min_disparity,
            ),
        };
        let lo = lo.max(0);
        let hi = hi.min(self.num_disparities as i32 - 1);
        (lo <= hi).then_some((lo as usize, hi as usize))
    }
}

/// Picks, per pixel, the in-range disparity minimizing aggregated cost.
///
/// Pixels with no in-range candidate (near the border on the matched side)
/// come out invalid; everything else starts valid and is pruned later by the
/// consistency, uniqueness, and speckle filters.
pub fn select_disparities(
    aggregated: &CostVolume,
    params: &SgmParams,
    direction: MatchDirection,
) -> WtaResult {
    let width = aggregated.width();
    let height = aggregated.height();
    let num_disparities = aggregated.num_disparities();

    let mut map = DisparityMap::new(width, height);
    let mut best_cost = vec![0u32; width * height];
    let mut second_cost = vec![0u32; width * height];

    let row_stride = width * num_disparities;
    let window = CandidateWindow {
        width,
        half: (params.block_size / 2) as i32,
        min_disparity: params.min_disparity,
        num_disparities,
        direction,
    };
    let costs = aggregated.data();

    {
        let (values, valid) = map.buffers_mut();

        #[cfg(feature = "rayon")]
        values
            .par_chunks_mut(width)
            .zip(valid.par_chunks_mut(width))
            .zip(best_cost.par_chunks_mut(width))
            .zip(second_cost.par_chunks_mut(width))
            .enumerate()
            .for_each(|(y, (((values_row, valid_row), best_row), second_row))| {
                let row_costs = &costs[y * row_stride..(y + 1) * row_stride];
                select_row(row_costs, window, values_row, valid_row, best_row, second_row);
            });

        #[cfg(not(feature = "rayon"))]
        for (y, (((values_row, valid_row), best_row), second_row)) in values
            .chunks_mut(width)
            .zip(valid.chunks_mut(width))
            .zip(best_cost.chunks_mut(width))
            .zip(second_cost.chunks_mut(width))
            .enumerate()
        {
            let row_costs = &costs[y * row_stride..(y + 1) * row_stride];
            select_row(row_costs, window, values_row, valid_row, best_row, second_row);
        }
    }

    WtaResult {
        map,
        best_cost,
        second_cost,
    }
}

fn select_row(
    row_costs: &[u32],
    window: CandidateWindow,
    values_row: &mut [f32],
    valid_row: &mut [bool],
    best_row: &mut [u32],
    second_row: &mut [u32],
) {
    let num_disparities = window.num_disparities;
    for x in 0..values_row.len() {
        let Some((d_lo, d_hi)) = window.range_at(x) else {
            valid_row[x] = false;
            continue;
        };
        let pixel = &row_costs[x * num_disparities..(x + 1) * num_disparities];

        let mut best_d = d_lo;
        let mut best = pixel[d_lo];
        for d in d_lo + 1..=d_hi {
            if pixel[d] < best {
                best = pixel[d];
                best_d = d;
            }
        }

        // Runner-up at least 2 disparity steps away, for the uniqueness check.
        let mut second = u32::MAX;
        for d in d_lo..=d_hi {
            if d.abs_diff(best_d) >= 2 && pixel[d] < second {
                second = pixel[d];
            }
        }

        let mut disparity = (window.min_disparity + best_d as i32) as f32;
        if best_d > d_lo && best_d < d_hi {
            if let Some(offset) = quad_min_offset_1d(
                pixel[best_d - 1] as f32,
                pixel[best_d] as f32,
                pixel[best_d + 1] as f32,
            ) {
                disparity += offset;
            }
        }

        values_row[x] = disparity;
        valid_row[x] = true;
        best_row[x] = best;
        second_row[x] = if second == u32::MAX { best } else { second };
    }
}

/// Estimates the sub-sample minimum offset of a parabola through samples at
/// `x = -1, 0, +1`. Returns `None` when the fit is non-convex or degenerate,
/// which also covers the flat-cost case where refinement is meaningless.
pub(crate) fn quad_min_offset_1d(cm: f32, c0: f32, cp: f32) -> Option<f32> {
    if !cm.is_finite() || !c0.is_finite() || !cp.is_finite() {
        return None;
    }

    let denom = cm - 2.0 * c0 + cp;
    let eps = 1e-6f32;
    if denom.abs() < eps || denom <= 0.0 {
        return None;
    }

    let dx = 0.5 * (cm - cp) / denom;
    if dx.is_finite() && dx.abs() <= 1.0 {
        Some(dx)
    } else {
        None
    }
}
