//! Confidence filters: left-right consistency, uniqueness, speckle removal.
//!
//! All three mutate the disparity map's validity bitmap in place. Values of
//! invalidated pixels are retained; the bitmap is what downstream consumers
//! honor.

use crate::disparity::DisparityMap;
use crate::params::SgmParams;
use crate::select::WtaResult;

/// Invalidates pixels whose best match is not sufficiently better than the
/// runner-up: `(second - best) * 100 < ratio * max(best, 1)`.
///
/// No-op when `uniqueness_ratio` is 0.
pub fn apply_uniqueness_filter(result: &mut WtaResult, params: &SgmParams) {
    let ratio = params.uniqueness_ratio as u64;
    if ratio == 0 {
        return;
    }
    let width = result.map.width();
    let height = result.map.height();
    for idx in 0..width * height {
        if !result.map.is_valid_idx(idx) {
            continue;
        }
        let best = result.best_cost[idx] as u64;
        let second = result.second_cost[idx] as u64;
        let margin = second.saturating_sub(best) * 100;
        if margin < ratio * best.max(1) {
            result.map.invalidate_idx(idx);
        }
    }
}

/// Cross-validates the left map against the independently computed
/// right-to-left map: pixel `(x, y)` with disparity `d` must agree with the
/// right map at `(x - round(d), y)` within `disp12_max_diff`.
///
/// Out-of-bounds or invalid correspondences invalidate the pixel. No-op when
/// `disp12_max_diff` is negative.
pub fn apply_consistency_filter(
    left: &mut DisparityMap,
    right: &DisparityMap,
    params: &SgmParams,
) {
    if params.disp12_max_diff < 0 {
        return;
    }
    let tolerance = params.disp12_max_diff as f32;
    let width = left.width();
    let height = left.height();

    for y in 0..height {
        for x in 0..width {
            let Some(d) = left.get(x, y) else { continue };
            let rx = x as i64 - d.round() as i64;
            if rx < 0 || rx >= width as i64 {
                left.invalidate(x, y);
                continue;
            }
            match right.get(rx as usize, y) {
                Some(rd) if (d - rd).abs() <= tolerance => {}
                _ => left.invalidate(x, y),
            }
        }
    }
}

/// Removes small disconnected disparity blobs.
///
/// Valid pixels are 4-connected when their disparities differ by at most
/// `speckle_range`; every connected component smaller than
/// `speckle_window_size` is invalidated en masse. No-op when
/// `speckle_window_size` is 0.
pub fn apply_speckle_filter(map: &mut DisparityMap, params: &SgmParams) {
    if params.speckle_window_size == 0 {
        return;
    }
    let width = map.width();
    let height = map.height();
    let range = params.speckle_range as f32;

    let mut visited = vec![false; width * height];
    let mut stack: Vec<usize> = Vec::new();
    let mut component: Vec<usize> = Vec::new();

    for start in 0..width * height {
        if visited[start] || !map.is_valid_idx(start) {
            continue;
        }

        // Iterative flood fill; recursion depth would scale with image area.
        component.clear();
        stack.push(start);
        visited[start] = true;
        while let Some(idx) = stack.pop() {
            component.push(idx);
            let x = idx % width;
            let y = idx / width;
            let d = map.raw(idx);

            let mut try_neighbor = |nx: usize, ny: usize| {
                let nidx = ny * width + nx;
                if !visited[nidx]
                    && map.is_valid_idx(nidx)
                    && (map.raw(nidx) - d).abs() <= range
                {
                    visited[nidx] = true;
                    stack.push(nidx);
                }
            };

            if x > 0 {
                try_neighbor(x - 1, y);
            }
            if x + 1 < width {
                try_neighbor(x + 1, y);
            }
            if y > 0 {
                try_neighbor(x, y - 1);
            }
            if y + 1 < height {
                try_neighbor(x, y + 1);
            }
        }

        if component.len() < params.speckle_window_size {
            for &idx in &component {
                map.invalidate_idx(idx);
            }
        }
    }
}
