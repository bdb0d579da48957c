//! Multi-direction path aggregation with smoothness penalties.
//!
//! Each direction is a 1-D dynamic program along its scan order:
//!
//! ```text
//! L(p, d) = C(p, d) + min( L(q, d),
//!                          L(q, d - 1) + P1,
//!                          L(q, d + 1) + P1,
//!                          min_d' L(q, d') + P2 ) - min_d' L(q, d')
//! ```
//!
//! where `q` is the previous pixel along the path. Subtracting the previous
//! pixel's minimum keeps path costs bounded by `C_max + P2`. Per-direction
//! values are summed elementwise into the aggregated volume with saturating
//! arithmetic; direction order is fixed, so the sum is deterministic. A single
//! scratch volume is reused across directions, bounding peak memory at two
//! volumes regardless of the direction count.

use crate::cost::CostVolume;
use crate::params::SgmParams;

/// Aggregates the raw cost volume along the configured directions.
pub fn aggregate_costs(volume: &CostVolume, params: &SgmParams) -> CostVolume {
    let width = volume.width();
    let height = volume.height();
    let num_disparities = volume.num_disparities();

    let mut aggregated = CostVolume::zeroed(width, height, num_disparities);
    let mut path_costs = vec![0u32; width * height * num_disparities];

    for &(dx, dy) in params.paths.directions() {
        aggregate_along_path(
            volume.data(),
            aggregated.data_mut(),
            &mut path_costs,
            width,
            height,
            num_disparities,
            params.p1,
            params.p2,
            dx,
            dy,
        );
    }

    aggregated
}

#[allow(clippy::too_many_arguments)]
fn aggregate_along_path(
    costs: &[u32],
    aggregated: &mut [u32],
    path_costs: &mut [u32],
    width: usize,
    height: usize,
    num_disparities: usize,
    p1: u32,
    p2: u32,
    dx: i32,
    dy: i32,
) {
    // Scan order follows the direction sign so that the predecessor
    // `(x - dx, y - dy)` is always already computed.
    let (x_start, x_end, x_step) = if dx >= 0 {
        (0i32, width as i32, 1i32)
    } else {
        (width as i32 - 1, -1i32, -1i32)
    };
    let (y_start, y_end, y_step) = if dy >= 0 {
        (0i32, height as i32, 1i32)
    } else {
        (height as i32 - 1, -1i32, -1i32)
    };

    let mut y = y_start;
    while y != y_end {
        let mut x = x_start;
        while x != x_end {
            let idx_base = (y as usize * width + x as usize) * num_disparities;
            let px = x - dx;
            let py = y - dy;
            let has_prev = px >= 0 && px < width as i32 && py >= 0 && py < height as i32;

            if has_prev {
                let prev_base = (py as usize * width + px as usize) * num_disparities;
                let mut prev_min = u32::MAX;
                for pd in 0..num_disparities {
                    prev_min = prev_min.min(path_costs[prev_base + pd]);
                }
                let jump = prev_min.saturating_add(p2);

                for d in 0..num_disparities {
                    let same = path_costs[prev_base + d];
                    let down = if d > 0 {
                        path_costs[prev_base + d - 1].saturating_add(p1)
                    } else {
                        u32::MAX
                    };
                    let up = if d + 1 < num_disparities {
                        path_costs[prev_base + d + 1].saturating_add(p1)
                    } else {
                        u32::MAX
                    };
                    let best = same.min(down).min(up).min(jump);
                    let value = costs[idx_base + d].saturating_add(best - prev_min);
                    path_costs[idx_base + d] = value;
                    aggregated[idx_base + d] = aggregated[idx_base + d].saturating_add(value);
                }
            } else {
                // Path start: the recurrence has no predecessor, copy raw cost.
                for d in 0..num_disparities {
                    let value = costs[idx_base + d];
                    path_costs[idx_base + d] = value;
                    aggregated[idx_base + d] = aggregated[idx_base + d].saturating_add(value);
                }
            }

            x += x_step;
        }
        y += y_step;
    }
}

#[cfg(test)]
mod tests {
    use super::aggregate_costs;
    use crate::cost::{build_cost_volume, MatchDirection};
    use crate::image::ImageView;
    use crate::params::{AggregationPaths, SgmParams};

    fn params(paths: AggregationPaths) -> SgmParams {
        SgmParams {
            num_disparities: 16,
            block_size: 3,
            paths,
            ..SgmParams::default()
        }
    }

    #[test]
    fn aggregation_preserves_a_unanimous_minimum() {
        // Identical images: raw cost is zero at d = 0 everywhere, positive
        // elsewhere, and smoothing must not move the minimum.
        let width = 20;
        let height = 10;
        let data: Vec<u8> = (0..width * height)
            .map(|i| (((i % width) * 13) ^ ((i / width) * 29)) as u8)
            .collect();
        let view = ImageView::from_slice(&data, width, height).unwrap();
        let params = params(AggregationPaths::Eight);

        let raw = build_cost_volume(view, view, &params, MatchDirection::LeftToRight).unwrap();
        let aggregated = aggregate_costs(&raw, &params);

        for y in 0..height {
            for x in 0..width {
                let costs = aggregated.costs_at(x, y);
                let best = costs
                    .iter()
                    .enumerate()
                    .min_by_key(|&(_, &c)| c)
                    .map(|(d, _)| d)
                    .unwrap();
                assert_eq!(best, 0, "minimum moved at ({x},{y})");
            }
        }
    }

    #[test]
    fn path_costs_stay_bounded() {
        // The min-subtraction keeps every path value at most C + P2, so the
        // aggregated sum is bounded by paths * (C_max + P2).
        let width = 16;
        let height = 16;
        let data: Vec<u8> = (0..width * height).map(|i| (i * 37 % 256) as u8).collect();
        let view = ImageView::from_slice(&data, width, height).unwrap();
        let params = params(AggregationPaths::Eight);

        let raw = build_cost_volume(view, view, &params, MatchDirection::LeftToRight).unwrap();
        let aggregated = aggregate_costs(&raw, &params);

        let bound = 8 * (params.max_window_cost() + params.p2);
        for &c in aggregated.data() {
            assert!(c <= bound, "aggregated cost {c} exceeds bound {bound}");
        }
    }

    #[test]
    fn eight_path_totals_dominate_four_path_totals() {
        let width = 12;
        let height = 12;
        let data: Vec<u8> = (0..width * height).map(|i| (i % 256) as u8).collect();
        let view = ImageView::from_slice(&data, width, height).unwrap();

        let p4 = params(AggregationPaths::Four);
        let p8 = params(AggregationPaths::Eight);
        let raw = build_cost_volume(view, view, &p4, MatchDirection::LeftToRight).unwrap();

        let agg4 = aggregate_costs(&raw, &p4);
        let agg8 = aggregate_costs(&raw, &p8);
        // Eight-path totals dominate four-path totals elementwise since the
        // first four directions are identical and path costs are non-negative.
        for (a, b) in agg4.data().iter().zip(agg8.data()) {
            assert!(a <= b);
        }
    }
}
