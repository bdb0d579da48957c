//! Matcher parameters and their validation.

use crate::util::{SgmError, SgmResult};

/// `num_disparities` must be a positive multiple of this granularity; it
/// bounds the inner-loop width a vectorized kernel may assume.
pub const DISPARITY_GRANULARITY: usize = 16;

/// Number of aggregation directions used by the path aggregator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AggregationPaths {
    /// Horizontal and vertical scans only.
    Four,
    /// Horizontal, vertical, and the four diagonals.
    Eight,
}

impl AggregationPaths {
    /// Direction vectors in their fixed processing order.
    pub(crate) fn directions(self) -> &'static [(i32, i32)] {
        const EIGHT: [(i32, i32); 8] = [
            (1, 0),
            (-1, 0),
            (0, 1),
            (0, -1),
            (1, 1),
            (-1, 1),
            (1, -1),
            (-1, -1),
        ];
        match self {
            AggregationPaths::Four => &EIGHT[..4],
            AggregationPaths::Eight => &EIGHT,
        }
    }
}

/// Semi-global matching parameters.
///
/// `p1` penalizes a one-step disparity change between neighboring pixels on
/// an aggregation path; `p2` penalizes larger jumps. Defaults follow the
/// common `8*3*block^2` / `32*3*block^2` choice for a 5x5 matching window.
#[derive(Clone, Copy, Debug)]
pub struct SgmParams {
    /// Smallest candidate disparity; may be negative.
    pub min_disparity: i32,
    /// Number of candidate disparities; positive multiple of 16.
    pub num_disparities: usize,
    /// Side of the square matching window; odd, at least 1.
    pub block_size: usize,
    /// Small-discontinuity penalty.
    pub p1: u32,
    /// Large-discontinuity penalty; must be at least `p1`.
    pub p2: u32,
    /// Left-right consistency tolerance in disparity units; negative disables.
    pub disp12_max_diff: i32,
    /// Uniqueness margin in percent; 0 disables the uniqueness filter.
    pub uniqueness_ratio: u32,
    /// Minimum connected-component size kept by the speckle filter; 0 disables.
    pub speckle_window_size: usize,
    /// Maximum disparity difference within one speckle component.
    pub speckle_range: i32,
    /// Aggregation direction count.
    pub paths: AggregationPaths,
}

impl Default for SgmParams {
    fn default() -> Self {
        let block_size = 5;
        Self {
            min_disparity: 0,
            num_disparities: 160,
            block_size,
            p1: 8 * 3 * (block_size * block_size) as u32,
            p2: 32 * 3 * (block_size * block_size) as u32,
            disp12_max_diff: 1,
            uniqueness_ratio: 10,
            speckle_window_size: 100,
            speckle_range: 32,
            paths: AggregationPaths::Eight,
        }
    }
}

impl SgmParams {
    /// Checks every constraint, reporting the first violation.
    pub fn validate(&self) -> SgmResult<()> {
        if self.num_disparities == 0 || self.num_disparities % DISPARITY_GRANULARITY != 0 {
            return Err(SgmError::config(format!(
                "num_disparities must be a positive multiple of {DISPARITY_GRANULARITY}, got {}",
                self.num_disparities
            )));
        }
        if self.block_size == 0 || self.block_size % 2 == 0 {
            return Err(SgmError::config(format!(
                "block_size must be odd and positive, got {}",
                self.block_size
            )));
        }
        if self.p2 < self.p1 {
            return Err(SgmError::config(format!(
                "p2 ({}) must be at least p1 ({})",
                self.p2, self.p1
            )));
        }
        if self.speckle_range < 0 {
            return Err(SgmError::config(format!(
                "speckle_range must be non-negative, got {}",
                self.speckle_range
            )));
        }
        Ok(())
    }

    /// Largest possible window cost: every sample maximally different.
    #[cfg(test)]
    pub(crate) fn max_window_cost(&self) -> u32 {
        255 * (self.block_size * self.block_size) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::{AggregationPaths, SgmParams};
    use crate::util::SgmError;

    #[test]
    fn defaults_validate() {
        SgmParams::default().validate().unwrap();
    }

    #[test]
    fn rejects_even_block_size() {
        let params = SgmParams {
            block_size: 4,
            ..SgmParams::default()
        };
        assert!(matches!(
            params.validate().unwrap_err(),
            SgmError::Configuration { .. }
        ));
    }

    #[test]
    fn rejects_zero_and_unaligned_num_disparities() {
        for nd in [0usize, 10, 17] {
            let params = SgmParams {
                num_disparities: nd,
                ..SgmParams::default()
            };
            assert!(params.validate().is_err(), "num_disparities {nd} accepted");
        }
    }

    #[test]
    fn rejects_p2_below_p1() {
        let params = SgmParams {
            p1: 100,
            p2: 50,
            ..SgmParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn direction_sets_have_expected_sizes() {
        assert_eq!(AggregationPaths::Four.directions().len(), 4);
        assert_eq!(AggregationPaths::Eight.directions().len(), 8);
        // The four-path set is a prefix of the eight-path set, so switching
        // path counts never reorders shared directions.
        assert_eq!(
            AggregationPaths::Eight.directions()[..4],
            AggregationPaths::Four.directions()[..]
        );
    }
}
