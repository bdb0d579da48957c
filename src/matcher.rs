//! The full semi-global matching pipeline.

use crate::aggregate::aggregate_costs;
use crate::cost::{build_cost_volume, MatchDirection};
use crate::disparity::DisparityMap;
use crate::filter::{apply_consistency_filter, apply_speckle_filter, apply_uniqueness_filter};
use crate::image::StereoPair;
use crate::params::SgmParams;
use crate::select::{select_disparities, WtaResult};
use crate::trace::{trace_event, trace_span};
use crate::util::SgmResult;

/// Semi-global stereo matcher.
///
/// Parameters are validated once at construction; [`compute`](Self::compute)
/// itself produces no recoverable errors, since degraded input degrades into
/// a higher density of invalid pixels instead.
#[derive(Debug)]
pub struct SgmMatcher {
    params: SgmParams,
}

impl SgmMatcher {
    /// Validates `params` and builds a matcher.
    pub fn new(params: SgmParams) -> SgmResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Matcher with the default Middlebury-oriented parameters.
    pub fn with_defaults() -> Self {
        Self {
            params: SgmParams::default(),
        }
    }

    pub fn params(&self) -> &SgmParams {
        &self.params
    }

    /// Runs cost computation, aggregation, selection, and filtering on a
    /// rectified pair, returning the filtered disparity map of the left image.
    pub fn compute(&self, pair: &StereoPair) -> SgmResult<DisparityMap> {
        let _guard = trace_span!("sgm_compute").entered();
        trace_event!(
            "input",
            width = pair.width(),
            height = pair.height(),
            num_disparities = self.params.num_disparities,
        );

        let (mut left, right_map) = self.compute_halves(pair)?;

        {
            let _guard = trace_span!("filters").entered();
            apply_uniqueness_filter(&mut left, &self.params);
            if let Some(right_map) = right_map {
                apply_consistency_filter(&mut left.map, &right_map, &self.params);
            }
            apply_speckle_filter(&mut left.map, &self.params);
        }

        trace_event!("valid_pixels", count = left.map.valid_count());
        Ok(left.map)
    }

    /// Runs the left-to-right half pipeline and, when the consistency check
    /// is enabled, the independent right-to-left one.
    #[cfg(feature = "rayon")]
    fn compute_halves(&self, pair: &StereoPair) -> SgmResult<(WtaResult, Option<DisparityMap>)> {
        if self.params.disp12_max_diff < 0 {
            return Ok((self.half_pipeline(pair, MatchDirection::LeftToRight)?, None));
        }
        let (left, right) = rayon::join(
            || self.half_pipeline(pair, MatchDirection::LeftToRight),
            || self.half_pipeline(pair, MatchDirection::RightToLeft),
        );
        Ok((left?, Some(right?.map)))
    }

    #[cfg(not(feature = "rayon"))]
    fn compute_halves(&self, pair: &StereoPair) -> SgmResult<(WtaResult, Option<DisparityMap>)> {
        let left = self.half_pipeline(pair, MatchDirection::LeftToRight)?;
        if self.params.disp12_max_diff < 0 {
            return Ok((left, None));
        }
        let right = self.half_pipeline(pair, MatchDirection::RightToLeft)?;
        Ok((left, Some(right.map)))
    }

    fn half_pipeline(&self, pair: &StereoPair, direction: MatchDirection) -> SgmResult<WtaResult> {
        let (base, matched) = match direction {
            MatchDirection::LeftToRight => (pair.left().view(), pair.right().view()),
            MatchDirection::RightToLeft => (pair.right().view(), pair.left().view()),
        };

        let raw = {
            let _guard = trace_span!("cost_volume").entered();
            build_cost_volume(base, matched, &self.params, direction)?
        };
        let aggregated = {
            let _guard = trace_span!("aggregate").entered();
            aggregate_costs(&raw, &self.params)
        };
        drop(raw);
        let _guard = trace_span!("select").entered();
        Ok(select_disparities(&aggregated, &self.params, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::SgmMatcher;
    use crate::image::{OwnedImage, StereoPair};
    use crate::params::SgmParams;
    use crate::util::SgmError;

    #[test]
    fn construction_rejects_invalid_params() {
        let params = SgmParams {
            block_size: 2,
            ..SgmParams::default()
        };
        assert!(matches!(
            SgmMatcher::new(params).unwrap_err(),
            SgmError::Configuration { .. }
        ));
    }

    #[test]
    fn every_valid_disparity_is_in_range() {
        let params = SgmParams {
            num_disparities: 16,
            block_size: 3,
            min_disparity: -2,
            speckle_window_size: 0,
            ..SgmParams::default()
        };
        let width = 48;
        let height = 24;
        let data: Vec<u8> = (0..width * height)
            .map(|i| {
                let (x, y) = (i % width, i / width);
                ((x * 19) ^ (y * 7) ^ (x * y)) as u8
            })
            .collect();
        let left = OwnedImage::from_vec(data.clone(), width, height).unwrap();
        let right = OwnedImage::from_vec(data, width, height).unwrap();
        let pair = StereoPair::new(left, right).unwrap();

        let matcher = SgmMatcher::new(params).unwrap();
        let map = matcher.compute(&pair).unwrap();

        let lo = params.min_disparity as f32;
        let hi = (params.min_disparity + params.num_disparities as i32) as f32;
        for y in 0..height {
            for x in 0..width {
                if let Some(d) = map.get(x, y) {
                    assert!((lo..hi).contains(&d), "disparity {d} out of range");
                }
            }
        }
    }
}
