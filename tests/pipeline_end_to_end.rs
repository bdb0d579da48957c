use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sgmatch::{OwnedImage, SgmMatcher, SgmParams, StereoPair};

/// Disparity applied to the synthetic scenes.
const SHIFT: usize = 5;

fn test_params() -> SgmParams {
    SgmParams {
        num_disparities: 16,
        block_size: 5,
        p1: 8 * 3 * 25,
        p2: 32 * 3 * 25,
        speckle_window_size: 50,
        ..SgmParams::default()
    }
}

/// Left image with dense random texture and the right image shifted so that
/// every left pixel `x` corresponds to right pixel `x - SHIFT`.
fn shifted_textured_pair(width: usize, height: usize) -> StereoPair {
    let mut rng = StdRng::seed_from_u64(7);
    let texture: Vec<u8> = (0..(width + SHIFT) * height)
        .map(|_| rng.random_range(0..=255u8))
        .collect();

    let mut left = vec![0u8; width * height];
    let mut right = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            left[y * width + x] = texture[y * (width + SHIFT) + x];
            right[y * width + x] = texture[y * (width + SHIFT) + x + SHIFT];
        }
    }
    StereoPair::new(
        OwnedImage::from_vec(left, width, height).unwrap(),
        OwnedImage::from_vec(right, width, height).unwrap(),
    )
    .unwrap()
}

#[test]
fn recovers_constant_shift_on_textured_scene() {
    let width = 96;
    let height = 48;
    let pair = shifted_textured_pair(width, height);
    let params = test_params();
    let matcher = SgmMatcher::new(params).unwrap();
    let map = matcher.compute(&pair).unwrap();

    // Interior: far enough from the left edge that every candidate window is
    // in range, and clear of the vertical window border.
    let margin_x = params.num_disparities + params.block_size;
    let margin_y = params.block_size;
    let mut valid = 0usize;
    let mut total = 0usize;
    for y in margin_y..height - margin_y {
        for x in margin_x..width - margin_x {
            total += 1;
            if let Some(d) = map.get(x, y) {
                valid += 1;
                assert!(
                    (d - SHIFT as f32).abs() <= 1.0,
                    "pixel ({x},{y}) has disparity {d}, expected ~{SHIFT}"
                );
            }
        }
    }
    assert!(
        valid * 10 >= total * 8,
        "only {valid}/{total} interior pixels survived filtering"
    );
}

#[test]
fn step_pattern_matches_at_the_edges() {
    // Vertical black/white step pattern shifted by SHIFT pixels. Flat stripe
    // interiors are ambiguous and may be filtered; whatever survives must
    // still read ~SHIFT.
    let width = 96;
    let height = 32;
    let pattern = |x: usize| -> u8 {
        if (x / 8) % 2 == 0 {
            230
        } else {
            25
        }
    };
    let mut left = vec![0u8; width * height];
    let mut right = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            left[y * width + x] = pattern(x);
            right[y * width + x] = pattern(x + SHIFT);
        }
    }
    let pair = StereoPair::new(
        OwnedImage::from_vec(left, width, height).unwrap(),
        OwnedImage::from_vec(right, width, height).unwrap(),
    )
    .unwrap();

    let params = SgmParams {
        speckle_window_size: 0,
        ..test_params()
    };
    let matcher = SgmMatcher::new(params).unwrap();
    let map = matcher.compute(&pair).unwrap();

    let margin_x = params.num_disparities + params.block_size;
    let mut checked = 0usize;
    for y in params.block_size..height - params.block_size {
        for x in margin_x..width - margin_x {
            if let Some(d) = map.get(x, y) {
                checked += 1;
                assert!(
                    (d - SHIFT as f32).abs() <= 1.0,
                    "pixel ({x},{y}) has disparity {d}, expected ~{SHIFT}"
                );
            }
        }
    }
    assert!(checked > 0, "every pixel was filtered out");
}

#[test]
fn identical_pair_yields_zero_disparity() {
    let width = 80;
    let height = 40;
    let mut rng = StdRng::seed_from_u64(11);
    let data: Vec<u8> = (0..width * height)
        .map(|_| rng.random_range(0..=255u8))
        .collect();
    let pair = StereoPair::new(
        OwnedImage::from_vec(data.clone(), width, height).unwrap(),
        OwnedImage::from_vec(data, width, height).unwrap(),
    )
    .unwrap();

    let matcher = SgmMatcher::new(test_params()).unwrap();
    let map = matcher.compute(&pair).unwrap();

    let params = test_params();
    let margin_x = params.num_disparities + params.block_size;
    for y in params.block_size..height - params.block_size {
        for x in margin_x..width - margin_x {
            if let Some(d) = map.get(x, y) {
                assert!(d.abs() <= 1.0, "pixel ({x},{y}) has disparity {d}");
            }
        }
    }
    assert!(map.valid_count() > 0);
}

#[test]
fn pipeline_is_deterministic() {
    let pair = shifted_textured_pair(64, 32);
    let matcher = SgmMatcher::new(test_params()).unwrap();

    let first = matcher.compute(&pair).unwrap();
    let second = matcher.compute(&pair).unwrap();

    assert_eq!(first.width(), second.width());
    assert_eq!(first.height(), second.height());
    for y in 0..first.height() {
        for x in 0..first.width() {
            assert_eq!(
                first.get(x, y),
                second.get(x, y),
                "maps differ at ({x},{y})"
            );
        }
    }
}
