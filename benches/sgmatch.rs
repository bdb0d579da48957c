use criterion::{criterion_group, criterion_main, Criterion};
use sgmatch::{
    build_cost_volume, MatchDirection, OwnedImage, SgmMatcher, SgmParams, StereoPair,
};
use std::hint::black_box;

fn make_pair(width: usize, height: usize, shift: usize) -> StereoPair {
    let texture: Vec<u8> = (0..(width + shift) * height)
        .map(|i| {
            let (x, y) = (i % (width + shift), i / (width + shift));
            ((x * 13) ^ (y * 7) ^ (x * y)) as u8
        })
        .collect();
    let mut left = vec![0u8; width * height];
    let mut right = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            left[y * width + x] = texture[y * (width + shift) + x];
            right[y * width + x] = texture[y * (width + shift) + x + shift];
        }
    }
    StereoPair::new(
        OwnedImage::from_vec(left, width, height).unwrap(),
        OwnedImage::from_vec(right, width, height).unwrap(),
    )
    .unwrap()
}

fn bench_params() -> SgmParams {
    SgmParams {
        num_disparities: 32,
        block_size: 5,
        ..SgmParams::default()
    }
}

fn bench_cost_volume(c: &mut Criterion) {
    let pair = make_pair(160, 120, 7);
    let params = bench_params();
    c.bench_function("cost_volume_160x120_d32", |b| {
        b.iter(|| {
            let volume = build_cost_volume(
                black_box(pair.left().view()),
                black_box(pair.right().view()),
                &params,
                MatchDirection::LeftToRight,
            )
            .unwrap();
            black_box(volume)
        })
    });
}

fn bench_full_pipeline(c: &mut Criterion) {
    let pair = make_pair(160, 120, 7);
    let matcher = SgmMatcher::new(bench_params()).unwrap();
    c.bench_function("sgm_pipeline_160x120_d32", |b| {
        b.iter(|| {
            let map = matcher.compute(black_box(&pair)).unwrap();
            black_box(map)
        })
    });
}

criterion_group!(benches, bench_cost_volume, bench_full_pipeline);
criterion_main!(benches);
