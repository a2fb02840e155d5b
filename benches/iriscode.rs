use criterion::{criterion_group, criterion_main, Criterion};
use iriscode::{
    create_mask, hamming_distance, normalize_iris, BoundaryPair, Circle, FeatureEncoder,
    GaborConfig, ImageView, MaskConfig, NormalizeConfig, SegmentConfig, Segmenter,
};
use std::hint::black_box;

fn make_eye(width: usize, height: usize, pupil_r: f32, iris_r: f32) -> Vec<u8> {
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let d = (dx * dx + dy * dy).sqrt();
            let value = if d <= pupil_r {
                20
            } else if d <= iris_r {
                (110 + ((x * 13) ^ (y * 7)) % 30) as u8
            } else {
                220
            };
            data.push(value);
        }
    }
    data
}

fn bench_pipeline(c: &mut Criterion) {
    let width = 320;
    let height = 280;
    let eye = make_eye(width, height, 32.0, 95.0);
    let view = ImageView::from_slice(&eye, width, height).unwrap();
    let pair = BoundaryPair {
        pupil: Circle::new(160.0, 140.0, 32.0),
        iris: Circle::new(160.0, 140.0, 95.0),
    };

    let segmenter = Segmenter::new(SegmentConfig {
        edge_threshold: 150.0,
        ..SegmentConfig::default()
    })
    .unwrap();
    c.bench_function("segment_320x280", |b| {
        b.iter(|| black_box(segmenter.detect_circles(view)));
    });

    let norm_cfg = NormalizeConfig::default();
    c.bench_function("normalize_64x512", |b| {
        b.iter(|| black_box(normalize_iris(view, &pair, &norm_cfg).unwrap()));
    });

    let normalized = normalize_iris(view, &pair, &norm_cfg).unwrap();
    let encoder = FeatureEncoder::new(&GaborConfig::default()).unwrap();
    c.bench_function("encode_4x64x512", |b| {
        b.iter(|| black_box(encoder.encode(&normalized)));
    });

    #[cfg(feature = "rayon")]
    {
        let parallel = FeatureEncoder::new(&GaborConfig {
            parallel: true,
            ..GaborConfig::default()
        })
        .unwrap();
        c.bench_function("encode_4x64x512_rayon", |b| {
            b.iter(|| black_box(parallel.encode(&normalized)));
        });
    }

    let template = encoder.encode(&normalized);
    let mask = create_mask(&normalized, &MaskConfig::default()).unwrap();
    c.bench_function("hamming_262144_bits", |b| {
        b.iter(|| black_box(hamming_distance(&template, &template, &mask, &mask)));
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
