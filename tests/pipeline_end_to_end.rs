use iriscode::{
    BoundaryPair, Circle, ImageView, IrisError, IrisPipeline, MatchDecision, PipelineConfig,
    SegmentConfig,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;

const WIDTH: usize = 320;
const HEIGHT: usize = 280;

/// One sinusoidal texture component in rubber-sheet coordinates:
/// `cycles` around the iris and `radial_freq` cycles per normalized row.
#[derive(Clone, Copy)]
struct Wave {
    cycles: i32,
    radial_freq: f32,
    phase: f32,
}

struct Eye {
    pupil_r: f32,
    iris_r: f32,
    waves: [Wave; 4],
}

fn eye_a() -> Eye {
    Eye {
        pupil_r: 32.0,
        iris_r: 95.0,
        waves: [
            Wave {
                cycles: 51,
                radial_freq: 0.0,
                phase: 0.3,
            },
            Wave {
                cycles: 36,
                radial_freq: 0.07,
                phase: 1.1,
            },
            Wave {
                cycles: 0,
                radial_freq: 0.1,
                phase: 2.0,
            },
            Wave {
                cycles: -36,
                radial_freq: 0.07,
                phase: 0.5,
            },
        ],
    }
}

fn eye_b() -> Eye {
    Eye {
        pupil_r: 28.0,
        iris_r: 90.0,
        waves: [
            Wave {
                cycles: 45,
                radial_freq: 0.0,
                phase: 2.5,
            },
            Wave {
                cycles: 40,
                radial_freq: 0.06,
                phase: 0.2,
            },
            Wave {
                cycles: 0,
                radial_freq: 0.085,
                phase: 1.3,
            },
            Wave {
                cycles: -30,
                radial_freq: 0.08,
                phase: 2.9,
            },
        ],
    }
}

/// Renders `eye` centered at integer `center` with uniform noise in `±noise`.
fn render(eye: &Eye, center: (i32, i32), noise: i32, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let rows_per_px = 63.0 / (eye.iris_r - eye.pupil_r);
    let mut data = Vec::with_capacity(WIDTH * HEIGHT);
    for y in 0..HEIGHT as i32 {
        for x in 0..WIDTH as i32 {
            let dx = (x - center.0) as f32;
            let dy = (y - center.1) as f32;
            let d = (dx * dx + dy * dy).sqrt();
            let base = if d <= eye.pupil_r {
                15.0
            } else if d <= eye.iris_r {
                let theta = dy.atan2(dx).rem_euclid(2.0 * PI);
                let row = (d - eye.pupil_r) * rows_per_px;
                let texture: f32 = eye
                    .waves
                    .iter()
                    .map(|w| {
                        let arg = w.cycles as f32 * theta + 2.0 * PI * w.radial_freq * row;
                        4.0 * (arg + w.phase).sin()
                    })
                    .sum();
                120.0 + texture
            } else {
                235.0
            };
            let jitter = if noise > 0 {
                rng.random_range(-noise..=noise) as f32
            } else {
                0.0
            };
            data.push((base + jitter).round().clamp(0.0, 255.0) as u8);
        }
    }
    data
}

fn synthetic_config() -> PipelineConfig {
    PipelineConfig {
        segment: SegmentConfig {
            accumulator_resolution: 1.0,
            edge_threshold: 200.0,
            ..SegmentConfig::default()
        },
        ..PipelineConfig::default()
    }
}

fn view(data: &[u8]) -> ImageView<'_, u8> {
    ImageView::from_slice(data, WIDTH, HEIGHT).unwrap()
}

#[test]
fn boundaries_are_found_on_textured_eye() {
    let pipeline = IrisPipeline::new(synthetic_config()).unwrap();
    let eye = eye_a();
    let data = render(&eye, (160, 140), 2, 1);
    let pair = pipeline.segmenter().segment(view(&data)).unwrap();
    assert!((pair.pupil.radius - eye.pupil_r).abs() <= 2.0, "{:?}", pair.pupil);
    assert!((pair.iris.radius - eye.iris_r).abs() <= 2.0, "{:?}", pair.iris);
    assert!((pair.iris.x - 160.0).abs() <= 1.5 && (pair.iris.y - 140.0).abs() <= 1.5);
}

#[test]
fn same_eye_matches_across_captures() {
    let pipeline = IrisPipeline::new(synthetic_config()).unwrap();
    let eye = eye_a();
    let first = render(&eye, (160, 140), 2, 1);
    let second = render(&eye, (163, 138), 2, 2);

    let enrolled = pipeline.enroll(view(&first)).unwrap();
    let result = pipeline.verify(view(&second), &enrolled).unwrap();
    assert!(result.details.distance < 0.38, "distance {}", result.details.distance);
    assert_eq!(result.decision, MatchDecision::Match);
}

#[test]
fn different_eyes_do_not_match() {
    let pipeline = IrisPipeline::new(synthetic_config()).unwrap();
    let a = render(&eye_a(), (160, 140), 2, 1);
    let b = render(&eye_b(), (158, 142), 2, 3);

    let enrolled = pipeline.enroll(view(&a)).unwrap();
    let result = pipeline.verify(view(&b), &enrolled).unwrap();
    assert!(result.details.distance >= 0.38, "distance {}", result.details.distance);
    assert_eq!(result.decision, MatchDecision::NoMatch);
}

#[test]
fn extraction_is_idempotent() {
    let pipeline = IrisPipeline::new(synthetic_config()).unwrap();
    let data = render(&eye_b(), (150, 135), 2, 9);
    let first = pipeline.extract(view(&data)).unwrap();
    let second = pipeline.extract(view(&data)).unwrap();
    assert_eq!(first.boundaries, second.boundaries);
    assert_eq!(first.normalized, second.normalized);
    assert_eq!(first.record, second.record);

    let self_match = pipeline.matcher().compare(&first.record, &second.record);
    assert_eq!(self_match.details.distance, 0.0);
}

#[test]
fn known_boundaries_skip_segmentation() {
    let pipeline = IrisPipeline::new(synthetic_config()).unwrap();
    let data = vec![120u8; WIDTH * HEIGHT];
    let pair = BoundaryPair {
        pupil: Circle::new(160.0, 140.0, 30.0),
        iris: Circle::new(160.0, 140.0, 90.0),
    };
    let extraction = pipeline.extract_with_boundaries(view(&data), pair).unwrap();
    assert_eq!(extraction.record.template().len(), 262_144);
    assert_eq!(extraction.record.mask().valid_count(), 64 * 512);
}

#[test]
fn blank_image_fails_before_encoding() {
    let pipeline = IrisPipeline::new(PipelineConfig::default()).unwrap();
    let data = vec![128u8; WIDTH * HEIGHT];
    let err = pipeline.enroll(view(&data)).unwrap_err();
    assert!(matches!(err, IrisError::SegmentationFailure { .. }));
}

#[test]
fn saturated_iris_is_fully_masked() {
    let pipeline = IrisPipeline::new(synthetic_config()).unwrap();
    let data = vec![250u8; WIDTH * HEIGHT];
    let pair = BoundaryPair {
        pupil: Circle::new(160.0, 140.0, 30.0),
        iris: Circle::new(160.0, 140.0, 90.0),
    };
    let record = pipeline.extract_with_boundaries(view(&data), pair).unwrap().record;
    assert_eq!(record.mask().valid_count(), 0);
    let result = pipeline.matcher().compare(&record, &record);
    assert_eq!(result.details.distance, 1.0);
    assert_eq!(result.decision, MatchDecision::NoMatch);
}
