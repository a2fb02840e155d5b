use iriscode::{
    hamming_details, hamming_distance, EnrollmentRecord, IrisMask, IrisTemplate, MatchConfig,
    MatchDecision, Matcher,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ORIENTATIONS: usize = 4;
const RADIAL: usize = 8;
const ANGULAR: usize = 32;

fn random_template(rng: &mut StdRng) -> IrisTemplate {
    let bits: Vec<bool> = (0..ORIENTATIONS * 2 * RADIAL * ANGULAR)
        .map(|_| rng.random_bool(0.5))
        .collect();
    IrisTemplate::from_bits(&bits, ORIENTATIONS, RADIAL, ANGULAR).unwrap()
}

fn random_mask(rng: &mut StdRng, p_valid: f64) -> IrisMask {
    let valid: Vec<bool> = (0..RADIAL * ANGULAR)
        .map(|_| rng.random_bool(p_valid))
        .collect();
    IrisMask::new(valid, RADIAL, ANGULAR).unwrap()
}

#[test]
fn self_distance_is_zero() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let t = random_template(&mut rng);
        let m = random_mask(&mut rng, 0.8);
        assert!(m.valid_count() > 0);
        assert_eq!(hamming_distance(&t, &t, &m, &m), 0.0);
    }
}

#[test]
fn distance_is_symmetric_and_bounded() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..50 {
        let ta = random_template(&mut rng);
        let tb = random_template(&mut rng);
        let ma = random_mask(&mut rng, 0.7);
        let mb = random_mask(&mut rng, 0.7);
        let ab = hamming_distance(&ta, &tb, &ma, &mb);
        let ba = hamming_distance(&tb, &ta, &mb, &ma);
        assert_eq!(ab, ba);
        assert!((0.0..=1.0).contains(&ab), "distance {ab}");
    }
}

#[test]
fn independent_codes_sit_near_one_half() {
    let mut rng = StdRng::seed_from_u64(2024);
    let ta = random_template(&mut rng);
    let tb = random_template(&mut rng);
    let m = IrisMask::all_valid(RADIAL, ANGULAR).unwrap();
    let d = hamming_distance(&ta, &tb, &m, &m);
    assert!((0.4..=0.6).contains(&d), "distance {d}");
}

#[test]
fn disjoint_masks_give_worst_distance() {
    let mut rng = StdRng::seed_from_u64(3);
    let ta = random_template(&mut rng);
    let tb = random_template(&mut rng);
    let left: Vec<bool> = (0..RADIAL * ANGULAR).map(|i| i % 2 == 0).collect();
    let right: Vec<bool> = left.iter().map(|v| !v).collect();
    let ma = IrisMask::new(left, RADIAL, ANGULAR).unwrap();
    let mb = IrisMask::new(right, RADIAL, ANGULAR).unwrap();

    let details = hamming_details(&ta, &tb, &ma, &mb);
    assert_eq!(details.distance, 1.0);
    assert_eq!(details.valid_bits, 0);

    let empty = IrisMask::new(vec![false; RADIAL * ANGULAR], RADIAL, ANGULAR).unwrap();
    assert_eq!(hamming_distance(&ta, &ta, &empty, &empty), 1.0);
}

#[test]
fn masked_samples_do_not_count() {
    let mut rng = StdRng::seed_from_u64(11);
    let ta = random_template(&mut rng);
    // Flip every bit of orientation 0 sample 0, then mask that sample out.
    let mut bits: Vec<bool> = ta.iter_bits().collect();
    let segment = 2 * RADIAL * ANGULAR;
    for o in 0..ORIENTATIONS {
        bits[o * segment] = !bits[o * segment];
        bits[o * segment + 1] = !bits[o * segment + 1];
    }
    let tb = IrisTemplate::from_bits(&bits, ORIENTATIONS, RADIAL, ANGULAR).unwrap();

    let all = IrisMask::all_valid(RADIAL, ANGULAR).unwrap();
    let details = hamming_details(&ta, &tb, &all, &all);
    assert_eq!(details.differing_bits, 2 * ORIENTATIONS as u64);
    assert_eq!(details.valid_bits, (ORIENTATIONS * segment) as u64);

    let mut valid = vec![true; RADIAL * ANGULAR];
    valid[0] = false;
    let holed = IrisMask::new(valid, RADIAL, ANGULAR).unwrap();
    assert_eq!(hamming_distance(&ta, &tb, &holed, &all), 0.0);
    assert_eq!(hamming_distance(&ta, &tb, &all, &holed), 0.0);
}

#[test]
fn mismatched_geometry_gives_worst_distance() {
    let mut rng = StdRng::seed_from_u64(5);
    let ta = random_template(&mut rng);
    let tb = IrisTemplate::from_bits(&vec![false; 2 * 2 * RADIAL * ANGULAR], 2, RADIAL, ANGULAR)
        .unwrap();
    let m = IrisMask::all_valid(RADIAL, ANGULAR).unwrap();
    assert_eq!(hamming_distance(&ta, &tb, &m, &m), 1.0);
}

#[test]
fn decision_uses_strict_threshold() {
    let cfg = MatchConfig::default();
    assert_eq!(cfg.threshold, 0.38);
    assert_eq!(cfg.decide(0.379), MatchDecision::Match);
    assert_eq!(cfg.decide(0.38), MatchDecision::NoMatch);
    assert_eq!(cfg.decide(1.0), MatchDecision::NoMatch);
}

#[test]
fn matcher_compares_records() {
    let mut rng = StdRng::seed_from_u64(42);
    let t = random_template(&mut rng);
    let m = random_mask(&mut rng, 0.9);
    let record = EnrollmentRecord::new(t, m).unwrap();
    let result = Matcher::new().compare(&record, &record);
    assert_eq!(result.details.distance, 0.0);
    assert_eq!(result.decision, MatchDecision::Match);

    let other =
        EnrollmentRecord::new(random_template(&mut rng), random_mask(&mut rng, 0.9)).unwrap();
    let result = Matcher::new().compare(&record, &other);
    assert_eq!(result.decision, MatchDecision::NoMatch);
}
