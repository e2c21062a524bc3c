mod common;

use rand::rngs::StdRng;
use rand::SeedableRng;
use usct_phantom::texture::{synthesize_2d, white_noise};

use common::{half_width_lag, lag_correlation, variance};

#[test]
fn test_correlation_grows_with_kappa() {
    let mut rng = StdRng::seed_from_u64(2024);
    let seed = white_noise(ndarray::Ix2(128, 128), &mut rng);

    let mut last = -1.0;
    for kappa in [0.1, 0.21, 0.4] {
        let texture = synthesize_2d(&seed, kappa, 0.1).unwrap();
        let r1 = lag_correlation(&texture, 1);
        println!("kappa={:.2} lag-1 correlation={:.4}", kappa, r1);
        assert!(r1 > last, "lag-1 correlation should rise with kappa ({} after {})", r1, last);
        last = r1;
    }
}

#[test]
fn test_half_width_grows_with_kappa() {
    // Autocorrelation exp(-d^2 / kappa^2) halves at d = kappa * sqrt(ln 2)
    let mut rng = StdRng::seed_from_u64(31);
    let seed = white_noise(ndarray::Ix2(128, 128), &mut rng);
    let h = 0.1;

    let mut last = 0;
    for kappa in [0.1, 0.21, 0.4] {
        let texture = synthesize_2d(&seed, kappa, h).unwrap();
        let lag = half_width_lag(&texture);
        let expected = (kappa * std::f64::consts::LN_2.sqrt() / h).ceil() as usize;
        assert!(lag > last, "half-width {} at kappa={} not above {}", lag, kappa, last);
        assert!(
            lag.abs_diff(expected) <= 1,
            "kappa={}: half-width lag {} expected about {}", kappa, lag, expected
        );
        last = lag;
    }
}

#[test]
fn test_lag_correlation_matches_gaussian_kernel() {
    // Filtering white noise with exp(-kappa^2 k^2 / 8) gives an autocorrelation
    // exp(-d^2 / kappa^2) at distance d
    let mut rng = StdRng::seed_from_u64(99);
    let seed = white_noise(ndarray::Ix2(128, 128), &mut rng);
    let (kappa, h) = (0.4, 0.1);
    let texture = synthesize_2d(&seed, kappa, h).unwrap();

    for lag in [1usize, 2] {
        let d = lag as f64 * h;
        let expected = (-(d * d) / (kappa * kappa)).exp();
        let measured = lag_correlation(&texture, lag);
        assert!(
            (measured - expected).abs() < 0.08,
            "lag {}: measured {:.4}, expected {:.4}", lag, measured, expected
        );
    }
}

#[test]
fn test_white_noise_is_uncorrelated() {
    let mut rng = StdRng::seed_from_u64(5);
    let seed = white_noise(ndarray::Ix2(128, 128), &mut rng);
    let flat: Vec<f64> = seed.iter().copied().collect();

    assert!(lag_correlation(&seed, 1).abs() < 0.05);
    assert!((variance(&flat) - 1.0).abs() < 0.05);
}
