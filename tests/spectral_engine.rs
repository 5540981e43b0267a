use mosse::{DirectDft, FftEngine, SpectralEngine};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_signal(len: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(-1.0..1.0)).collect()
}

fn round_trip<E: SpectralEngine>(width: usize, height: usize) {
    let mut engine = E::plan(width, height).unwrap();
    let input = random_signal(width * height, (width * 31 + height) as u64);
    let spectrum = engine.forward2d(&input).unwrap();
    let back = engine.inverse2d(&spectrum).unwrap();
    for (a, b) in input.iter().zip(&back) {
        assert!((a - b).abs() < 1e-9, "{width}x{height}: {a} vs {b}");
    }
}

#[test]
fn fft_round_trip_recovers_input() {
    for (w, h) in [(1, 1), (8, 8), (17, 5), (64, 48), (30, 1)] {
        round_trip::<FftEngine>(w, h);
    }
}

#[test]
fn direct_round_trip_recovers_input() {
    for (w, h) in [(1, 1), (8, 8), (7, 12), (20, 3)] {
        round_trip::<DirectDft>(w, h);
    }
}

#[test]
fn direct_and_fft_spectra_agree() {
    let (w, h) = (12, 10);
    let input = random_signal(w * h, 5);
    let mut fft = FftEngine::plan(w, h).unwrap();
    let mut direct = DirectDft::plan(w, h).unwrap();
    let a = fft.forward2d(&input).unwrap();
    let b = direct.forward2d(&input).unwrap();
    for (x, y) in a.data().iter().zip(b.data()) {
        assert!((x - y).norm() < 1e-9);
    }
}

#[test]
fn forward_of_shifted_impulse_has_linear_phase() {
    let (w, h) = (16, 8);
    let mut input = vec![0.0; w * h];
    input[3] = 1.0;
    let mut engine = FftEngine::plan(w, h).unwrap();
    let spec = engine.forward2d(&input).unwrap();
    for u in 0..w {
        let expected = -std::f64::consts::TAU * (3 * u) as f64 / w as f64;
        let c = spec.get(u, 0).unwrap();
        assert!((c.norm() - 1.0).abs() < 1e-12);
        let diff = (c.arg() - expected).rem_euclid(std::f64::consts::TAU);
        assert!(diff < 1e-9 || (std::f64::consts::TAU - diff) < 1e-9);
    }
}

#[test]
fn plan_rejects_empty_sizes() {
    assert!(FftEngine::plan(0, 4).is_err());
    assert!(DirectDft::plan(4, 0).is_err());
}

#[test]
fn engine_window_matches_hann() {
    let engine = FftEngine::plan(10, 6).unwrap();
    assert_eq!(engine.window().unwrap(), mosse::Window::hann(10, 6).unwrap());
}
