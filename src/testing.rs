use num_traits::Float;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

/// Fixed random seed to support repeatable testing
const SEED: [u8; 32] = [
    7, 1, 8, 2, 8, 1, 8, 2, 8, 4, 5, 9, 0, 4, 5, 2, 3, 5, 3, 6, 0, 2, 8, 7, 4, 7, 1, 3, 5, 2, 6,
    6,
];

/// Get a random number generator with a const seed for repeatable testing
pub fn rng_fixed_seed() -> StdRng {
    StdRng::from_seed(SEED)
}

/// Generate `n` samples uniform on `[0, 1)`, drawn in `f64` and narrowed to `T`
pub fn random_signal<T: Float>(rng: &mut StdRng, n: usize) -> Vec<T> {
    std::iter::repeat_with(|| T::from(rng.random::<f64>()).unwrap_or_else(T::nan))
        .take(n)
        .collect()
}

/// Assert that `a` and `b` agree to within `rtol` relative to `b`
#[track_caller]
pub fn assert_rel_close(a: f64, b: f64, rtol: f64) {
    let err = (a - b).abs() / b.abs();
    assert!(err < rtol, "{a} and {b} differ by {err:e} (rtol {rtol:e})");
}
