//! Incremental linear interpolation of filter coefficients between two corners,
//! and the adjoint of that interpolation.
//!
//! Along a block of length `dist`, the coefficient vector used at sample offset `k`
//! from the block start is `c0 + k * (c1 - c0) / dist`. Rather than evaluating the
//! interpolation weights at every sample, the kernels add a precomputed step vector
//! once per sample. The adjoint inverts that recurrence by walking the block backward
//! while keeping a running sum and a running sum of running sums, which are then
//! split between the two corners.
//!
//! Step vectors and the final corner redistribution are evaluated in `f64` no matter
//! the storage type, then narrowed back. Per-sample arithmetic stays in the
//! storage type.
use num_traits::Float;

/// Number of samples covered by the inclusive range `[begin, end]`, as a float.
///
/// An inverted range with `end + 1 == begin` gives zero, which the callers
/// divide by without checking.
#[inline]
pub fn block_length(begin: usize, end: usize) -> f64 {
    end as f64 - begin as f64 + 1.0
}

/// Widen a stored value to double precision.
#[inline]
pub(crate) fn widen<T: Float>(x: T) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}

/// Narrow a double-precision intermediate back to the storage type.
#[inline]
pub(crate) fn narrow<T: Float>(x: f64) -> T {
    T::from(x).unwrap_or_else(T::nan)
}

/// Fill `step` with `(c1 - c0) / dist`.
///
/// The difference is taken in `T` and the division in `f64`.
///
/// # Panics
/// * If `c1` or `step` is shorter than `c0`
#[inline]
pub fn step<T: Float>(c0: &[T], c1: &[T], dist: f64, step: &mut [T]) {
    for il in 0..c0.len() {
        step[il] = narrow(widen(c1[il] - c0[il]) / dist);
    }
}

/// Move the coefficients one sample forward, `coeff += step`.
#[inline]
pub fn advance<T: Float>(coeff: &mut [T], step: &[T]) {
    for il in 0..coeff.len() {
        coeff[il] = coeff[il] + step[il];
    }
}

/// One backward step of the adjoint recurrence: fold the running value into the
/// running sum, then take in the new product.
///
/// The order matters; after a full descending pass over a block of length `L`,
/// `acc` holds `sum(x_k)` and `sum` holds `sum(k * x_k)` for `k` counted from the
/// block start.
#[inline(always)]
pub fn unadvance<T: Float>(acc: &mut T, sum: &mut T, x: T) {
    *sum = *sum + *acc;
    *acc = *acc + x;
}

/// Split a finished `(acc, sum)` pair between the two corners of a block.
///
/// Returns the `f64` contributions `(start, end)` with `start = acc - sum / dist`
/// and `end = sum / dist`.
#[inline(always)]
pub fn unstep<T: Float>(acc: T, sum: T, dist: f64) -> (f64, f64) {
    let end = widen(sum) / dist;
    (-end + widen(acc), end)
}

/// Add a double-precision contribution into a stored value, narrowing once.
#[inline(always)]
pub fn accumulate<T: Float>(slot: &mut T, v: f64) {
    *slot = narrow(widen(*slot) + v);
}
