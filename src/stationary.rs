//! Stationary (fixed-coefficient) convolution with a lagged filter.
//!
//! The filter is applied at every sample `id` in `0..n - lags[nlag - 1]`, where `n`
//! is the length of the output signal, so the last lag is taken as the filter's
//! reach. Two adjoints are provided: one with respect to the filter, used when
//! estimating a PEF from known data, and one with respect to the driving signal,
//! used when the filter is known and the signal is being estimated.
//!
//! All operators add into their output.
use num_traits::Float;

use crate::lagged;

/// Exclusive end of the range of samples at which the filter is applied.
#[inline]
fn stop(lags: &[isize], n: usize) -> usize {
    match lags.last() {
        Some(&reach) => (n as isize - reach).max(0) as usize,
        None => 0,
    }
}

/// Convolve the driving signal `aux` with the filter `flt`, adding into `dat`.
///
/// `dat[id + lags[il]] += flt[il] * aux[id]`
///
/// # Panics
/// * If `aux` or `flt` is shorter than the range implied by `lags` and `dat`
/// * If any lag reaches outside `dat`
pub fn conv_fwd<T: Float>(lags: &[isize], aux: &[T], flt: &[T], dat: &mut [T]) {
    let nlag = lags.len();
    for id in 0..stop(lags, dat.len()) {
        let a = aux[id];
        for il in 0..nlag {
            let k = lagged(id, lags[il]);
            dat[k] = dat[k] + flt[il] * a;
        }
    }
}

/// Adjoint of [`conv_fwd`] with respect to the filter, adding into `flt`.
///
/// `flt[il] += aux[id] * dat[id + lags[il]]`, with samples visited in descending order.
///
/// # Panics
/// * Under the same conditions as [`conv_fwd`]
pub fn conv_adj<T: Float>(lags: &[isize], aux: &[T], flt: &mut [T], dat: &[T]) {
    let nlag = lags.len();
    for id in (0..stop(lags, dat.len())).rev() {
        let a = aux[id];
        for il in 0..nlag {
            flt[il] = flt[il] + a * dat[lagged(id, lags[il])];
        }
    }
}

/// Convolve the signal `model` with a known filter `flt`, adding into `dat`.
///
/// This is the same linear map as [`conv_fwd`], viewed as a function of the signal.
pub fn convm_fwd<T: Float>(lags: &[isize], flt: &[T], model: &[T], dat: &mut [T]) {
    conv_fwd(lags, model, flt, dat);
}

/// Adjoint of [`convm_fwd`] with respect to the signal, adding into `model`.
///
/// `model[id] += flt[il] * dat[id + lags[il]]`
///
/// # Panics
/// * If `model` is shorter than the range implied by `lags` and `dat`
/// * If any lag reaches outside `dat`
pub fn convm_adj<T: Float>(lags: &[isize], flt: &[T], model: &mut [T], dat: &[T]) {
    let nlag = lags.len();
    for id in 0..stop(lags, dat.len()) {
        for il in 0..nlag {
            model[id] = model[id] + flt[il] * dat[lagged(id, lags[il])];
        }
    }
}

/// Check that a stationary filter fits a pair of signals of length `n`.
///
/// # Errors
/// * If the lag table is empty or its length does not match `nflt`
/// * If any lag is negative
/// * If the last lag is not the largest, so that some lags would reach past the signal
pub fn check(lags: &[isize], n: usize, nflt: usize) -> Result<(), &'static str> {
    let (minlag, maxlag) = crate::lags::extent(lags).ok_or("Lag table must not be empty")?;
    if nflt != lags.len() {
        return Err("Dimension mismatch");
    }
    if minlag < 0 {
        return Err("Lags must be non-negative");
    }
    if lags[lags.len() - 1] != maxlag {
        return Err("Last lag must be the largest");
    }
    if maxlag as usize >= n {
        return Err("Filter is longer than the signal");
    }
    Ok(())
}
