//! Linearly-varying 1D PEF convolution.
//!
//! ```rust
//! use lvconv::blocks::Partition;
//! use lvconv::nonstationary::one_dim;
//!
//! // One block covering samples 0..=2, one lag at zero
//! let part = Partition::new(&[0], &[2]).unwrap();
//! let lags = [0_isize];
//!
//! // Corner filters [2] and [4]
//! let flt = [2.0_f32, 4.0];
//! let aux = [1.0_f32; 3];
//!
//! let mut dat = [0.0_f32; 3];
//! let mut scratch = [0.0_f32; one_dim::SCRATCH_PER_LAG];
//! one_dim::forward(&part, &lags, &aux, &flt, &mut dat, &mut scratch);
//! assert!((dat[1] - 2.0 * 4.0 / 3.0).abs() < 1e-6);
//! ```
use num_traits::Float;

use super::split_scratch;
use crate::blocks::Partition;
use crate::interp::{self, accumulate, block_length, unadvance, unstep};
use crate::lagged;

/// Scratch elements required per lag by [`forward`] and [`adjoint`]
pub const SCRATCH_PER_LAG: usize = 2;

/// Apply the linearly-varying filter to the driving signal `aux`, adding into `dat`.
///
/// `flt` holds `part.ncorners()` filters of `lags.len()` coefficients each. Within block
/// `ib`, the filter at sample offset `k` from the block start is
/// `flt[ib] + k * (flt[ib + 1] - flt[ib]) / dist`, and
/// `dat[id + lags[il]] += coeff[il] * aux[id]`.
///
/// # Panics
/// * If `scratch` is shorter than `SCRATCH_PER_LAG * lags.len()`
/// * If `flt` has fewer than `part.ncorners() * lags.len()` entries
/// * If a block or a lag reaches outside `aux` or `dat`
pub fn forward<T: Float>(
    part: &Partition,
    lags: &[isize],
    aux: &[T],
    flt: &[T],
    dat: &mut [T],
    scratch: &mut [T],
) {
    let nlag = lags.len();
    let [coeff, step] = split_scratch(scratch, nlag);

    for ib in 0..part.len() {
        // Filter coefficients at the block start, and the increment per sample
        let (begin, end) = part.bounds(ib);
        coeff.copy_from_slice(&flt[ib * nlag..(ib + 1) * nlag]);
        interp::step(
            coeff,
            &flt[(ib + 1) * nlag..(ib + 2) * nlag],
            block_length(begin, end),
            step,
        );

        for id in begin..=end {
            let a = aux[id];
            for il in 0..nlag {
                let k = lagged(id, lags[il]);
                dat[k] = dat[k] + coeff[il] * a;
            }
            interp::advance(coeff, step);
        }
    }
}

/// Adjoint of [`forward`] with respect to the corner filters, adding into `flt`.
///
/// Each block is walked from its last sample to its first, correlating `aux` with the
/// lagged `dat`, and the result is distributed between the block's two corners
/// according to the linear interpolation weights.
///
/// # Panics
/// * Under the same conditions as [`forward`]
pub fn adjoint<T: Float>(
    part: &Partition,
    lags: &[isize],
    aux: &[T],
    flt: &mut [T],
    dat: &[T],
    scratch: &mut [T],
) {
    let nlag = lags.len();
    let [acc, sum] = split_scratch(scratch, nlag);

    for ib in 0..part.len() {
        acc.fill(T::zero());
        sum.fill(T::zero());

        let (begin, end) = part.bounds(ib);
        for id in (begin..=end).rev() {
            let a = aux[id];
            for il in 0..nlag {
                let x = a * dat[lagged(id, lags[il])];
                unadvance(&mut acc[il], &mut sum[il], x);
            }
        }

        let dist = block_length(begin, end);
        for il in 0..nlag {
            let (start, stop) = unstep(acc[il], sum[il], dist);
            accumulate(&mut flt[ib * nlag + il], start);
            accumulate(&mut flt[(ib + 1) * nlag + il], stop);
        }
    }
}

/// Check that a partition, lag table and coefficient buffer are consistent with
/// signals of length `n`, so that [`forward`] and [`adjoint`] stay in bounds.
///
/// # Errors
/// * If the partition is malformed (see [`Partition::new`])
/// * If the lag table is empty
/// * If `nflt` is not `part.ncorners() * lags.len()`
/// * If any block, shifted by any lag, reaches outside `0..n`
pub fn check(part: &Partition, lags: &[isize], n: usize, nflt: usize) -> Result<(), &'static str> {
    part.validate()?;
    let (minlag, maxlag) = crate::lags::extent(lags).ok_or("Lag table must not be empty")?;
    if nflt != part.ncorners() * lags.len() {
        return Err("Dimension mismatch");
    }
    for ib in 0..part.len() {
        let (begin, end) = part.bounds(ib);
        let lo = begin as isize + minlag.min(0);
        let hi = end as isize + maxlag.max(0);
        if lo < 0 || hi >= n as isize {
            return Err("Lags reach outside the signal");
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::blocks::PartitionBuf;
    use crate::operator::dot;
    use crate::stationary;
    use crate::testing::*;

    /// Single block with two scalar corners
    #[test]
    fn test_single_block() {
        let part = Partition::new(&[0], &[2]).unwrap();
        let aux = [1.0_f32; 3];
        let flt = [2.0_f32, 4.0];
        let mut dat = [0.0_f32; 3];
        let mut scratch = [0.0_f32; 2];
        forward(&part, &[0], &aux, &flt, &mut dat, &mut scratch);

        let expected = [2.0, 2.0 + 2.0 / 3.0, 2.0 + 4.0 / 3.0];
        (0..3).for_each(|i| assert!((dat[i] - expected[i]).abs() < 1e-6));
    }

    /// The coefficient at offset k from the block start is c0 + k (c1 - c0) / L
    #[test]
    fn test_interpolation_exactness() {
        let part = Partition::new(&[0, 7], &[6, 16]).unwrap();
        let lags = [0, 1];
        // Three corners of two lags each; probe each lag with its own impulse train
        let flt = [0.5_f32, -3.0, 2.5, 1.0, -1.25, 4.0];
        let aux = [1.0_f32; 18];
        let mut scratch = [0.0_f32; 4];

        for il in 0..2 {
            // Isolate one lag by zeroing the other
            let mut single = flt;
            (0..3).for_each(|c| single[2 * c + 1 - il] = 0.0);
            let mut dat = [0.0_f32; 18];
            forward(&part, &lags, &aux, &single, &mut dat, &mut scratch);

            for ib in 0..2 {
                let (begin, end) = part.bounds(ib);
                let (c0, c1) = (flt[2 * ib + il] as f64, flt[2 * ib + 2 + il] as f64);
                let len = (end - begin + 1) as f64;
                for id in begin..=end {
                    let k = (id - begin) as f64;
                    let expected = c0 + k * (c1 - c0) / len;
                    assert!((dat[id + il] as f64 - expected).abs() < 1e-5);
                }
            }
        }
    }

    /// Output accumulates rather than overwriting
    #[test]
    fn test_accumulate() {
        let mut rng = rng_fixed_seed();
        let part = PartitionBuf::regular(50, 12, 2).unwrap();
        let lags = [0, 1, 2];
        let aux = random_signal::<f64>(&mut rng, 50);
        let flt = random_signal::<f64>(&mut rng, part.view().ncorners() * 3);
        let mut scratch = [0.0; 6];

        let mut fresh = vec![0.0; 50];
        forward(&part.view(), &lags, &aux, &flt, &mut fresh, &mut scratch);

        let seed = random_signal::<f64>(&mut rng, 50);
        let mut seeded = seed.clone();
        forward(&part.view(), &lags, &aux, &flt, &mut seeded, &mut scratch);
        (0..50).for_each(|i| assert!((seeded[i] - (seed[i] + fresh[i])).abs() < 1e-12));

        let mut twice = vec![0.0; 50];
        forward(&part.view(), &lags, &aux, &flt, &mut twice, &mut scratch);
        forward(&part.view(), &lags, &aux, &flt, &mut twice, &mut scratch);
        (0..50).for_each(|i| assert!((twice[i] - 2.0 * fresh[i]).abs() < 1e-12));
    }

    /// Equal corners give the stationary convolution, bit for bit
    #[test]
    fn test_stationary_special_case() {
        let mut rng = rng_fixed_seed();
        let n = 40;
        let lags = [0, 1, 3];
        let aux = random_signal::<f32>(&mut rng, n);
        let filter = random_signal::<f32>(&mut rng, 3);

        let mut expected = vec![0.0_f32; n];
        stationary::conv_fwd(&lags, &aux, &filter, &mut expected);

        let end = [n - 3 - 1];
        let part = Partition::new(&[0], &end).unwrap();
        let flt: Vec<f32> = filter.iter().chain(filter.iter()).copied().collect();
        let mut dat = vec![0.0_f32; n];
        let mut scratch = [0.0_f32; 6];
        forward(&part, &lags, &aux, &flt, &mut dat, &mut scratch);

        assert_eq!(dat, expected);
    }

    #[test]
    fn test_dot_product() {
        let mut rng = rng_fixed_seed();
        let n = 300;
        let lags = [0, 1, 2, 4];
        let part = PartitionBuf::regular(n, 23, 4).unwrap();
        let part = part.view();
        check(&part, &lags, n, part.ncorners() * 4).unwrap();

        let aux = random_signal::<f64>(&mut rng, n);
        let m = random_signal::<f64>(&mut rng, part.ncorners() * 4);
        let d = random_signal::<f64>(&mut rng, n);
        let mut scratch = vec![0.0; SCRATCH_PER_LAG * 4];

        let mut dh = vec![0.0; n];
        let mut mh = vec![0.0; m.len()];
        forward(&part, &lags, &aux, &m, &mut dh, &mut scratch);
        adjoint(&part, &lags, &aux, &mut mh, &d, &mut scratch);

        assert_rel_close(dot(&dh, &d), dot(&m, &mh), 1e-12);
    }

    #[test]
    fn test_dot_product_f32() {
        let mut rng = rng_fixed_seed();
        let n = 300;
        let lags = [0, 1, 2];
        let part = PartitionBuf::regular(n, 40, 2).unwrap();
        let part = part.view();

        let aux = random_signal::<f32>(&mut rng, n);
        let m = random_signal::<f32>(&mut rng, part.ncorners() * 3);
        let d = random_signal::<f32>(&mut rng, n);
        let mut scratch = vec![0.0; SCRATCH_PER_LAG * 3];

        let mut dh = vec![0.0; n];
        let mut mh = vec![0.0; m.len()];
        forward(&part, &lags, &aux, &m, &mut dh, &mut scratch);
        adjoint(&part, &lags, &aux, &mut mh, &d, &mut scratch);

        assert_rel_close(dot(&dh, &d), dot(&m, &mh), 1e-5);
    }

    /// A zero-length block divides by zero in the adjoint and poisons its corners
    #[test]
    fn test_zero_length_block() {
        let part = Partition::new_unchecked(&[0, 3], &[2, 2]);
        let aux = [1.0_f32; 4];
        let dat = [1.0_f32; 4];
        let mut flt = [0.0_f32; 3];
        let mut scratch = [0.0_f32; 2];
        adjoint(&part, &[0], &aux, &mut flt, &dat, &mut scratch);
        assert!(flt[0].is_finite());
        assert!(flt[1].is_nan());
        assert!(flt[2].is_nan());
    }

    #[test]
    fn test_check() {
        let part = Partition::new(&[0, 4], &[3, 7]).unwrap();
        assert!(check(&part, &[0, 1, 2], 10, 9).is_ok());
        assert_eq!(check(&part, &[], 10, 0).unwrap_err(), "Lag table must not be empty");
        assert_eq!(check(&part, &[0, 1], 10, 9).unwrap_err(), "Dimension mismatch");
        assert_eq!(check(&part, &[0, 3], 10, 6).unwrap_err(), "Lags reach outside the signal");
        assert_eq!(check(&part, &[-1, 0], 10, 6).unwrap_err(), "Lags reach outside the signal");

        let bad = Partition::new_unchecked(&[0, 5], &[3, 7]);
        assert_eq!(
            check(&bad, &[0], 10, 3).unwrap_err(),
            "Blocks must be contiguous and increasing"
        );
    }
}
