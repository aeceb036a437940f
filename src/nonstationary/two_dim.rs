//! Bilinearly-varying 2D PEF convolution.
//!
//! Signals are `dims[0] x dims[1]` images stored row-major with axis 1 fastest, so
//! sample `(id1, id2)` lives at `id2 * dims[0] + id1`. Corner filters are stored
//! the same way, `(k2 * nf0 + k1) * nlag + il`.
//!
//! Within a block, the filter is interpolated first along axis 2 on the two axis-1
//! edges of the block, then along axis 1 between those edges, both by repeated
//! addition of step vectors. This is the same bilinear interpolant as the weighted
//! form `(1-t)(1-u) c00 + t(1-u) c10 + (1-t)u c01 + tu c11`, with
//! `t = (id1 - b1) / (e1 - b1 + 1)` and `u = (id2 - b2) / (e2 - b2 + 1)`.
use num_traits::Float;

use super::split_scratch;
use crate::blocks::Grid;
use crate::interp::{self, accumulate, block_length, unadvance, unstep};

/// Scratch elements required per lag by [`forward`] and [`adjoint`]
pub const SCRATCH_PER_LAG: usize = 6;

/// Flat index of sample `(id1, id2)` shifted by `(lag1, lag2)` in rows of `nd1`.
///
/// Axis-1 shifts that leave the row wrap into the neighboring row;
/// [`check`] rejects footprints that do so.
#[inline(always)]
fn index(id1: usize, id2: usize, lag1: isize, lag2: isize, nd1: usize) -> usize {
    ((id2 as isize + lag2) * nd1 as isize + id1 as isize + lag1) as usize
}

/// Apply the bilinearly-varying filter to the driving image `aux`, adding into `dat`.
///
/// `dat[id2 + lag2[il], id1 + lag1[il]] += coeff[il] * aux[id2, id1]`
///
/// # Panics
/// * If `scratch` is shorter than `SCRATCH_PER_LAG * lag1.len()`
/// * If `lag2` is shorter than `lag1`
/// * If `flt` has fewer than `grid.ncorners() * lag1.len()` entries
/// * If a block or a lag reaches outside `aux` or `dat`
#[allow(clippy::too_many_arguments)]
pub fn forward<T: Float>(
    grid: &Grid,
    lag1: &[isize],
    lag2: &[isize],
    dims: [usize; 2],
    aux: &[T],
    flt: &[T],
    dat: &mut [T],
    scratch: &mut [T],
) {
    let nlag = lag1.len();
    let nd1 = dims[0];
    let [b00, b01, d02, d12, bin, d01] = split_scratch(scratch, nlag);
    let corner = move |c: usize| &flt[c * nlag..(c + 1) * nlag];

    for ib in 0..grid.len() {
        let [c00, c10, c01, c11] = grid.corners(ib);
        let ((begin1, end1), (begin2, end2)) = grid.bounds(ib);
        let dist1 = block_length(begin1, end1);
        let dist2 = block_length(begin2, end2);

        // Start of the two axis-1 edges, and their increments along axis 2
        b00.copy_from_slice(corner(c00));
        b01.copy_from_slice(corner(c10));
        interp::step(b00, corner(c01), dist2, d02);
        interp::step(b01, corner(c11), dist2, d12);

        for id2 in begin2..=end2 {
            // Interpolate between the edges along axis 1
            bin.copy_from_slice(b00);
            interp::step(b00, b01, dist1, d01);

            let row = id2 * nd1;
            for id1 in begin1..=end1 {
                let a = aux[row + id1];
                for il in 0..nlag {
                    let k = index(id1, id2, lag1[il], lag2[il], nd1);
                    dat[k] = dat[k] + bin[il] * a;
                }
                interp::advance(bin, d01);
            }

            interp::advance(b00, d02);
            interp::advance(b01, d12);
        }
    }
}

/// Adjoint of [`forward`] with respect to the corner filters, adding into `flt`.
///
/// Both axes are walked backward. Each axis-1 pass leaves a running sum and a sum of
/// running sums, which are split between the two axis-1 edges and accumulated into
/// the axis-2 recurrences of those edges; those are split in turn between the
/// block's four corners.
///
/// # Panics
/// * Under the same conditions as [`forward`]
#[allow(clippy::too_many_arguments)]
pub fn adjoint<T: Float>(
    grid: &Grid,
    lag1: &[isize],
    lag2: &[isize],
    dims: [usize; 2],
    aux: &[T],
    flt: &mut [T],
    dat: &[T],
    scratch: &mut [T],
) {
    let nlag = lag1.len();
    let nd1 = dims[0];
    let [b00, b01, d02, d12, bin, d01] = split_scratch(scratch, nlag);

    for ib in 0..grid.len() {
        b00.fill(T::zero());
        b01.fill(T::zero());
        d02.fill(T::zero());
        d12.fill(T::zero());

        let ((begin1, end1), (begin2, end2)) = grid.bounds(ib);
        let dist1 = block_length(begin1, end1);
        let dist2 = block_length(begin2, end2);

        for id2 in (begin2..=end2).rev() {
            bin.fill(T::zero());
            d01.fill(T::zero());

            let row = id2 * nd1;
            for id1 in (begin1..=end1).rev() {
                let a = aux[row + id1];
                for il in 0..nlag {
                    let x = a * dat[index(id1, id2, lag1[il], lag2[il], nd1)];
                    unadvance(&mut bin[il], &mut d01[il], x);
                }
            }

            // Split the row between the axis-1 edges, after folding the edges'
            // running values into their own running sums
            for il in 0..nlag {
                let (start, stop) = unstep(bin[il], d01[il], dist1);
                d02[il] = d02[il] + b00[il];
                d12[il] = d12[il] + b01[il];
                accumulate(&mut b00[il], start);
                accumulate(&mut b01[il], stop);
            }
        }

        let [c00, c10, c01, c11] = grid.corners(ib);
        for il in 0..nlag {
            let (s0, e0) = unstep(b00[il], d02[il], dist2);
            let (s1, e1) = unstep(b01[il], d12[il], dist2);
            accumulate(&mut flt[c00 * nlag + il], s0);
            accumulate(&mut flt[c10 * nlag + il], s1);
            accumulate(&mut flt[c01 * nlag + il], e0);
            accumulate(&mut flt[c11 * nlag + il], e1);
        }
    }
}

/// Check that a block grid, lag tables and coefficient buffer are consistent with
/// `dims[0] x dims[1]` images, so that [`forward`] and [`adjoint`] stay in bounds
/// and no lag wraps across a row.
///
/// # Errors
/// * If the grid is malformed (see [`Grid::new`])
/// * If the lag tables are empty or differ in length
/// * If `nflt` is not `grid.ncorners() * lag1.len()`
/// * If any block, shifted by any lag, reaches outside the image along either axis
pub fn check(
    grid: &Grid,
    lag1: &[isize],
    lag2: &[isize],
    dims: [usize; 2],
    nflt: usize,
) -> Result<(), &'static str> {
    grid.validate()?;
    if lag1.len() != lag2.len() {
        return Err("Dimension mismatch");
    }
    let (min1, max1) = crate::lags::extent(lag1).ok_or("Lag table must not be empty")?;
    let (min2, max2) = crate::lags::extent(lag2).ok_or("Lag table must not be empty")?;
    if nflt != grid.ncorners() * lag1.len() {
        return Err("Dimension mismatch");
    }

    let inside = |b: usize, e: usize, lo: isize, hi: isize, n: usize| {
        b as isize + lo.min(0) >= 0 && (e as isize + hi.max(0)) < n as isize
    };
    for ib in 0..grid.len() {
        let ((b1, e1), (b2, e2)) = grid.bounds(ib);
        if !(inside(b1, e1, min1, max1, dims[0]) && inside(b2, e2, min2, max2, dims[1])) {
            return Err("Lags reach outside the signal");
        }
    }
    Ok(())
}
