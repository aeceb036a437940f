//! Non-stationary prediction-error filter (PEF) convolutions with exact adjoints,
//! no-std and no-alloc compatible.
//!
//! A non-stationary PEF is described by a small set of corner filters placed at
//! block boundaries. Inside each block, the coefficients are interpolated linearly
//! (1D) or bilinearly (2D) between the corners and applied to a driving signal.
//! The adjoints map back from signal space to the corner coefficients and are the
//! exact transpose of the forward operators, which is what a least-squares
//! estimation of the corner filters needs for its gradients.
//!
//! The kernels in [`stationary`] and [`nonstationary`] take plain slices, add into
//! their outputs, and never allocate; the 1D and 2D kernels borrow scratch storage
//! from the caller. With the `std` feature (on by default), [`blocks`] and [`lags`]
//! also provide builders for regular block layouts and common filter footprints,
//! and [`pef`] wraps everything as linear operators with a dot-product test.
//!
//! | Method                          | Scratch          | Cost per sample |
//! |---------------------------------|------------------|-----------------|
//! | stationary::conv_fwd / conv_adj | none             | O(nlag)         |
//! | nonstationary::one_dim          | 2 x nlag         | O(nlag)         |
//! | nonstationary::two_dim          | 6 x nlag         | O(nlag)         |
//!
//! Both single and double precision are supported. Step and interpolation
//! arithmetic is carried out in double precision before rounding back to the
//! working type.
//!
//! # Example: Linearly-Varying 1D PEF
//! ```rust
//! use lvconv::{dot_test, LinearOperator, PefLv1D};
//!
//! // Driving signal
//! let aux: Vec<f64> = (0..200).map(|i| 1.5 + (0.1 * i as f64).sin()).collect();
//!
//! // One 4-lag filter every 40 samples
//! let pef = PefLv1D::with_nlag(&aux, 40, 4).unwrap();
//! assert_eq!(pef.nf(), 6);
//!
//! // Apply to some corner coefficients
//! let flt = vec![0.25; pef.model_len()];
//! let mut dat = vec![0.0; aux.len()];
//! pef.forward(false, &flt, &mut dat).unwrap();
//!
//! // The adjoint is exact
//! let result = dot_test(&pef, &flt, &aux).unwrap();
//! assert!(result.rel_err() < 1e-12);
//! ```
//!
//! # Example: Bilinearly-Varying 2D PEF Kernel Without Allocation
//! ```rust
//! use lvconv::blocks::Grid;
//! use lvconv::nonstationary::two_dim;
//!
//! // 4 x 3 image, a single block covering it, one zero lag
//! let dims = [4, 3];
//! let grid = Grid::new(&[0], &[3], &[0], &[2], [2, 2]).unwrap();
//! let (lag1, lag2) = ([0_isize], [0_isize]);
//! two_dim::check(&grid, &lag1, &lag2, dims, 4).unwrap();
//!
//! // Same filter at every corner
//! let flt = [2.0_f32; 4];
//! let aux = [1.0_f32; 12];
//! let mut dat = [0.0_f32; 12];
//! let mut scratch = [0.0_f32; two_dim::SCRATCH_PER_LAG];
//!
//! two_dim::forward(&grid, &lag1, &lag2, dims, &aux, &flt, &mut dat, &mut scratch);
//! assert_eq!(dat, [2.0; 12]);
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
// These "needless" range loops are a significant speedup
#![allow(clippy::needless_range_loop)]

pub mod blocks;
pub mod interp;
pub mod lags;
pub mod nonstationary;
pub mod stationary;

#[cfg(feature = "std")]
pub mod operator;
#[cfg(feature = "std")]
pub mod pef;

#[cfg(feature = "std")]
pub use operator::{dot_test, DotProduct, LinearOperator, ZeroLagMask};
#[cfg(feature = "std")]
pub use pef::{Conv1D, Pef1D, PefLv1D, PefLv2D};

#[cfg(all(test, feature = "std"))]
pub(crate) mod testing;

/// Sample index `id` shifted by `lag`.
///
/// A shift before the start of the signal wraps to an index that fails the
/// subsequent bounds check.
#[inline(always)]
pub(crate) fn lagged(id: usize, lag: isize) -> usize {
    (id as isize + lag) as usize
}
