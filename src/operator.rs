//! A minimal linear operator interface for the convolution operators, with the
//! dot-product test used to verify that an adjoint is the transpose of its forward.
//!
//! An operator maps a model vector of length `model_len` to a data vector of length
//! `data_len`. When `add` is `false` the output is zeroed before the operator runs;
//! otherwise the result is added to whatever the output already holds.
use log::debug;
use num_traits::Float;

use crate::interp::widen;

/// A linear operator with an explicit adjoint.
pub trait LinearOperator<T: Float> {
    /// Length of the model (domain) vector
    fn model_len(&self) -> usize;

    /// Length of the data (range) vector
    fn data_len(&self) -> usize;

    /// Apply the operator, `data (+)= A model`.
    ///
    /// # Errors
    /// * If either vector has the wrong length
    fn forward(&self, add: bool, model: &[T], data: &mut [T]) -> Result<(), &'static str>;

    /// Apply the adjoint, `model (+)= A' data`.
    ///
    /// # Errors
    /// * If either vector has the wrong length
    fn adjoint(&self, add: bool, model: &mut [T], data: &[T]) -> Result<(), &'static str>;

    /// Check a pair of vectors against the operator's shape.
    #[inline]
    fn check_lens(&self, model: usize, data: usize) -> Result<(), &'static str> {
        if model != self.model_len() || data != self.data_len() {
            return Err("Dimension mismatch");
        }
        Ok(())
    }
}

/// Zero `out` unless accumulating.
#[inline]
pub(crate) fn clear_unless<T: Float>(add: bool, out: &mut [T]) {
    if !add {
        out.fill(T::zero());
    }
}

/// Inner product accumulated in `f64`. Callers match the lengths first.
pub(crate) fn dot<T: Float>(a: &[T], b: &[T]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .fold(0.0, |acc, (&x, &y)| acc + widen(x) * widen(y))
}

/// Result of a dot-product test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DotProduct {
    /// `<m, A' d>`
    pub model: f64,
    /// `<A m, d>`
    pub data: f64,
}

impl DotProduct {
    pub fn abs_err(&self) -> f64 {
        (self.model - self.data).abs()
    }

    pub fn rel_err(&self) -> f64 {
        self.abs_err() / self.data.abs()
    }
}

/// Compare `<A m, d>` against `<m, A' d>` for a model `m` and data `d`.
///
/// For an exact adjoint, the two agree to within the floating-point rounding of
/// the operator and of the inner products.
///
/// # Errors
/// * If `m` or `d` does not match the operator's shape
pub fn dot_test<T, O>(op: &O, m: &[T], d: &[T]) -> Result<DotProduct, &'static str>
where
    T: Float,
    O: LinearOperator<T> + ?Sized,
{
    op.check_lens(m.len(), d.len())?;

    let mut dh = vec![T::zero(); op.data_len()];
    let mut mh = vec![T::zero(); op.model_len()];
    op.forward(false, m, &mut dh)?;
    op.adjoint(false, &mut mh, d)?;

    let result = DotProduct {
        model: dot(m, &mh),
        data: dot(d, &dh),
    };
    debug!(
        "Dot product test: dotm = {} dotd = {} abs err = {} rel err = {}",
        result.model,
        result.data,
        result.abs_err(),
        result.rel_err()
    );

    Ok(result)
}

/// Mask that zeroes the lag-0 coefficient of each of `nflt` filters of `nlag`
/// coefficients, so an estimation loop leaves the leading PEF coefficient alone.
///
/// The mask is its own adjoint.
#[derive(Clone, Copy, Debug)]
pub struct ZeroLagMask {
    nflt: usize,
    nlag: usize,
}

impl ZeroLagMask {
    pub fn new(nflt: usize, nlag: usize) -> Self {
        Self { nflt, nlag }
    }

    fn apply<T: Float>(&self, add: bool, input: &[T], out: &mut [T]) {
        clear_unless(add, out);
        if self.nlag == 0 {
            return;
        }
        for (o, i) in out.chunks_exact_mut(self.nlag).zip(input.chunks_exact(self.nlag)) {
            for il in 1..self.nlag {
                o[il] = o[il] + i[il];
            }
        }
    }
}

impl<T: Float> LinearOperator<T> for ZeroLagMask {
    fn model_len(&self) -> usize {
        self.nflt * self.nlag
    }

    fn data_len(&self) -> usize {
        self.nflt * self.nlag
    }

    fn forward(&self, add: bool, model: &[T], data: &mut [T]) -> Result<(), &'static str> {
        LinearOperator::<T>::check_lens(self, model.len(), data.len())?;
        self.apply(add, model, data);
        Ok(())
    }

    fn adjoint(&self, add: bool, model: &mut [T], data: &[T]) -> Result<(), &'static str> {
        LinearOperator::<T>::check_lens(self, model.len(), data.len())?;
        self.apply(add, data, model);
        Ok(())
    }
}
