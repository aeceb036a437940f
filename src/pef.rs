//! Prediction-error filter operators built on the convolution kernels.
//!
//! Each PEF operator holds a borrowed driving signal `aux` and maps filter
//! coefficients (the model) to the filtered signal (the data). Geometry is
//! validated once at construction, after which `forward` and `adjoint` only check
//! vector lengths before calling the unchecked kernels.
//!
//! By convention the first lag is the zero lag. [`Pef1D::create_data`] and friends
//! return the negated response of a filter that is one at the zero lag and zero
//! elsewhere, which is the right-hand side when estimating the remaining coefficients
//! with the zero lag masked out (see [`crate::operator::ZeroLagMask`]).
use log::{debug, trace};
use num_traits::Float;

use crate::blocks::{GridBuf, PartitionBuf};
use crate::lags;
use crate::nonstationary::{one_dim, two_dim};
use crate::operator::{clear_unless, LinearOperator};
use crate::stationary;

/// Negated forward response of a unit zero-lag filter replicated `nflt` times.
fn unit_response<T, O>(op: &O, nflt: usize, nlag: usize) -> Result<Vec<T>, &'static str>
where
    T: Float,
    O: LinearOperator<T>,
{
    let mut flt = vec![T::zero(); nflt * nlag];
    flt.iter_mut().step_by(nlag.max(1)).for_each(|c| *c = T::one());
    let mut dat = vec![T::zero(); op.data_len()];
    op.forward(false, &flt, &mut dat)?;
    dat.iter_mut().for_each(|x| *x = -*x);
    Ok(dat)
}

/// Stationary 1D PEF; the model is a single filter.
#[derive(Clone, Debug)]
pub struct Pef1D<'a, T: Float> {
    lags: Vec<isize>,
    aux: &'a [T],
}

impl<'a, T: Float> Pef1D<'a, T> {
    /// # Errors
    /// * If the lags do not fit the driving signal (see [`stationary::check`])
    pub fn new(aux: &'a [T], lags: Vec<isize>) -> Result<Self, &'static str> {
        stationary::check(&lags, aux.len(), lags.len())?;
        Ok(Self { lags, aux })
    }

    /// PEF with lags `0..nlag`
    pub fn with_nlag(aux: &'a [T], nlag: usize) -> Result<Self, &'static str> {
        Self::new(aux, lags::contiguous(nlag))
    }

    pub fn lags(&self) -> &[isize] {
        &self.lags
    }

    /// Replace the driving signal.
    ///
    /// # Errors
    /// * If the length changes
    pub fn set_aux(&mut self, aux: &'a [T]) -> Result<(), &'static str> {
        if aux.len() != self.aux.len() {
            return Err("Dimension mismatch");
        }
        self.aux = aux;
        Ok(())
    }

    pub fn create_data(&self) -> Result<Vec<T>, &'static str> {
        unit_response(self, 1, self.lags.len())
    }
}

impl<T: Float> LinearOperator<T> for Pef1D<'_, T> {
    fn model_len(&self) -> usize {
        self.lags.len()
    }

    fn data_len(&self) -> usize {
        self.aux.len()
    }

    fn forward(&self, add: bool, flt: &[T], dat: &mut [T]) -> Result<(), &'static str> {
        self.check_lens(flt.len(), dat.len())?;
        clear_unless(add, dat);
        stationary::conv_fwd(&self.lags, self.aux, flt, dat);
        Ok(())
    }

    fn adjoint(&self, add: bool, flt: &mut [T], dat: &[T]) -> Result<(), &'static str> {
        self.check_lens(flt.len(), dat.len())?;
        clear_unless(add, flt);
        stationary::conv_adj(&self.lags, self.aux, flt, dat);
        Ok(())
    }
}

/// Stationary 1D convolution with a known filter; the model is the signal.
#[derive(Clone, Debug)]
pub struct Conv1D<'a, T: Float> {
    lags: Vec<isize>,
    flt: &'a [T],
    n: usize,
}

impl<'a, T: Float> Conv1D<'a, T> {
    /// # Errors
    /// * If the lags do not fit a signal of length `n` or do not match the filter
    pub fn new(n: usize, flt: &'a [T], lags: Vec<isize>) -> Result<Self, &'static str> {
        stationary::check(&lags, n, flt.len())?;
        Ok(Self { lags, flt, n })
    }

    pub fn set_flt(&mut self, flt: &'a [T]) -> Result<(), &'static str> {
        if flt.len() != self.flt.len() {
            return Err("Dimension mismatch");
        }
        self.flt = flt;
        Ok(())
    }
}

impl<T: Float> LinearOperator<T> for Conv1D<'_, T> {
    fn model_len(&self) -> usize {
        self.n
    }

    fn data_len(&self) -> usize {
        self.n
    }

    fn forward(&self, add: bool, model: &[T], dat: &mut [T]) -> Result<(), &'static str> {
        self.check_lens(model.len(), dat.len())?;
        clear_unless(add, dat);
        stationary::convm_fwd(&self.lags, self.flt, model, dat);
        Ok(())
    }

    fn adjoint(&self, add: bool, model: &mut [T], dat: &[T]) -> Result<(), &'static str> {
        self.check_lens(model.len(), dat.len())?;
        clear_unless(add, model);
        stationary::convm_adj(&self.lags, self.flt, model, dat);
        Ok(())
    }
}

/// Linearly-varying 1D PEF. The model is `nf x nlag` corner coefficients,
/// one filter every `j` samples.
#[derive(Clone, Debug)]
pub struct PefLv1D<'a, T: Float> {
    blocks: PartitionBuf,
    lags: Vec<isize>,
    aux: &'a [T],
}

impl<'a, T: Float> PefLv1D<'a, T> {
    /// # Errors
    /// * If the lags are empty, negative, or not ending with the largest
    /// * If the partition cannot be built (see [`PartitionBuf::regular`])
    pub fn new(aux: &'a [T], j: usize, lags: Vec<isize>) -> Result<Self, &'static str> {
        let n = aux.len();
        stationary::check(&lags, n, lags.len())?;
        let maxlag = lags[lags.len() - 1] as usize;
        let blocks = PartitionBuf::regular(n, j, maxlag)?;
        one_dim::check(&blocks.view(), &lags, n, blocks.view().ncorners() * lags.len())?;
        debug!(
            "Linearly-varying PEF: n = {n}, {} filters of {} lags",
            blocks.view().ncorners(),
            lags.len()
        );
        Ok(Self { blocks, lags, aux })
    }

    /// PEF with lags `0..nlag`
    pub fn with_nlag(aux: &'a [T], j: usize, nlag: usize) -> Result<Self, &'static str> {
        Self::new(aux, j, lags::contiguous(nlag))
    }

    /// Number of corner filters
    pub fn nf(&self) -> usize {
        self.blocks.view().ncorners()
    }

    pub fn lags(&self) -> &[isize] {
        &self.lags
    }

    pub fn blocks(&self) -> &PartitionBuf {
        &self.blocks
    }

    pub fn set_aux(&mut self, aux: &'a [T]) -> Result<(), &'static str> {
        if aux.len() != self.aux.len() {
            return Err("Dimension mismatch");
        }
        self.aux = aux;
        Ok(())
    }

    pub fn create_data(&self) -> Result<Vec<T>, &'static str> {
        unit_response(self, self.nf(), self.lags.len())
    }
}

impl<T: Float> LinearOperator<T> for PefLv1D<'_, T> {
    fn model_len(&self) -> usize {
        self.nf() * self.lags.len()
    }

    fn data_len(&self) -> usize {
        self.aux.len()
    }

    fn forward(&self, add: bool, flt: &[T], dat: &mut [T]) -> Result<(), &'static str> {
        self.check_lens(flt.len(), dat.len())?;
        clear_unless(add, dat);
        let mut scratch = vec![T::zero(); one_dim::SCRATCH_PER_LAG * self.lags.len()];
        one_dim::forward(&self.blocks.view(), &self.lags, self.aux, flt, dat, &mut scratch);
        Ok(())
    }

    fn adjoint(&self, add: bool, flt: &mut [T], dat: &[T]) -> Result<(), &'static str> {
        self.check_lens(flt.len(), dat.len())?;
        clear_unless(add, flt);
        let mut scratch = vec![T::zero(); one_dim::SCRATCH_PER_LAG * self.lags.len()];
        one_dim::adjoint(&self.blocks.view(), &self.lags, self.aux, flt, dat, &mut scratch);
        Ok(())
    }
}

/// Bilinearly-varying 2D PEF on a `dims[0] x dims[1]` image (axis 1 fastest).
/// The model is `nf[1] x nf[0] x nlag` corner coefficients.
#[derive(Clone, Debug)]
pub struct PefLv2D<'a, T: Float> {
    grid: GridBuf,
    lag1: Vec<isize>,
    lag2: Vec<isize>,
    dims: [usize; 2],
    aux: &'a [T],
}

impl<'a, T: Float> PefLv2D<'a, T> {
    /// PEF with an explicit footprint `(lag1[il], lag2[il])` and one filter every
    /// `j[a]` samples along axis `a`.
    ///
    /// # Errors
    /// * If `aux` is not `dims[0] * dims[1]` long
    /// * If the grid cannot be built (see [`GridBuf::regular`])
    pub fn new(
        aux: &'a [T],
        dims: [usize; 2],
        j: [usize; 2],
        lag1: Vec<isize>,
        lag2: Vec<isize>,
    ) -> Result<Self, &'static str> {
        if aux.len() != dims[0] * dims[1] {
            return Err("Dimension mismatch");
        }
        let grid = GridBuf::regular(dims, j, &lag1, &lag2)?;
        two_dim::check(&grid.view(), &lag1, &lag2, dims, grid.view().ncorners() * lag1.len())?;
        debug!(
            "Bilinearly-varying PEF: {} x {} samples, {} x {} filters of {} lags",
            dims[0],
            dims[1],
            grid.nf[0],
            grid.nf[1],
            lag1.len()
        );
        for il in 0..lag1.len() {
            trace!("{il} lag1={} lag2={}", lag1[il], lag2[il]);
        }
        Ok(Self {
            grid,
            lag1,
            lag2,
            dims,
            aux,
        })
    }

    /// PEF with the causal footprint of a `nlag[0] x nlag[1]` box (see [`lags::causal_2d`])
    pub fn causal(
        aux: &'a [T],
        dims: [usize; 2],
        j: [usize; 2],
        nlag: [usize; 2],
    ) -> Result<Self, &'static str> {
        let (lag1, lag2) = lags::causal_2d(nlag);
        Self::new(aux, dims, j, lag1, lag2)
    }

    /// Shape of the corner filter grid, axis 1 first
    pub fn nf(&self) -> [usize; 2] {
        self.grid.nf
    }

    pub fn nlag(&self) -> usize {
        self.lag1.len()
    }

    pub fn lags(&self) -> (&[isize], &[isize]) {
        (&self.lag1, &self.lag2)
    }

    pub fn grid(&self) -> &GridBuf {
        &self.grid
    }

    pub fn set_aux(&mut self, aux: &'a [T]) -> Result<(), &'static str> {
        if aux.len() != self.aux.len() {
            return Err("Dimension mismatch");
        }
        self.aux = aux;
        Ok(())
    }

    pub fn create_data(&self) -> Result<Vec<T>, &'static str> {
        unit_response(self, self.grid.view().ncorners(), self.nlag())
    }
}

impl<T: Float> LinearOperator<T> for PefLv2D<'_, T> {
    fn model_len(&self) -> usize {
        self.grid.view().ncorners() * self.nlag()
    }

    fn data_len(&self) -> usize {
        self.aux.len()
    }

    fn forward(&self, add: bool, flt: &[T], dat: &mut [T]) -> Result<(), &'static str> {
        self.check_lens(flt.len(), dat.len())?;
        clear_unless(add, dat);
        let mut scratch = vec![T::zero(); two_dim::SCRATCH_PER_LAG * self.nlag()];
        two_dim::forward(
            &self.grid.view(),
            &self.lag1,
            &self.lag2,
            self.dims,
            self.aux,
            flt,
            dat,
            &mut scratch,
        );
        Ok(())
    }

    fn adjoint(&self, add: bool, flt: &mut [T], dat: &[T]) -> Result<(), &'static str> {
        self.check_lens(flt.len(), dat.len())?;
        clear_unless(add, flt);
        let mut scratch = vec![T::zero(); two_dim::SCRATCH_PER_LAG * self.nlag()];
        two_dim::adjoint(
            &self.grid.view(),
            &self.lag1,
            &self.lag2,
            self.dims,
            self.aux,
            flt,
            dat,
            &mut scratch,
        );
        Ok(())
    }
}
