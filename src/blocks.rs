//! Block geometry for the non-stationary filters.
//!
//! In one dimension, the signal is cut into contiguous inclusive ranges
//! `[begin[i], end[i]]`, and block `i` interpolates between corner filters `i` and `i + 1`.
//!
//! In two dimensions, blocks form a `(nf0 - 1) x (nf1 - 1)` grid, enumerated with
//! axis 1 fastest, and each block reads the four corner filters around it on a
//! `nf0 x nf1` grid of filters.
//!
//! The views here borrow the bounds arrays. Constructing through `new` validates them;
//! `new_unchecked` skips validation for callers that already know the geometry is sound.

/// A borrowed 1D partition of a signal into blocks.
#[derive(Clone, Copy, Debug)]
pub struct Partition<'a> {
    begin: &'a [usize],
    end: &'a [usize],
}

impl<'a> Partition<'a> {
    /// Build a partition, checking that the blocks tile an interval in increasing order.
    ///
    /// # Errors
    /// * If `begin` and `end` differ in length
    /// * If any block ends before it begins
    /// * If consecutive blocks leave a gap or overlap
    pub fn new(begin: &'a [usize], end: &'a [usize]) -> Result<Self, &'static str> {
        let part = Self::new_unchecked(begin, end);
        part.validate()?;
        Ok(part)
    }

    /// Build a partition without checking the bounds.
    pub const fn new_unchecked(begin: &'a [usize], end: &'a [usize]) -> Self {
        Self { begin, end }
    }

    /// Check the invariants that `new` enforces.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.begin.len() != self.end.len() {
            return Err("Dimension mismatch");
        }
        if self.begin.iter().zip(self.end).any(|(b, e)| e < b) {
            return Err("Blocks must have positive length");
        }
        let contiguous = (1..self.len()).all(|ib| self.begin[ib] == self.end[ib - 1] + 1);
        if !contiguous {
            return Err("Blocks must be contiguous and increasing");
        }
        Ok(())
    }

    /// Number of blocks
    #[inline]
    pub fn len(&self) -> usize {
        self.begin.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.begin.is_empty()
    }

    /// Number of corner filters, one more than the number of blocks
    #[inline]
    pub fn ncorners(&self) -> usize {
        self.len() + 1
    }

    /// Inclusive bounds of block `ib`
    #[inline(always)]
    pub fn bounds(&self, ib: usize) -> (usize, usize) {
        (self.begin[ib], self.end[ib])
    }

    /// Inclusive start of each block
    pub fn begin(&self) -> &'a [usize] {
        self.begin
    }

    /// Inclusive end of each block
    pub fn end(&self) -> &'a [usize] {
        self.end
    }
}

/// A borrowed 2D grid of blocks with bilinearly-interpolated filters.
#[derive(Clone, Copy, Debug)]
pub struct Grid<'a> {
    b1: &'a [usize],
    e1: &'a [usize],
    b2: &'a [usize],
    e2: &'a [usize],
    /// Size of the corner filter grid, axis 1 first
    nf: [usize; 2],
}

impl<'a> Grid<'a> {
    /// Build a block grid, checking its consistency with the filter grid.
    ///
    /// # Errors
    /// * If the bounds arrays differ in length
    /// * If the filter grid has fewer than two filters along either axis
    /// * If the number of blocks is not `(nf0 - 1) * (nf1 - 1)`
    /// * If any block ends before it begins along either axis
    pub fn new(
        b1: &'a [usize],
        e1: &'a [usize],
        b2: &'a [usize],
        e2: &'a [usize],
        nf: [usize; 2],
    ) -> Result<Self, &'static str> {
        let grid = Self::new_unchecked(b1, e1, b2, e2, nf);
        grid.validate()?;
        Ok(grid)
    }

    /// Build a block grid without checking it.
    pub const fn new_unchecked(
        b1: &'a [usize],
        e1: &'a [usize],
        b2: &'a [usize],
        e2: &'a [usize],
        nf: [usize; 2],
    ) -> Self {
        Self { b1, e1, b2, e2, nf }
    }

    /// Check the invariants that `new` enforces.
    pub fn validate(&self) -> Result<(), &'static str> {
        let nb = self.b1.len();
        if self.e1.len() != nb || self.b2.len() != nb || self.e2.len() != nb {
            return Err("Dimension mismatch");
        }
        if self.nf.iter().any(|&n| n < 2) {
            return Err("Filter grid must have at least two filters along each axis");
        }
        if nb != (self.nf[0] - 1) * (self.nf[1] - 1) {
            return Err("Number of blocks does not match the filter grid");
        }
        let inverted = (0..nb).any(|ib| self.e1[ib] < self.b1[ib] || self.e2[ib] < self.b2[ib]);
        if inverted {
            return Err("Blocks must have positive length");
        }
        Ok(())
    }

    /// Number of blocks
    #[inline]
    pub fn len(&self) -> usize {
        self.b1.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.b1.is_empty()
    }

    /// Shape of the corner filter grid, axis 1 first
    #[inline]
    pub fn nf(&self) -> [usize; 2] {
        self.nf
    }

    /// Number of corner filters
    #[inline]
    pub fn ncorners(&self) -> usize {
        self.nf[0] * self.nf[1]
    }

    /// Inclusive bounds of block `ib` like `((b1, e1), (b2, e2))`
    #[inline(always)]
    pub fn bounds(&self, ib: usize) -> ((usize, usize), (usize, usize)) {
        ((self.b1[ib], self.e1[ib]), (self.b2[ib], self.e2[ib]))
    }

    /// Position of block `ib` on the block grid like `(k1, k2)`
    #[inline(always)]
    pub fn position(&self, ib: usize) -> (usize, usize) {
        let nb1 = self.nf[0] - 1;
        (ib % nb1, ib / nb1)
    }

    /// Indices of the four corner filters of block `ib`, in the order
    /// `(k1, k2)`, `(k1 + 1, k2)`, `(k1, k2 + 1)`, `(k1 + 1, k2 + 1)`.
    #[inline(always)]
    pub fn corners(&self, ib: usize) -> [usize; 4] {
        let (k1, k2) = self.position(ib);
        let lo = k2 * self.nf[0] + k1;
        let hi = lo + self.nf[0];
        [lo, lo + 1, hi, hi + 1]
    }
}

#[cfg(feature = "std")]
pub use builders::*;

#[cfg(feature = "std")]
mod builders {
    use super::{Grid, Partition};
    use log::{debug, trace};

    /// Split `n` samples into `nf - 1` blocks whose lengths differ by at most one,
    /// longer blocks first. Returns the inclusive `(begin, end)` bounds.
    ///
    /// # Errors
    /// * If fewer than two filters are requested
    /// * If there are more blocks than samples
    pub fn optimal_sizes(n: usize, nf: usize) -> Result<(Vec<usize>, Vec<usize>), &'static str> {
        if nf < 2 {
            return Err("At least two filters are required");
        }
        if nf - 1 > n {
            return Err("More blocks than samples");
        }

        let nb = nf - 1;
        let mut begin = Vec::with_capacity(nb);
        let mut end = Vec::with_capacity(nb);
        let mut space = n;
        let mut start = 0;
        for k in 0..nb {
            let sample = space.div_ceil(nb - k);
            begin.push(start);
            end.push(start + sample - 1);
            start += sample;
            space -= sample;
        }

        Ok((begin, end))
    }

    /// Owned storage for a 1D [`Partition`].
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct PartitionBuf {
        pub begin: Vec<usize>,
        pub end: Vec<usize>,
    }

    impl PartitionBuf {
        /// Partition a signal of length `n` with one filter every `j` samples,
        /// shortening the last block so that a filter reaching `maxlag` samples
        /// ahead stays inside the signal.
        ///
        /// # Errors
        /// * If `j` is zero
        /// * If the resulting number of filters does not fit in the signal
        /// * If the last block is too short to absorb `maxlag`
        pub fn regular(n: usize, j: usize, maxlag: usize) -> Result<Self, &'static str> {
            if j == 0 {
                return Err("Filter spacing must be positive");
            }
            let nf = n.saturating_sub(1).div_ceil(j) + 1;
            let (begin, mut end) = optimal_sizes(n, nf)?;

            let last = end.len() - 1;
            if end[last] < begin[last] + maxlag {
                return Err("Last block is shorter than the filter");
            }
            end[last] -= maxlag;

            let part = Self { begin, end };
            part.log();
            Ok(part)
        }

        pub fn view(&self) -> Partition<'_> {
            Partition::new_unchecked(&self.begin, &self.end)
        }

        fn log(&self) {
            debug!("Total number of blocks: {}", self.begin.len());
            for ib in 0..self.begin.len() {
                trace!("Block {ib} [b={} e={}]", self.begin[ib], self.end[ib]);
            }
        }
    }

    /// Owned storage for a 2D [`Grid`].
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct GridBuf {
        pub b1: Vec<usize>,
        pub e1: Vec<usize>,
        pub b2: Vec<usize>,
        pub e2: Vec<usize>,
        pub nf: [usize; 2],
    }

    impl GridBuf {
        /// Cover a `dims[0] x dims[1]` image with one filter every `j[a]` samples
        /// along each axis, trimming the edge blocks so that every lag of the filter
        /// footprint stays inside the image.
        ///
        /// # Errors
        /// * If the lag tables are empty or differ in length
        /// * If either spacing is zero
        /// * If the filter grid does not fit in the image
        /// * If trimming leaves an edge block with no samples
        pub fn regular(
            dims: [usize; 2],
            j: [usize; 2],
            lag1: &[isize],
            lag2: &[isize],
        ) -> Result<Self, &'static str> {
            if lag1.is_empty() || lag1.len() != lag2.len() {
                return Err("Dimension mismatch");
            }
            if j.iter().any(|&x| x == 0) {
                return Err("Filter spacing must be positive");
            }

            let mut nf = [0; 2];
            let mut axes: [(Vec<usize>, Vec<usize>); 2] = Default::default();
            for (a, lags) in [lag1, lag2].into_iter().enumerate() {
                nf[a] = dims[a].saturating_sub(2).div_ceil(j[a]) + 1;
                let (mut begin, mut end) = optimal_sizes(dims[a], nf[a])?;
                let (minlag, maxlag) = crate::lags::extent(lags).ok_or("Dimension mismatch")?;
                // A footprint not covering the zero lag still trims as if it did
                let (low, high) = (minlag.min(0).unsigned_abs(), maxlag.max(0) as usize);
                for ib in 0..begin.len() {
                    if end[ib] == dims[a] - 1 {
                        end[ib] = end[ib].checked_sub(high).ok_or("Edge block is shorter than the filter")?;
                    }
                    if begin[ib] == 0 {
                        begin[ib] = low;
                    }
                    if end[ib] < begin[ib] {
                        return Err("Edge block is shorter than the filter");
                    }
                }
                axes[a] = (begin, end);
            }

            // Enumerate blocks with axis 1 fastest
            let [(b1, e1), (b2, e2)] = &axes;
            let nb = b1.len() * b2.len();
            let mut grid = Self {
                b1: Vec::with_capacity(nb),
                e1: Vec::with_capacity(nb),
                b2: Vec::with_capacity(nb),
                e2: Vec::with_capacity(nb),
                nf,
            };
            for k in 0..b2.len() {
                for i in 0..b1.len() {
                    grid.b1.push(b1[i]);
                    grid.e1.push(e1[i]);
                    grid.b2.push(b2[k]);
                    grid.e2.push(e2[k]);
                }
            }

            grid.log();
            Ok(grid)
        }

        pub fn view(&self) -> Grid<'_> {
            Grid::new_unchecked(&self.b1, &self.e1, &self.b2, &self.e2, self.nf)
        }

        fn log(&self) {
            debug!(
                "Total number of blocks: {} ({} x {} filters)",
                self.b1.len(),
                self.nf[0],
                self.nf[1]
            );
            for ib in 0..self.b1.len() {
                trace!(
                    "Block {ib} [b1={} e1={} b2={} e2={}]",
                    self.b1[ib],
                    self.e1[ib],
                    self.b2[ib],
                    self.e2[ib]
                );
            }
        }
    }
}
