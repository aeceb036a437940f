//! Lag tables describing the filter footprint.
//!
//! A lag table is a plain slice of sample offsets. By convention the first entry is
//! the zero lag, whose coefficient is held at one during PEF estimation.
//! Two-dimensional footprints are a pair of equal-length slices, one per axis.

/// Smallest and largest lag in a table, or `None` for an empty table.
pub fn extent(lags: &[isize]) -> Option<(isize, isize)> {
    let first = *lags.first()?;
    Some(
        lags.iter()
            .fold((first, first), |(lo, hi), &l| (lo.min(l), hi.max(l))),
    )
}

#[cfg(feature = "std")]
pub use builders::*;

#[cfg(feature = "std")]
mod builders {
    use itertools::Itertools;

    /// Lags `0, 1, ..., nlag - 1`.
    pub fn contiguous(nlag: usize) -> Vec<isize> {
        (0..nlag as isize).collect()
    }

    /// Lags of a gapped PEF of total length `na`: the zero lag, followed by
    /// `gap, gap + 1, ..., na - 1`.
    ///
    /// # Errors
    /// * If `gap` is zero
    /// * If the gap leaves no room for the zero lag (`gap > na`)
    pub fn gapped(na: usize, gap: usize) -> Result<Vec<isize>, &'static str> {
        if gap == 0 {
            return Err("Gap must be positive");
        }
        if gap > na {
            return Err("Gap exceeds filter length");
        }
        let mut lags: Vec<isize> = (gap as isize - 1..na as isize).collect();
        lags[0] = 0;
        Ok(lags)
    }

    /// Causal 2D PEF footprint covering a `nlag[0] x nlag[1]` box, as `(lag1, lag2)`.
    ///
    /// Axis 1 lags are centered on zero (one extra negative lag for even sizes) and
    /// axis 2 lags run from `0` to `nlag[1] - 1`. On the `lag2 == 0` row, negative
    /// axis-1 lags are dropped so the footprint lies on one side of the zero lag,
    /// which comes first.
    pub fn causal_2d(nlag: [usize; 2]) -> (Vec<isize>, Vec<isize>) {
        let n1 = nlag[0] as isize;
        let lag1min = if n1 % 2 == 0 { -n1 / 2 } else { -(n1 - 1) / 2 };

        (0..nlag[1] as isize)
            .cartesian_product(0..n1)
            .map(|(k, i)| (lag1min + i, k))
            .filter(|&(l1, k)| !(l1 < 0 && k == 0))
            .unzip()
    }
}
