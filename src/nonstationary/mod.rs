//! Non-stationary PEF convolutions, where the filter coefficients vary linearly
//! across blocks of the signal, and their exact adjoints.
//!
//! The forward operators map corner filter coefficients to a filtered signal for
//! a fixed driving signal. The adjoints map a signal-space vector back to corner
//! coefficients, and are the exact transpose of the forward map rather than a
//! numerical approximation of it, so they can be used directly for gradients.
//!
//! Both kernels need a small amount of scratch storage proportional to the number
//! of lags, which the caller provides so that no allocation happens here.
//! See [`one_dim::SCRATCH_PER_LAG`] and [`two_dim::SCRATCH_PER_LAG`].

pub mod one_dim;
pub mod two_dim;

/// Split `scratch` into `K` disjoint slices of length `nlag`.
///
/// # Panics
/// * If `scratch` is shorter than `K * nlag`
#[inline]
pub(crate) fn split_scratch<T, const K: usize>(scratch: &mut [T], nlag: usize) -> [&mut [T]; K] {
    let mut rest = scratch;
    core::array::from_fn(|_| {
        let (head, tail) = core::mem::take(&mut rest).split_at_mut(nlag);
        rest = tail;
        head
    })
}

#[cfg(test)]
mod test {
    use super::split_scratch;

    #[test]
    fn test_split_scratch() {
        let mut scratch = [0_u8; 7];
        let [a, b, c] = split_scratch::<_, 3>(&mut scratch, 2);
        a.fill(1);
        b.fill(2);
        c.fill(3);
        assert_eq!(scratch, [1, 1, 2, 2, 3, 3, 0]);
    }

    #[test]
    #[should_panic]
    fn test_split_scratch_short() {
        let mut scratch = [0_u8; 5];
        let _: [&mut [u8]; 3] = split_scratch(&mut scratch, 2);
    }
}
