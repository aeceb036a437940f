//! Building this module successfully guarantees that the library is no-std compatible

#![no_std]
#![no_main]

use core::panic::PanicInfo;

use lvconv::blocks::{Grid, Partition};
use lvconv::nonstationary::{one_dim, two_dim};
use lvconv::stationary;

#[panic_handler]
fn panic(_info: &PanicInfo) -> ! {
    // We can't print, so there's not much to do here
    loop {}
}

#[no_mangle]
pub fn _start() -> ! {
    let lags = [0_isize, 1];
    let aux = [1.0_f64; 8];
    let mut dat = [0.0; 8];

    // Stationary
    let flt = [1.0, -0.5];
    stationary::check(&lags, aux.len(), flt.len()).unwrap();
    stationary::conv_fwd(&lags, &aux, &flt, &mut dat);

    // 1D, two blocks and three corner filters
    let part = Partition::new(&[0, 4], &[3, 6]).unwrap();
    let flt = [1.0, -0.5, 1.0, -0.4, 1.0, -0.3];
    let mut scratch = [0.0; 2 * one_dim::SCRATCH_PER_LAG];
    one_dim::check(&part, &lags, aux.len(), flt.len()).unwrap();
    one_dim::forward(&part, &lags, &aux, &flt, &mut dat, &mut scratch);

    // 2D, a 4 x 2 image with a single block
    let grid = Grid::new(&[0], &[2], &[0], &[1], [2, 2]).unwrap();
    let (lag1, lag2) = ([0_isize, 1], [0_isize, 0]);
    let flt = [1.0, -0.5, 1.0, -0.5, 1.0, -0.5, 1.0, -0.5];
    let mut scratch = [0.0; 2 * two_dim::SCRATCH_PER_LAG];
    two_dim::check(&grid, &lag1, &lag2, [4, 2], flt.len()).unwrap();
    two_dim::forward(&grid, &lag1, &lag2, [4, 2], &aux, &flt, &mut dat, &mut scratch);

    loop {} // We don't actually run this, just compile it
}
