#![allow(clippy::all)] // Clippy will attempt to remove black_box() internals

use criterion::*;
use lvconv::blocks::{GridBuf, PartitionBuf};
use lvconv::lags::{causal_2d, contiguous};
use lvconv::nonstationary::{one_dim, two_dim};
use lvconv::stationary;
use randn::*;

macro_rules! bench_1d_specific {
    ($group:ident, $t:ty, $nlag:expr, $size:expr) => {
        $group.throughput(Throughput::Elements(*$size as u64));

        $group.bench_with_input(
            BenchmarkId::new(format!("Stationary {} {} lags", stringify!($t), $nlag), $size),
            $size,
            |b, &size| {
                let mut rng = rng_fixed_seed();
                let lags = contiguous($nlag);
                let aux = randn::<$t>(&mut rng, size);
                let flt = randn::<$t>(&mut rng, $nlag);
                let mut dat = vec![0.0; size];

                b.iter(|| black_box(stationary::conv_fwd(&lags, &aux, &flt, &mut dat)));
            },
        );

        $group.bench_with_input(
            BenchmarkId::new(format!("Linearly-Varying Forward {} {} lags", stringify!($t), $nlag), $size),
            $size,
            |b, &size| {
                let mut rng = rng_fixed_seed();
                let lags = contiguous($nlag);
                let part = PartitionBuf::regular(size, 100, $nlag - 1).unwrap();
                let part = part.view();
                let aux = randn::<$t>(&mut rng, size);
                let flt = randn::<$t>(&mut rng, part.ncorners() * $nlag);
                let mut dat = vec![0.0; size];
                let mut scratch = vec![0.0; one_dim::SCRATCH_PER_LAG * $nlag];

                b.iter(|| {
                    black_box(one_dim::forward(&part, &lags, &aux, &flt, &mut dat, &mut scratch))
                });
            },
        );

        $group.bench_with_input(
            BenchmarkId::new(format!("Linearly-Varying Adjoint {} {} lags", stringify!($t), $nlag), $size),
            $size,
            |b, &size| {
                let mut rng = rng_fixed_seed();
                let lags = contiguous($nlag);
                let part = PartitionBuf::regular(size, 100, $nlag - 1).unwrap();
                let part = part.view();
                let aux = randn::<$t>(&mut rng, size);
                let dat = randn::<$t>(&mut rng, size);
                let mut flt = vec![0.0; part.ncorners() * $nlag];
                let mut scratch = vec![0.0; one_dim::SCRATCH_PER_LAG * $nlag];

                b.iter(|| {
                    black_box(one_dim::adjoint(&part, &lags, &aux, &mut flt, &dat, &mut scratch))
                });
            },
        );
    };
}

macro_rules! bench_2d_specific {
    ($group:ident, $t:ty, $nlag:expr, $side:expr) => {
        $group.throughput(Throughput::Elements(($side * $side) as u64));

        $group.bench_with_input(
            BenchmarkId::new(format!("Bilinearly-Varying Forward {} {:?} lags", stringify!($t), $nlag), $side),
            $side,
            |b, &side| {
                let mut rng = rng_fixed_seed();
                let dims = [side, side];
                let (lag1, lag2) = causal_2d($nlag);
                let grid = GridBuf::regular(dims, [20, 20], &lag1, &lag2).unwrap();
                let grid = grid.view();
                let aux = randn::<$t>(&mut rng, side * side);
                let flt = randn::<$t>(&mut rng, grid.ncorners() * lag1.len());
                let mut dat = vec![0.0; side * side];
                let mut scratch = vec![0.0; two_dim::SCRATCH_PER_LAG * lag1.len()];

                b.iter(|| {
                    black_box(two_dim::forward(
                        &grid, &lag1, &lag2, dims, &aux, &flt, &mut dat, &mut scratch,
                    ))
                });
            },
        );

        $group.bench_with_input(
            BenchmarkId::new(format!("Bilinearly-Varying Adjoint {} {:?} lags", stringify!($t), $nlag), $side),
            $side,
            |b, &side| {
                let mut rng = rng_fixed_seed();
                let dims = [side, side];
                let (lag1, lag2) = causal_2d($nlag);
                let grid = GridBuf::regular(dims, [20, 20], &lag1, &lag2).unwrap();
                let grid = grid.view();
                let aux = randn::<$t>(&mut rng, side * side);
                let dat = randn::<$t>(&mut rng, side * side);
                let mut flt = vec![0.0; grid.ncorners() * lag1.len()];
                let mut scratch = vec![0.0; two_dim::SCRATCH_PER_LAG * lag1.len()];

                b.iter(|| {
                    black_box(two_dim::adjoint(
                        &grid, &lag1, &lag2, dims, &aux, &mut flt, &dat, &mut scratch,
                    ))
                });
            },
        );
    };
}

fn bench_1d(c: &mut Criterion) {
    let mut group = c.benchmark_group("1D");
    for size in [1000, 100_000].iter() {
        bench_1d_specific!(group, f64, 10, size);
        bench_1d_specific!(group, f32, 10, size);
    }
    group.finish();
}

fn bench_2d(c: &mut Criterion) {
    let mut group = c.benchmark_group("2D");
    for side in [100_usize, 500].iter() {
        bench_2d_specific!(group, f64, [5, 3], side);
        bench_2d_specific!(group, f32, [5, 3], side);
    }
    group.finish();
}

criterion_group!(benches_1d, bench_1d);
criterion_group!(benches_2d, bench_2d);
criterion_main!(benches_1d, benches_2d,);

mod randn {
    use rand::distr::{Distribution, StandardUniform};
    use rand::rngs::StdRng;
    use rand::Rng;
    use rand::SeedableRng;

    /// Fixed random seed to support repeatable benchmarking
    const SEED: [u8; 32] = [
        0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 15, 14, 13, 12, 11, 10, 9, 8, 7,
        6, 5, 4, 3, 2, 1,
    ];

    /// Get a random number generator with a const seed for repeatable benchmarking
    pub fn rng_fixed_seed() -> StdRng {
        StdRng::from_seed(SEED)
    }

    /// Generate `n` random numbers using provided generator
    pub fn randn<T>(rng: &mut StdRng, n: usize) -> Vec<T>
    where
        StandardUniform: Distribution<T>,
    {
        (0..n).map(|_| rng.random::<T>()).collect()
    }
}
