use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rowmajor_lapack::{c64, glslv, inv, pinv, seig, svd, vsmul, SortOrder};

/// Row-major `rows x cols` matrix with entries uniform in [-1, 1), seeded for reproducibility.
fn generate_random_data(rows: usize, cols: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..rows * cols).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

fn generate_symmetric_data(dim: usize, seed: u64) -> Vec<f64> {
    let a = generate_random_data(dim, dim, seed);
    (0..dim * dim)
        .map(|k| {
            let (i, j) = (k / dim, k % dim);
            a[i * dim + j] + a[j * dim + i]
        })
        .collect()
}

fn determine_appropriate_sample_size(rows: usize, cols: usize) -> usize {
    match rows.max(cols) {
        0..=128 => 100,
        129..=512 => 30,
        _ => 10,
    }
}

fn criterion_benchmark_runner(c: &mut Criterion) {
    let scenarios = vec![
        ("Small", 32, 32, 1234),
        ("Medium", 128, 128, 1234),
        ("Large", 512, 512, 1234),
        ("Tall", 1024, 64, 1234),
        ("Wide", 64, 1024, 1234),
    ];

    for (name, rows, cols, seed) in scenarios {
        let data = generate_random_data(rows, cols, seed);
        let input_size_bytes = (rows * cols * std::mem::size_of::<f64>()) as u64;

        let mut group = c.benchmark_group(format!("decompose/{}", name));
        group.sample_size(determine_appropriate_sample_size(rows, cols));
        group.throughput(Throughput::Bytes(input_size_bytes));

        group.bench_with_input(BenchmarkId::new("svd", format!("{}x{}", rows, cols)), &data, |b, data| {
            b.iter(|| svd(black_box(data), rows, cols).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("pinv", format!("{}x{}", rows, cols)), &data, |b, data| {
            let mut out = vec![0.0; rows * cols];
            b.iter(|| pinv(black_box(data), rows, cols, &mut out).unwrap())
        });

        if rows == cols {
            let dim = rows;
            let symmetric = generate_symmetric_data(dim, seed);
            group.bench_with_input(BenchmarkId::new("seig", dim), &symmetric, |b, data| {
                let mut v = vec![0.0; dim * dim];
                let mut d = vec![0.0; dim * dim];
                b.iter(|| seig(black_box(data), dim, SortOrder::Descending, &mut v, &mut d).unwrap())
            });

            group.bench_with_input(BenchmarkId::new("inv", dim), &data, |b, data| {
                b.iter(|| {
                    let mut a = data.clone();
                    inv(black_box(&mut a), dim).unwrap();
                    a
                })
            });

            let rhs = generate_random_data(dim, 4, seed + 1);
            group.bench_with_input(BenchmarkId::new("glslv", dim), &data, |b, data| {
                let mut x = vec![0.0; dim * 4];
                b.iter(|| glslv(black_box(data), dim, &rhs, 4, &mut x).unwrap())
            });
        }
        group.finish();
    }

    let mut vector_group = c.benchmark_group("vector");
    for len in [1 << 10, 1 << 16] {
        vector_group.throughput(Throughput::Elements(len as u64));
        let data: Vec<c64> = generate_random_data(len, 2, 7)
            .chunks(2)
            .map(|pair| c64::new(pair[0], pair[1]))
            .collect();
        vector_group.bench_with_input(BenchmarkId::new("vsmul", len), &data, |b, data| {
            let mut a = data.clone();
            let mut out = vec![c64::new(0.0, 0.0); len];
            b.iter(|| vsmul(&mut a, c64::new(0.5, 0.5), Some(&mut out)).unwrap())
        });
    }
    vector_group.finish();
}

criterion_group!(benches, criterion_benchmark_runner);
criterion_main!(benches);
