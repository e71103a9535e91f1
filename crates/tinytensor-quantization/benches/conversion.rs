//! Benchmarks for the fixed-scale conversion routines

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tinytensor_common::{Matrix, OverflowPolicy};
use tinytensor_quantization::{quantize_i8, to_half16_into, to_i8};

/// Square matrix with values spread over [-2, 2)
fn create_benchmark_matrix(side: usize) -> Matrix<f32> {
    let size = (side * side) as f32;
    Matrix::from_fn(side, side, |r, c| ((r * side + c) as f32 - size / 2.0) / (size / 4.0))
        .unwrap()
}

fn bench_conversion_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("conversion_sizes");

    for side in [16usize, 64, 256, 512] {
        let source = create_benchmark_matrix(side);
        group.throughput(Throughput::Elements((side * side) as u64));

        group.bench_with_input(BenchmarkId::new("int8_into", side), &side, |b, &side| {
            let mut dest = Matrix::<i8>::new(side, side).unwrap();
            b.iter(|| to_i8(black_box(&source), black_box(&mut dest)).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("int8_alloc", side), &side, |b, _| {
            b.iter(|| black_box(quantize_i8(black_box(&source)).unwrap()))
        });

        group.bench_with_input(BenchmarkId::new("half16_into", side), &side, |b, &side| {
            let mut dest = Matrix::<i16>::new(side, side).unwrap();
            b.iter(|| {
                black_box(
                    to_half16_into(black_box(&source), &mut dest, OverflowPolicy::Saturate)
                        .unwrap(),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_conversion_sizes);
criterion_main!(benches);
