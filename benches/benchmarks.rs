use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndarray::Array2;
use window_pca::synthetic::DriftingStream;
use window_pca::{decorrelate, segment, DecorrelationConfig, FittedBasis};

fn generate_rows(n_rows: usize, width: usize) -> Array2<f64> {
    let stream = DriftingStream::default()
        .with_seed(42)
        .generate(n_rows * width)
        .unwrap();
    segment(&stream, width).unwrap()
}

fn bench_basis_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("basis_fit");

    for &(n_rows, width) in [(200, 50), (500, 100), (400, 250)].iter() {
        let rows = generate_rows(n_rows, width);
        group.throughput(Throughput::Elements((n_rows * width) as u64));
        group.bench_with_input(
            BenchmarkId::new("fit", format!("{}x{}", n_rows, width)),
            &rows,
            |b, rows| b.iter(|| FittedBasis::fit(rows.view()).unwrap()),
        );
    }
    group.finish();
}

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("basis_transform");

    for &(n_rows, width) in [(500, 100), (1000, 250)].iter() {
        let rows = generate_rows(n_rows, width);
        let basis = FittedBasis::fit(rows.view()).unwrap();
        group.throughput(Throughput::Elements((n_rows * width) as u64));
        group.bench_with_input(
            BenchmarkId::new("transform", format!("{}x{}", n_rows, width)),
            &rows,
            |b, rows| b.iter(|| basis.transform(rows.view()).unwrap()),
        );
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("decorrelate");
    group.sample_size(10);

    let width = 200;
    let stream = DriftingStream::default().with_seed(7).generate(width * 600).unwrap();
    let config = DecorrelationConfig::new(width, 0.5);
    group.throughput(Throughput::Elements(stream.len() as u64));
    group.bench_function(BenchmarkId::new("end_to_end", format!("{}x{}", 600, width)), |b| {
        b.iter(|| decorrelate(&stream, &config).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_basis_fit, bench_transform, bench_pipeline);
criterion_main!(benches);
