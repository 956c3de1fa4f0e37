use barrier_scan::data::random_data;
use barrier_scan::{parallel_prefix_sum, sequential_prefix_sum};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};

fn bench_scan(c: &mut Criterion) {
    let sizes = [65_536usize, 1_048_576];
    for &size in &sizes {
        let input = random_data(size, Some(42));

        let mut group = c.benchmark_group("prefix_sum");
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("sequential", size), &input, |b, input| {
            b.iter_batched(
                || input.clone(),
                |mut data| sequential_prefix_sum(&mut data),
                BatchSize::LargeInput,
            );
        });
        for threads in [2usize, 4, 8] {
            let id = BenchmarkId::new(format!("parallel_t{threads}"), size);
            group.bench_with_input(id, &input, |b, input| {
                b.iter_batched(
                    || input.clone(),
                    |mut data| parallel_prefix_sum(&mut data, threads).unwrap(),
                    BatchSize::LargeInput,
                );
            });
        }
        group.finish();
    }
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
