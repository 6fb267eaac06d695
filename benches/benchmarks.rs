use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use hashviz::{HashTable, Procedure, SearchMode, Visualizer, VisualizerConfig, run_blocking};

// Helper for building tables with a fixed number of random values
fn generate_table(rng: &mut StdRng, count: usize) -> HashTable {
    let mut table = HashTable::new();
    for _ in 0..count {
        table.insert(rng.gen_range(0..1000));
    }
    table
}

// Benchmark table mutation
fn bench_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("table");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("insert", |b| {
        let mut table = HashTable::new();
        let mut value = 0i64;
        b.iter(|| {
            value = value.wrapping_add(7);
            black_box(table.insert(black_box(value)))
        })
    });

    group.bench_function("random_fill_10", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| {
            let mut table = HashTable::new();
            black_box(table.random_fill(&mut rng, 10, 999))
        })
    });

    group.bench_function("sorted_view_full", |b| {
        let table = generate_table(&mut StdRng::seed_from_u64(42), 200);
        b.iter(|| black_box(table.sorted_view()))
    });

    group.finish();
}

// Benchmark complete search runs without step delay
fn bench_search(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42); // Use fixed seed for reproducibility
    let fills = [0, 10, 30, 200];

    let mut group = c.benchmark_group("search");
    group.measurement_time(Duration::from_secs(5));

    for &fill in &fills {
        let table = generate_table(&mut rng, fill);
        let target = table.sorted_view().last().copied().unwrap_or(1);

        for mode in [SearchMode::Linear, SearchMode::Binary] {
            group.bench_with_input(
                BenchmarkId::new(mode.label(), fill),
                &table,
                |b, table| {
                    b.iter(|| black_box(Procedure::new(mode, table, black_box(target)).run_to_end()))
                },
            );
        }
    }

    group.finish();
}

// Benchmark a full session through the visualizer, including snapshots
fn bench_session(c: &mut Criterion) {
    let config = VisualizerConfig {
        step_delay: Duration::ZERO,
        seed: Some(42),
        ..VisualizerConfig::default()
    };
    let mut visualizer = Visualizer::new(config).expect("Failed to create visualizer");
    visualizer.random_fill();
    let target = visualizer.table().sorted_view().first().copied().unwrap_or(0);

    c.bench_function("session/linear_with_snapshots", |b| {
        b.iter(|| {
            let generation = visualizer.search(target, SearchMode::Linear);
            let mut frames = 0usize;
            run_blocking(&mut visualizer, generation, Duration::ZERO, |snapshot| {
                frames += snapshot.slots.len();
            });
            black_box(frames)
        })
    });
}

criterion_group!(benches, bench_table, bench_search, bench_session);
criterion_main!(benches);
