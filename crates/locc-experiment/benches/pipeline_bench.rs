//! Benchmarks for the build → estimate → analyze pipeline
//!
//! Run with: cargo bench -p locc-experiment

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use locc_experiment::{
    Angle, AnglePoint, CircuitBuilder, ConditionKind, ConditionResult, CorrelationEstimator,
    CountTable, ErrorModel, ExperimentConfig, QubitRoles, SignificanceAnalyzer, SweepResult,
};
use locc_hal::Counts;
use locc_ir::QubitId;

/// Eight three-bit outcomes with a skewed distribution.
fn three_bit_table(shots: u32) -> CountTable {
    let mut counts = Counts::new();
    let per = u64::from(shots) / 8;
    for i in 0..8u32 {
        counts.insert(format!("{i:03b}"), per + u64::from(i % 2));
    }
    let total = counts.total() as u32;
    CountTable::new((0..3).map(QubitId).collect(), total, counts)
}

fn condition(kind: ConditionKind, table: CountTable) -> ConditionResult {
    let estimator = CorrelationEstimator::new(QubitRoles::default(), ErrorModel::Binomial);
    ConditionResult {
        kind,
        estimate: estimator.estimate(&table).unwrap(),
        marker_p0: estimator.marker_zero_fraction(&table).unwrap(),
        counts: table,
    }
}

fn sweep_result(angles: usize) -> SweepResult {
    let points = (0..angles)
        .map(|i| AnglePoint {
            angle: Angle::from_degrees(i as f64 * 180.0 / angles as f64),
            standard: condition(ConditionKind::Standard, three_bit_table(2000)),
            no_reversal: condition(ConditionKind::NoReversal, three_bit_table(2000)),
            with_reversal: condition(ConditionKind::WithReversal, three_bit_table(2000)),
        })
        .collect();
    SweepResult {
        shots: 2000,
        points,
    }
}

/// Benchmark circuit construction per condition
fn bench_build_condition(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_condition");
    let builder = CircuitBuilder::new(&ExperimentConfig::default()).unwrap();

    for kind in ConditionKind::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(kind), &kind, |b, &kind| {
            b.iter(|| {
                builder
                    .build_condition(black_box(kind), black_box(Angle::from_degrees(60.0)))
                    .unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark correlation estimation
fn bench_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate");
    let table = three_bit_table(2000);

    for model in [ErrorModel::Binomial, ErrorModel::Bernoulli] {
        let estimator = CorrelationEstimator::new(QubitRoles::default(), model);
        group.bench_function(format!("{model:?}").to_lowercase(), |b| {
            b.iter(|| estimator.estimate(black_box(&table)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark sweep analysis over growing angle counts
fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    let analyzer = SignificanceAnalyzer::new(0.5, 2.0);

    for angles in &[7, 37, 181] {
        let result = sweep_result(*angles);
        group.bench_with_input(BenchmarkId::from_parameter(angles), &result, |b, result| {
            b.iter(|| analyzer.analyze(black_box(result)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build_condition, bench_estimate, bench_analyze);
criterion_main!(benches);
