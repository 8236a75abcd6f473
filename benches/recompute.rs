use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use parcel_ledger::ledger::{DailyInputs, MetricsConfig, Mutation, Period, PeriodLedger};
use parcel_ledger::storage::csv_backend::{load_ledger_from_path, save_ledger_to_path};
use tempfile::tempdir;

fn sample_inputs(day: u32) -> DailyInputs {
    let date = NaiveDate::from_ymd_opt(2025, 1, day).expect("valid day");
    DailyInputs::try_new(
        date,
        (20 + day % 7) as i64,
        (12 + day % 11) as i64,
        150_000 + (day as i64) * 1_250,
        60_000,
        5_000 + (day as i64 % 5) * 2_000,
    )
    .expect("valid inputs")
}

fn build_month() -> PeriodLedger {
    let period = Period::new(2025, 1).expect("period");
    PeriodLedger::from_inputs(
        period,
        MetricsConfig::with_tax_rate(0.1),
        (1..=31).map(sample_inputs),
    )
    .expect("ledger")
}

fn bench_recompute(c: &mut Criterion) {
    let ledger = build_month();

    c.bench_function("edit_first_day_full_month", |b| {
        b.iter_batched(
            || ledger.clone(),
            |mut month| {
                let mut inputs = sample_inputs(1);
                inputs.orders_delivered = 0;
                month
                    .apply(Mutation::Update {
                        date: inputs.date,
                        inputs,
                    })
                    .expect("update");
                black_box(month.cumulative_deficit());
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_csv_io(c: &mut Criterion) {
    let ledger = build_month();
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("2025_01.csv");

    c.bench_function("month_save", |b| {
        b.iter(|| save_ledger_to_path(&ledger, &path).expect("save"))
    });

    save_ledger_to_path(&ledger, &path).expect("seed");

    c.bench_function("month_load", |b| {
        b.iter(|| {
            let report =
                load_ledger_from_path(&path, ledger.period(), ledger.metrics_config()).expect("load");
            black_box(report);
        })
    });
}

criterion_group!(benches, bench_recompute, bench_csv_io);
criterion_main!(benches);
