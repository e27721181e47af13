//! Benchmarks for validating a decade of daily data.

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use std::hint::black_box;

use agroclim_core::quality::Statistics;
use agroclim_core::{Dataset, DateRange, QualityAnalyzer, TimeSeriesRecord, VariableKind};
use chrono::{Datelike, Days, NaiveDate};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};

const DAYS: u64 = 3650;

fn rainfall_dataset() -> Dataset {
    let start = NaiveDate::from_ymd_opt(2014, 1, 1).unwrap();
    let end = start + Days::new(DAYS - 1);
    let range = DateRange::new(start, end).expect("Failed to create range");
    let records = range
        .days()
        .map(|day| {
            let monsoon = (6..=9).contains(&day.month());
            let value = if monsoon {
                f64::from(day.ordinal() % 23)
            } else {
                f64::from(u8::from(day.day() % 11 == 0))
            };
            TimeSeriesRecord::new(day, value)
        })
        .collect();
    Dataset::new("mh_precip", VariableKind::Rainfall, range, records)
        .expect("Failed to create dataset")
}

fn bench_validation(c: &mut Criterion) {
    let dataset = rainfall_dataset();
    let analyzer = QualityAnalyzer::with_defaults();

    let mut group = c.benchmark_group("validation");
    group.throughput(Throughput::Elements(DAYS));

    group.bench_function("statistics_3650_days", |b| {
        let values = dataset.values();
        b.iter(|| Statistics::compute("mh_precip", black_box(&values)).unwrap());
    });

    group.bench_function("analyze_3650_days", |b| {
        b.iter(|| analyzer.analyze(black_box(&dataset)).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_validation);
criterion_main!(benches);
