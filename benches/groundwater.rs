use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use groundwater::{pad_station_code, summarize, LatLon, MonthlyAverageTable, RawReading};

fn readings() -> Vec<RawReading> {
    let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default();
    (0..40)
        .flat_map(|station| {
            (0..24 * 365).map(move |hour| RawReading {
                station_id: pad_station_code(&(1000 + station).to_string()),
                station_name: format!("Station {station}"),
                date: start + Duration::days(hour / 24),
                value: 250.0 + (hour % 97) as f64 * 0.05,
                location: LatLon(47.55, 7.6),
            })
        })
        .collect()
}

fn bench_aggregation(c: &mut Criterion) {
    let raw = readings();
    c.bench_function("summarize", |b| b.iter(|| summarize(black_box(&raw))));

    let means: Vec<(i32, u32, f64)> = (1976..2025)
        .flat_map(|year| (1..=12).map(move |month| (year, month, 250.0 + f64::from(month))))
        .collect();
    c.bench_function("monthly_average_table", |b| {
        b.iter(|| MonthlyAverageTable::from_means(black_box(means.iter().copied())))
    });
}

criterion_group!(benches, bench_aggregation);
criterion_main!(benches);
