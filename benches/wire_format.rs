use cachefront::services::wire_format::{decode, encode};
use cachefront::{ColumnValue, QueryResult};
use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn sample(rows: usize) -> QueryResult {
    let published = Utc.with_ymd_and_hms(1965, 8, 1, 0, 0, 0).unwrap();
    QueryResult::new(
        vec!["id".into(), "title".into(), "rating".into(), "in_print".into(), "published".into()],
        (0..rows)
            .map(|i| {
                vec![
                    ColumnValue::Integer(i as i64),
                    ColumnValue::Text(format!("Book number {i}")),
                    ColumnValue::Float(i as f64 / 10.0),
                    ColumnValue::Boolean(i % 2 == 0),
                    ColumnValue::Timestamp(published),
                ]
            })
            .collect(),
    )
}

fn bench_wire_format(c: &mut Criterion) {
    let mut group = c.benchmark_group("wire_format");
    for rows in [10_usize, 1_000] {
        let result = sample(rows);
        let payload = encode(&result).unwrap();

        group.bench_with_input(BenchmarkId::new("encode", rows), &result, |b, result| {
            b.iter(|| encode(black_box(result)).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("decode", rows), &payload, |b, payload| {
            b.iter(|| decode(black_box(payload)).unwrap());
        });
    }

    let legacy = sample(1_000).rows_json().to_string();
    group.bench_function("decode_legacy/1000", |b| {
        b.iter(|| decode(black_box(&legacy)).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_wire_format);
criterion_main!(benches);
