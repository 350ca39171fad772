use std::hint::black_box;

use claude_session_manager::indexer::{dedupe_sessions, rank_sessions};
use claude_session_manager::models::SessionRecord;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::Map;

/// N history records over N/5 sessions, every tenth one a local command
fn generate_records(num_records: usize) -> Vec<SessionRecord> {
    (0..num_records)
        .map(|i| SessionRecord {
            display: if i % 10 == 0 { "/clear".to_string() } else { format!("prompt {i}") },
            timestamp: ((i * 7919) % 100_003) as i64,
            project: Some(format!("/Users/test/project{}", i % 20)),
            session_id: Some(format!("session-{:06}", i % (num_records / 5).max(1))),
            custom_title: None,
            extra: Map::new(),
        })
        .collect()
}

fn bench_dedupe_and_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("dedupe_and_rank");

    for size in [1_000, 10_000, 100_000].iter() {
        let records = generate_records(*size);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("dedupe", size), size, |b, _| {
            b.iter(|| dedupe_sessions(black_box(&records)));
        });
        group.bench_with_input(BenchmarkId::new("dedupe_rank", size), size, |b, _| {
            b.iter(|| {
                // Synthetic sizes, no disk access
                let unique = dedupe_sessions(black_box(&records));
                rank_sessions(unique, |record| (record.timestamp % 3) as u64)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_dedupe_and_rank);
criterion_main!(benches);
