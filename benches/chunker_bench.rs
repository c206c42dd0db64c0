//! Benchmarks for the chunker and merger hot paths.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

use derrick::channel::{
    ChannelDataMerger, ChannelDataRecord, ChannelIndex, ChannelLayout, DataChunker,
    IndexDirection, IndexRange,
};

fn layout() -> ChannelLayout {
    ChannelLayout::new(
        vec!["DEPTH".into(), "GR".into(), "ROP".into()],
        vec!["m".into(), "gAPI".into(), "m/h".into()],
        vec!["-999.25".into(); 3],
    )
    .unwrap()
}

fn records(count: usize, start: f64) -> Vec<ChannelDataRecord> {
    (0..count)
        .map(|i| {
            let depth = start + i as f64 * 0.5;
            ChannelDataRecord::new(
                None,
                vec![json!(depth), json!(45.0 + (i % 50) as f64), json!(12.5)],
            )
        })
        .collect()
}

fn bench_chunker(c: &mut Criterion) {
    let indices = vec![ChannelIndex::depth("DEPTH", "m", IndexDirection::Increasing)];
    let chunker = DataChunker::new(1000.0, true);

    c.bench_function("chunk_10k_records", |b| {
        b.iter(|| {
            let chunks = chunker
                .chunk(black_box(records(10_000, 0.0)), &indices)
                .unwrap();
            black_box(chunks)
        })
    });
}

fn bench_merger(c: &mut Criterion) {
    let layout = layout();

    c.bench_function("merge_10k_overlapping", |b| {
        b.iter(|| {
            let existing = records(10_000, 0.0)
                .into_iter()
                .map(|mut r| {
                    r.chunk_id = Some("c1".to_string());
                    r
                })
                .collect::<Vec<_>>();
            let incoming = records(10_000, 2500.0);
            let update_range = IndexRange::bounded(2500.0, 7499.5);

            let merger = ChannelDataMerger::new(
                &layout,
                existing.into_iter(),
                &layout,
                vec![Some(update_range); 3],
                incoming.into_iter(),
                update_range,
                true,
            )
            .unwrap();
            black_box(merger.count())
        })
    });
}

criterion_group!(benches, bench_chunker, bench_merger);
criterion_main!(benches);
