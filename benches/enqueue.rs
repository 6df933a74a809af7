//! Benchmarks for producer-side enqueue into the outbound buffer.

use std::time::Duration;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use femtogelf::{GelfLevel, GelfMessage, GelfRecord, OutboundBuffer};

fn message(i: usize) -> GelfMessage {
    let level = GelfLevel::from_u8((i % 8) as u8).unwrap_or_default();
    GelfMessage::new("bench-host", level, "benchmark message").with_field("seq", i)
}

fn bench_enqueue(c: &mut Criterion) {
    c.bench_function("enqueue_until_full", |b| {
        b.iter_batched(
            || (OutboundBuffer::new(512), (0..512).map(message).collect::<Vec<_>>()),
            |(buffer, messages)| {
                for m in messages {
                    black_box(buffer.enqueue(m));
                }
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("enqueue_with_eviction", |b| {
        let buffer = OutboundBuffer::new(512);
        for i in 0..512 {
            buffer.enqueue(message(i));
        }
        let mut i = 0usize;
        b.iter(|| {
            i += 1;
            black_box(buffer.enqueue(message(i)));
        });
    });

    c.bench_function("drain_ready_record", |b| {
        let buffer = OutboundBuffer::new(512);
        b.iter(|| {
            buffer.enqueue(message(3));
            black_box(buffer.drain(Duration::ZERO).map(|m| m.priority()));
        });
    });
}

criterion_group!(benches, bench_enqueue);
criterion_main!(benches);
