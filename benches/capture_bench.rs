//! Capture hot-path benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use session_replay::capture::dom::ElementSnapshot;
use session_replay::capture::handlers::capture_input;
use session_replay::capture::masking::mask_value;
use session_replay::capture::event::{EventPayload, ScrollPayload};
use session_replay::{ClientConfig, ReplayClient};

fn bench_masking(c: &mut Criterion) {
    c.bench_function("mask_card_number", |b| {
        b.iter(|| mask_value(black_box("4111111111111111"), black_box("text")))
    });

    let field = ElementSnapshot::new("INPUT")
        .with_name("cardNumber")
        .with_value("4111111111111111");
    c.bench_function("capture_masked_input", |b| {
        b.iter(|| capture_input(black_box(&field)))
    });
}

fn bench_add_event(c: &mut Criterion) {
    // no runtime and a batch size that is never reached: pure queuing
    let client = ReplayClient::builder(ClientConfig {
        batch_size: usize::MAX,
        max_events_per_second: u32::MAX,
        ..Default::default()
    })
    .build()
    .expect("valid config");

    let payload = EventPayload::Scroll(ScrollPayload {
        scroll_x: 0.0,
        scroll_y: 640.0,
        viewport_width: 1280.0,
        viewport_height: 720.0,
        document_height: 4800.0,
    });

    c.bench_function("add_event", |b| {
        b.iter(|| {
            let admission = client.add_event(black_box(payload.clone()));
            if client.queue_len() >= 10_000 {
                // without a runtime this just discards the queue
                client.flush_events_sync();
            }
            admission
        })
    });
}

criterion_group!(benches, bench_masking, bench_add_event);
criterion_main!(benches);
