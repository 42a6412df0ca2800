//! Benchmarks for request handling performance.
//!
//! Run with: cargo bench --bench request_handling

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use iflow_proxy::{
    api::{handlers::parse_chat_request, ChatCompletionRequest, UpstreamRequest},
    services::ModelAliasTable,
};
use serde_json::{json, Value};

fn create_test_request(message_count: usize) -> ChatCompletionRequest {
    let messages: Vec<Value> = (0..message_count)
        .map(|i| {
            json!({
                "role": if i % 2 == 0 { "user" } else { "assistant" },
                "content": format!("Message content {}", i),
            })
        })
        .collect();

    ChatCompletionRequest {
        model: Some(json!("gpt-4")),
        messages: Some(Value::Array(messages)),
        temperature: Some(json!(0.7)),
        max_tokens: Some(json!(100)),
        stream: Some(json!(false)),
    }
}

fn bench_request_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_parsing");

    for message_count in [1, 5, 10, 20].iter() {
        let body = serde_json::to_vec(&create_test_request(*message_count)).unwrap();

        group.throughput(Throughput::Elements(*message_count as u64));
        group.bench_function(format!("{}_messages", message_count), |b| {
            b.iter(|| {
                black_box(parse_chat_request(black_box(&body)).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_upstream_payload(c: &mut Criterion) {
    let table = ModelAliasTable::builtin();
    let mut group = c.benchmark_group("upstream_payload");

    for message_count in [1, 10].iter() {
        let request = create_test_request(*message_count);

        group.bench_function(format!("build_{}_messages", message_count), |b| {
            b.iter(|| {
                let payload = UpstreamRequest::from_chat(black_box(request.clone()), &table);
                black_box(serde_json::to_vec(&payload).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_alias_resolution(c: &mut Criterion) {
    let table = ModelAliasTable::builtin();
    let mut group = c.benchmark_group("alias_resolution");

    group.bench_function("known_alias", |b| {
        b.iter(|| black_box(table.resolve(black_box(Some("claude-3-sonnet")))));
    });
    group.bench_function("unknown_alias", |b| {
        b.iter(|| black_box(table.resolve(black_box(Some("llama-3-70b")))));
    });
    group.bench_function("absent", |b| {
        b.iter(|| black_box(table.resolve(black_box(None))));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_request_parsing,
    bench_upstream_payload,
    bench_alias_resolution
);
criterion_main!(benches);
