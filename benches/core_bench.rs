//! Benchmarks for stackgraph core operations.
//!
//! Run with: cargo bench
//!
//! Results include 95% confidence intervals via Criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stackgraph::core::parser::{parse_description, Format};
use stackgraph::core::resolved::{ResolvedResource, ResourceConfig, TopicConfig};
use stackgraph::core::{compile, graph, hasher, naming, reference};
use stackgraph::resources::Registry;

const SHOP: &str = r#"
project: {name: shop, backend: flat, cloud_project_id: acme-prod}
service_account: {name: runner, roles: [roles/run.invoker]}
buckets: [{name: uploads, versioning: true}]
secrets: [{name: api-key}, {name: db-password}]
topics: [{name: events}]
queues: [{name: jobs}]
networks:
  - name: main
    subnets: [{name: app, cidr: 10.0.0.0/24}]
    containers:
      - name: api
        env:
          BUCKET: "@bucket/uploads"
          EVENTS: "@topic/events"
          DB: "@database/orders.connectionString"
        secrets: {API_KEY: "@secret/api-key"}
      - name: worker
        env: {API_URL: "@container/api.url"}
    functions:
      - name: hook
        trigger_topic: "@topic/events"
    databases: [{name: orders}]
    caches: [{name: sessions}]
    load_balancer:
      https: true
      domain: shop.example.com
      routes:
        - {path: "/api/*", backend: api}
crons:
  - {name: tick, schedule: "*/5 * * * *", target: "@container/worker"}
"#;

fn bench_reference_parse(c: &mut Criterion) {
    let inputs = [
        "@secret/api-key",
        "@database/orders.connectionString",
        "@container/api.url",
        "plain-value",
    ];
    c.bench_function("reference_parse", |b| {
        b.iter(|| {
            for input in &inputs {
                black_box(reference::parse(black_box(input)));
            }
        });
    });
}

fn bench_sanitize(c: &mut Criterion) {
    c.bench_function("sanitize_identifier", |b| {
        b.iter(|| black_box(naming::sanitize_identifier(black_box("my-shop.api-v2"))));
    });
}

fn bench_compile(c: &mut Criterion) {
    let desc = parse_description(SHOP, Format::Yaml).unwrap();
    c.bench_function("compile_shop", |b| {
        b.iter(|| black_box(compile(black_box(&desc)).unwrap()));
    });
}

fn bench_generate(c: &mut Criterion) {
    let desc = parse_description(SHOP, Format::Yaml).unwrap();
    let config = compile(&desc).unwrap();
    let registry = Registry::builtin().unwrap();
    c.bench_function("generate_shop", |b| {
        b.iter(|| {
            let report = stackgraph::core::codegen::generate_all(black_box(&config), &registry);
            black_box(report.render());
        });
    });
}

fn chain(n: usize) -> Vec<ResolvedResource> {
    (0..n)
        .map(|i| ResolvedResource {
            id: format!("topic-{i:04}"),
            resource_type: "gcp:pubsub_topic".to_string(),
            name: format!("{i:04}"),
            config: ResourceConfig::Topic(TopicConfig::default()),
            depends_on: if i > 0 {
                vec![format!("topic-{:04}", i - 1)]
            } else {
                Vec::new()
            },
            network: None,
        })
        .rev()
        .collect()
}

fn bench_topo_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("topo_sort");
    for n in [10, 100, 1000] {
        let nodes = chain(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &nodes, |b, nodes| {
            b.iter(|| black_box(graph::sort(black_box(nodes)).unwrap()));
        });
    }
    group.finish();
}

fn bench_fingerprint(c: &mut Criterion) {
    let desc = parse_description(SHOP, Format::Yaml).unwrap();
    let config = compile(&desc).unwrap();
    c.bench_function("fingerprint_shop", |b| {
        b.iter(|| black_box(hasher::fingerprint(black_box(&config)).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_reference_parse,
    bench_sanitize,
    bench_compile,
    bench_generate,
    bench_topo_sort,
    bench_fingerprint
);
criterion_main!(benches);
