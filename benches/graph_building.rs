//! Performance benchmarks for graph building
//!
//! Measures the pipeline stages over a synthetic cluster of `APPS` applications, each made of
//! a Deployment, a Service, a ConfigMap, a Secret, an HPA and a NetworkPolicy:
//! - Decoding and normalization
//! - Relationship extraction and selector resolution
//! - Mermaid rendering
//!
//! Run with: cargo bench

use criterion::{criterion_group, criterion_main, Criterion};
use manifest_graph::{
    compiler::{render, ManifestCompiler},
    config::RenderConfig,
    render::DiagramFormat,
};
use std::fmt::Write;

const APPS: usize = 200;

fn synthetic_manifests(apps: usize) -> String {
    let mut out = String::new();
    for i in 0..apps {
        let ns = format!("team-{}", i % 10);
        write!(
            out,
            r#"---
kind: ConfigMap
metadata: {{name: app-{i}-config, namespace: {ns}}}
---
kind: Secret
metadata: {{name: app-{i}-creds, namespace: {ns}}}
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: app-{i}
  namespace: {ns}
  labels: {{app: app-{i}}}
spec:
  template:
    spec:
      containers:
        - name: main
          image: registry.local/app-{i}:latest
          envFrom:
            - configMapRef: {{name: app-{i}-config}}
            - secretRef: {{name: app-{i}-creds}}
---
kind: Service
metadata: {{name: app-{i}, namespace: {ns}}}
spec:
  selector: {{app: app-{i}}}
  ports: [{{port: 8080}}]
---
kind: HorizontalPodAutoscaler
metadata: {{name: app-{i}, namespace: {ns}}}
spec:
  scaleTargetRef: {{kind: Deployment, name: app-{i}}}
---
kind: NetworkPolicy
metadata: {{name: app-{i}-policy, namespace: {ns}}}
spec:
  podSelector:
    matchLabels: {{app: app-{i}}}
"#
        )
        .unwrap();
    }
    out
}

// Benchmark: decode through resolve
fn bench_compile(c: &mut Criterion) {
    let manifests = synthetic_manifests(APPS);

    c.bench_function("compile_synthetic_cluster", |b| {
        b.iter(|| {
            let resolution = ManifestCompiler::default()
                .compile_str(&manifests, "bench")
                .unwrap();
            resolution.graph.stats()
        });
    });
}

// Benchmark: rendering an already compiled graph
fn bench_render(c: &mut Criterion) {
    let manifests = synthetic_manifests(APPS);
    let resolution = ManifestCompiler::default()
        .compile_str(&manifests, "bench")
        .unwrap();
    let er = RenderConfig::default();
    let class = RenderConfig {
        format: DiagramFormat::Class,
        ..Default::default()
    };

    c.bench_function("render_er_diagram", |b| {
        b.iter(|| render(&resolution, &er).unwrap().len());
    });
    c.bench_function("render_class_diagram", |b| {
        b.iter(|| render(&resolution, &class).unwrap().len());
    });
}

// Benchmark: neighbourhood queries after compilation
fn bench_graph_queries(c: &mut Criterion) {
    let manifests = synthetic_manifests(APPS);
    let resolution = ManifestCompiler::default()
        .compile_str(&manifests, "bench")
        .unwrap();

    c.bench_function("graph_queries", |b| {
        b.iter(|| {
            let mut degree = 0;
            for resource in resolution.resources.iter() {
                let key = resource.key();
                degree += resolution.graph.outgoing(&key).len();
                degree += resolution.graph.incoming(&key).len();
            }
            (degree, resolution.graph.isolated().len())
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(50);
    targets =
        bench_compile,
        bench_render,
        bench_graph_queries
}

criterion_main!(benches);
