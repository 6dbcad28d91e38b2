//! Routing benchmarks.
//!
//! Run with: `cargo bench -p halyard-router`

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use halyard_core::{handler_fn, HttpResponse, Payload, RequestContext};
use halyard_router::{Endpoint, PathPattern, Router};
use http::Method;

fn endpoint() -> Endpoint {
    Endpoint::new(Arc::new(handler_fn(|_, _, _| Ok(HttpResponse::ok()))))
}

fn build_router(num_routes: usize) -> Router {
    let mut builder = Router::builder();

    // Literal routes
    for i in 0..num_routes / 3 {
        builder
            .add_route(["GET"], &format!("/api/v1/resource{i}"), endpoint())
            .unwrap();
    }

    // Single-variable routes
    for i in 0..num_routes / 3 {
        builder
            .add_route(["GET"], &format!("/api/v1/resource{i}/<int:id>"), endpoint())
            .unwrap();
    }

    // Nested routes
    for i in 0..num_routes / 3 {
        builder
            .add_route(
                ["GET"],
                &format!("/api/v1/org/<org_id>/resource{i}/<int:id>"),
                endpoint(),
            )
            .unwrap();
    }

    builder.build()
}

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile", |b| {
        b.iter(|| black_box(PathPattern::compile("/api/v1/org/<org_id>/users/<int:id>")));
    });
}

fn bench_literal_match(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("literal_match", |b| {
        b.iter(|| black_box(router.resolve(&Method::GET, "/api/v1/resource20").is_ok()));
    });
}

fn bench_param_match(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("param_match", |b| {
        b.iter(|| black_box(router.resolve(&Method::GET, "/api/v1/resource25/12345").is_ok()));
    });
}

fn bench_nested_param_match(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("nested_param_match", |b| {
        b.iter(|| {
            black_box(
                router
                    .resolve(&Method::GET, "/api/v1/org/acme-corp/resource10/12345")
                    .is_ok(),
            )
        });
    });
}

fn bench_miss(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("miss", |b| {
        b.iter(|| black_box(router.resolve(&Method::GET, "/api/v1/nonexistent/path").is_err()));
    });
}

fn bench_full_dispatch(c: &mut Criterion) {
    let router = build_router(100);
    let ctx = RequestContext::new();

    c.bench_function("full_dispatch", |b| {
        b.iter(|| {
            black_box(router.route(
                &Method::GET,
                "/api/v1/resource25/12345",
                None,
                &Payload::Empty,
                &ctx,
            ))
        });
    });
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");

    for num_routes in [12, 48, 96, 480, 960] {
        let router = build_router(num_routes);

        group.bench_with_input(
            BenchmarkId::new("literal_match", num_routes),
            &num_routes,
            |b, &n| {
                let path = format!("/api/v1/resource{}", n / 6);
                b.iter(|| black_box(router.resolve(&Method::GET, &path).is_ok()));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("param_match", num_routes),
            &num_routes,
            |b, &n| {
                let path = format!("/api/v1/resource{}/12345", n / 6);
                b.iter(|| black_box(router.resolve(&Method::GET, &path).is_ok()));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_compile,
    bench_literal_match,
    bench_param_match,
    bench_nested_param_match,
    bench_miss,
    bench_full_dispatch,
    bench_scaling
);
criterion_main!(benches);
