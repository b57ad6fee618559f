use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use rauter::{Request, Response, Router};

fn demo_router() -> Router {
    let mut router = Router::new();
    router
        .get("/", |_req: &mut Request, res: &mut Response| res.end("index"))
        .unwrap();
    router
        .get("/users/:id", |req: &mut Request, res: &mut Response| {
            let id = req.param("id").unwrap_or_default().to_string();
            res.end(id);
        })
        .unwrap();
    router
}

fn request_parse_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_parse");

    let requests = [
        (
            "simple",
            b"GET / HTTP/1.1\r\nHost: localhost:7878\r\n\r\n".as_slice(),
        ),
        (
            "with_user_agent",
            b"GET /users/42 HTTP/1.1\r\nHost: localhost:7878\r\nUser-Agent: Mozilla/5.0 (X11; Linux x86_64)\r\nAccept: */*\r\nConnection: keep-alive\r\n\r\n".as_slice(),
        ),
        (
            "zero_padded",
            b"DELETE /users/42 HTTP/1.1\r\nHost: localhost\r\n\r\n\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0".as_slice(),
        ),
    ];

    for (name, request) in requests.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(name), request, |b, request| {
            b.iter(|| {
                let _ = Request::try_from(black_box(request), 0).unwrap();
            });
        });
    }

    group.finish();
}

/// 解析、分发并序列化响应，对应服务器处理一个连接的全部同步工作
fn request_pipeline_benchmark(c: &mut Criterion) {
    let router = demo_router();
    let mut group = c.benchmark_group("request_pipeline");

    let requests = [
        ("hit_literal", "GET / HTTP/1.1\r\nHost: localhost\r\n\r\n"),
        ("hit_param", "GET /users/42 HTTP/1.1\r\nHost: localhost\r\n\r\n"),
        ("miss", "GET /nowhere HTTP/1.1\r\nHost: localhost\r\n\r\n"),
        ("unknown_method", "OPTIONS * HTTP/1.1\r\nHost: localhost\r\n\r\n"),
    ];

    for (name, request) in requests.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(name), request, |b, request| {
            b.iter(|| {
                let mut request = Request::try_from(black_box(request.as_bytes()), 0).unwrap();
                let mut response = Response::new();
                Router::dispatch(&router, &mut request, &mut response);
                black_box(response.as_bytes());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, request_parse_benchmark, request_pipeline_benchmark);
criterion_main!(benches);
