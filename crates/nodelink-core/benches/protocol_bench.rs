//! Criterion benchmarks for the RPC probe wire format.
//!
//! The probe runs on a single-threaded device loop, so request building and
//! response parsing should stay in the low microseconds.
//!
//! Run with:
//! ```bash
//! cargo bench --package nodelink-core --bench protocol_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nodelink_core::protocol::{build_request, parse_head, parse_reply, SessionToken};
use nodelink_core::RpcTarget;

// ── Fixtures ──────────────────────────────────────────────────────────────────

fn make_target() -> RpcTarget {
    RpcTarget {
        host: "192.168.1.10".to_string(),
        username: "admin".to_string(),
        password: "secret".to_string(),
        ..RpcTarget::default()
    }
}

const CONFLICT_RESPONSE: &[u8] = b"HTTP/1.1 409 Conflict\r\n\
Server: Transmission\r\n\
X-Transmission-Session-Id: 7LQzL1zWqJ8u3bE0m9bN1fYkQm4vY2xZ\r\n\
Date: Sat, 18 Oct 2026 10:00:00 GMT\r\n\
Content-Length: 0\r\n\
\r\n";

const STATS_BODY: &[u8] = br#"{"arguments":{"activeTorrentCount":3,"downloadSpeed":1843200,"pausedTorrentCount":1,"torrentCount":4,"uploadSpeed":204800},"result":"success"}"#;

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_build_request(c: &mut Criterion) {
    let target = make_target();
    let token = SessionToken::from_header_value("7LQzL1zWqJ8u3bE0m9bN1fYkQm4vY2xZ");

    c.bench_function("build_request/first_round", |b| {
        b.iter(|| build_request(black_box(&target), None))
    });
    c.bench_function("build_request/second_round", |b| {
        b.iter(|| build_request(black_box(&target), token.as_ref()))
    });
}

fn bench_parse_head(c: &mut Criterion) {
    c.bench_function("parse_head/conflict", |b| {
        b.iter(|| parse_head(black_box(CONFLICT_RESPONSE)))
    });
}

fn bench_parse_reply(c: &mut Criterion) {
    c.bench_function("parse_reply/session_stats", |b| {
        b.iter(|| parse_reply(black_box(STATS_BODY)))
    });
}

criterion_group!(benches, bench_build_request, bench_parse_head, bench_parse_reply);
criterion_main!(benches);
