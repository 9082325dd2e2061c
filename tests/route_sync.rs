//! Route refresh against live HTTP route sources.

use std::fmt::Arguments;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use url::Url;

use lan_router::observability::{LogLevel, LogSink};
use lan_router::{RouteTable, RoutingClient};

mod common;

fn table(pairs: &[(&str, &[&str])]) -> RouteTable {
    pairs
        .iter()
        .map(|(h, ips)| (h.to_string(), ips.iter().map(|s| s.to_string()).collect()))
        .collect()
}

fn source(addr: std::net::SocketAddr) -> Url {
    Url::parse(&format!("http://{}/routes", addr)).unwrap()
}

fn client() -> RoutingClient {
    RoutingClient::new(reqwest::Client::builder().no_proxy().build().unwrap())
}

#[derive(Default)]
struct CaptureSink {
    lines: Mutex<Vec<String>>,
}

impl LogSink for CaptureSink {
    fn log(&self, _level: LogLevel, args: Arguments<'_>) {
        self.lines.lock().push(args.to_string());
    }
}

/// Source that serves whatever document is currently in `doc`.
async fn mutable_source(doc: Arc<Mutex<String>>) -> Url {
    let addr = common::start_programmable_backend(move || {
        let doc = doc.clone();
        async move { (200, doc.lock().clone()) }
    })
    .await;
    source(addr)
}

#[tokio::test]
async fn test_fastest_valid_source_wins() {
    let slow = common::start_programmable_backend(|| async {
        tokio::time::sleep(Duration::from_secs(2)).await;
        (200, r#"{"svc.internal": ["10.0.0.1"]}"#.to_string())
    })
    .await;
    let fast = common::start_programmable_backend(|| async {
        (200, r#"{"svc.internal": ["10.0.0.2"]}"#.to_string())
    })
    .await;

    let c = client();
    let started = Instant::now();
    let routes = c.refresh(&[source(slow), source(fast)], Duration::from_secs(5)).await;

    assert_eq!(routes, table(&[("svc.internal", &["10.0.0.2"])]));
    assert!(started.elapsed() < Duration::from_secs(1), "race waited for the slow source");
}

#[tokio::test]
async fn test_failing_sources_are_discarded_and_logged() {
    let broken = common::start_programmable_backend(|| async { (500, "oops".to_string()) }).await;
    let garbage = common::start_programmable_backend(|| async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        (200, "not json".to_string())
    })
    .await;
    let good = common::start_programmable_backend(|| async {
        tokio::time::sleep(Duration::from_millis(300)).await;
        (200, r#"{"svc.internal": ["10.0.0.3"]}"#.to_string())
    })
    .await;

    let sink = Arc::new(CaptureSink::default());
    let c = client();
    c.set_logger(Some(sink.clone()));

    let changed = c
        .refresh_and_apply(&[source(broken), source(garbage), source(good)], Duration::from_secs(5))
        .await;
    assert!(changed);
    assert_eq!(c.routes(), table(&[("svc.internal", &["10.0.0.3"])]));

    let lines = sink.lines.lock();
    assert!(lines.iter().any(|l| l.contains("bad status code: 500")), "{:?}", lines);
    assert!(lines.iter().any(|l| l.contains("decode")), "{:?}", lines);
}

#[tokio::test]
async fn test_all_sources_failing_keeps_previous_routes() {
    let broken = common::start_programmable_backend(|| async { (503, String::new()) }).await;
    let down = common::closed_addr().await;

    let c = client();
    c.set_routes(table(&[("svc.internal", &["10.0.0.9"])]));
    let generation = c.routes_generation();

    let routes = c.refresh(&[source(broken), source(down)], Duration::from_secs(5)).await;
    assert_eq!(routes, table(&[("svc.internal", &["10.0.0.9"])]));

    assert!(!c.refresh_and_apply(&[source(broken), source(down)], Duration::from_secs(5)).await);
    assert_eq!(c.routes_generation(), generation);
}

#[tokio::test]
async fn test_timeout_keeps_previous_routes() {
    let slow = common::start_programmable_backend(|| async {
        tokio::time::sleep(Duration::from_secs(3)).await;
        (200, r#"{"svc.internal": []}"#.to_string())
    })
    .await;

    let c = client();
    c.set_routes(table(&[("svc.internal", &["10.0.0.9"])]));

    let started = Instant::now();
    let routes = c.refresh(&[source(slow)], Duration::from_millis(200)).await;
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(routes, table(&[("svc.internal", &["10.0.0.9"])]));
}

#[tokio::test]
async fn test_periodic_updates_and_stop() {
    let doc = Arc::new(Mutex::new(r#"{"svc.internal": ["10.0.0.1"]}"#.to_string()));
    let src = mutable_source(doc.clone()).await;

    let c = client();
    c.start_updating(vec![src], Duration::from_millis(100), Duration::from_secs(1))
        .await;
    assert!(c.is_updating());
    assert_eq!(c.routes(), table(&[("svc.internal", &["10.0.0.1"])]));

    *doc.lock() = r#"{"svc.internal": ["10.0.0.1", "10.0.0.2"]}"#.to_string();
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(c.routes(), table(&[("svc.internal", &["10.0.0.1", "10.0.0.2"])]));

    c.stop_updating();
    c.stop_updating();
    assert!(!c.is_updating());
    tokio::time::sleep(Duration::from_millis(300)).await;

    *doc.lock() = r#"{"other.internal": ["10.0.0.7"]}"#.to_string();
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(c.routes(), table(&[("svc.internal", &["10.0.0.1", "10.0.0.2"])]));
}

#[tokio::test]
async fn test_unchanged_ticks_do_not_install() {
    let doc = Arc::new(Mutex::new(r#"{"svc.internal": ["10.0.0.1", "10.0.0.2"]}"#.to_string()));
    let src = mutable_source(doc.clone()).await;

    let c = client();
    c.start_updating(vec![src], Duration::from_millis(50), Duration::from_secs(1))
        .await;
    let generation = c.routes_generation();
    let changed_at = c.routes_changed_at();

    // Same backends, different order.
    *doc.lock() = r#"{"svc.internal": ["10.0.0.2", "10.0.0.1"]}"#.to_string();
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(c.routes_generation(), generation);
    assert_eq!(c.routes_changed_at(), changed_at);
    c.stop_updating();
}

#[tokio::test]
async fn test_restart_replaces_running_updater() {
    let first = Arc::new(Mutex::new(r#"{"a.internal": ["10.0.0.1"]}"#.to_string()));
    let second = Arc::new(Mutex::new(r#"{"b.internal": ["10.0.0.2"]}"#.to_string()));
    let first_src = mutable_source(first.clone()).await;
    let second_src = mutable_source(second.clone()).await;

    let c = client();
    c.start_updating(vec![first_src], Duration::from_millis(50), Duration::from_secs(1))
        .await;
    c.start_updating(vec![second_src], Duration::from_millis(50), Duration::from_secs(1))
        .await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    // Only the second updater is still running.
    assert_eq!(c.routes(), table(&[("b.internal", &["10.0.0.2"])]));
    c.stop_updating();
}
