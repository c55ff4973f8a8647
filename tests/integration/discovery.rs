use crate::harness::{BackgroundPublisher, publisher_pair, silent_listener};
use chassis_telemetry::discovery::{DiscoveryScanner, InferredSchema, ValueKind};
use chassis_telemetry::registry::PublisherRegistry;
use std::time::{Duration, Instant};
use tempfile::TempDir;

const PROBE_TIMEOUT: Duration = Duration::from_millis(300);

#[test]
fn test_scan_finds_live_publishers_in_port_order() {
    let (first, second) = publisher_pair(4);
    let base = first.local_addr().port();
    let first = BackgroundPublisher::start(first);
    let second = BackgroundPublisher::start(second);
    // Accepts connections but never publishes
    let _silent = silent_listener(base + 2);

    let dir = TempDir::new().unwrap();
    let mut registry = PublisherRegistry::open(dir.path().join("publishers.json")).unwrap();
    registry.add("chassis", base, "127.0.0.1", "").unwrap();

    let scanner = DiscoveryScanner::new("127.0.0.1", base..base + 5, PROBE_TIMEOUT);
    let started = Instant::now();
    let results = scanner.scan(&registry);
    let elapsed = started.elapsed();

    let ports: Vec<u16> = results.iter().map(|r| r.port).collect();
    assert_eq!(ports, [first.port(), second.port()]);
    assert_eq!(results[0].display_name(), "chassis");
    assert_eq!(results[1].display_name(), "-");

    for result in &results {
        let InferredSchema::Fields(fields) = &result.schema else {
            panic!("expected object schema, got {}", result.schema);
        };
        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["e1", "e2", "imu", "timestamp"]);
        assert!(fields.values().all(|k| *k == ValueKind::Number));
    }

    // Five ports at most one budget each, plus scheduling slack
    assert!(
        elapsed < PROBE_TIMEOUT * 5 + Duration::from_secs(1),
        "scan took {:?}",
        elapsed
    );
}

#[test]
fn test_scan_with_nothing_listening() {
    let port = {
        let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let dir = TempDir::new().unwrap();
    let registry = PublisherRegistry::open(dir.path().join("publishers.json")).unwrap();

    let scanner = DiscoveryScanner::new("127.0.0.1", port..port + 1, PROBE_TIMEOUT);
    assert!(scanner.scan(&registry).is_empty());
}

#[test]
fn test_probe_of_silent_port_times_out() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let scanner = DiscoveryScanner::new("127.0.0.1", port..port + 1, PROBE_TIMEOUT);
    let started = Instant::now();
    assert!(scanner.probe(port).unwrap().is_none());
    assert!(started.elapsed() >= PROBE_TIMEOUT - Duration::from_millis(20));
}
