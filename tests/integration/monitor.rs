use crate::harness::{BackgroundPublisher, wait_until};
use chassis_telemetry::monitor::{Endpoint, StreamMonitor, Target, resolve_target};
use chassis_telemetry::registry::PublisherRegistry;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn endpoint(port: u16) -> Endpoint {
    Endpoint {
        host: "127.0.0.1".to_string(),
        port,
    }
}

#[test]
fn test_poll_prints_received_messages() {
    let publisher = BackgroundPublisher::spawn();
    let mut monitor = StreamMonitor::connect(endpoint(publisher.port())).unwrap();

    let mut out = Vec::new();
    let got = wait_until(Duration::from_secs(2), || {
        monitor.poll(&mut out).unwrap()
    });
    assert!(got);
    assert_eq!(monitor.received(), 1);

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with('[') && lines[0].ends_with(']'), "{}", lines[0]);
    assert!(lines[1].starts_with("  e1: "));
    assert!(lines[2].starts_with("  e2: "));
    assert_eq!(lines[3], "  imu: 90.0000");
    assert!(lines[4].starts_with("  timestamp: "));
    assert_eq!(lines[5], "");
}

#[test]
fn test_run_stops_when_flag_cleared() {
    let publisher = BackgroundPublisher::spawn();
    let mut monitor = StreamMonitor::connect(endpoint(publisher.port())).unwrap();

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        r.store(false, Ordering::Relaxed);
    });

    let mut out = Vec::new();
    let received = monitor.run(&mut out, &running).unwrap();
    stopper.join().unwrap();

    assert!(received > 0);
    assert_eq!(received, monitor.received());
}

#[test]
fn test_run_reports_publisher_going_away() {
    let publisher = BackgroundPublisher::spawn();
    let mut monitor = StreamMonitor::connect(endpoint(publisher.port())).unwrap();
    let mut out = Vec::new();
    assert!(wait_until(Duration::from_secs(2), || monitor
        .poll(&mut out)
        .unwrap()));

    publisher.stop();

    let running = AtomicBool::new(true);
    let err = monitor.run(&mut out, &running).unwrap_err();
    assert!(err.is_disconnect(), "{}", err);
}

#[test]
fn test_monitor_by_registered_name() {
    let publisher = BackgroundPublisher::spawn();
    let dir = TempDir::new().unwrap();
    let mut registry = PublisherRegistry::open(dir.path().join("publishers.json")).unwrap();
    registry
        .add("chassis", publisher.port(), "127.0.0.1", "loopback")
        .unwrap();

    let target = Target::parse("chassis").unwrap();
    let resolved = resolve_target(&target, "localhost", &registry).unwrap();
    assert_eq!(resolved, endpoint(publisher.port()));

    let mut monitor = StreamMonitor::connect(resolved).unwrap();
    let mut out = Vec::new();
    assert!(wait_until(Duration::from_secs(2), || monitor
        .poll(&mut out)
        .unwrap()));
}
