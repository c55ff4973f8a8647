use chassis_telemetry::error::Error;
use chassis_telemetry::frame::TelemetrySample;
use chassis_telemetry::node::SensorNode;
use chassis_telemetry::streaming::{Subscriber, TelemetryPublisher};
use chassis_telemetry::transport::MockTransport;
use serde_json::Value;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

fn keys(message: &Value) -> Vec<&str> {
    message
        .as_object()
        .expect("telemetry message is an object")
        .keys()
        .map(String::as_str)
        .collect()
}

#[test]
fn test_publisher_to_subscriber() {
    let mut publisher = TelemetryPublisher::bind("127.0.0.1:0").unwrap();
    let mut subscriber = Subscriber::connect(publisher.local_addr()).unwrap();

    let samples = [
        TelemetrySample::new(1.0, 2.0, 3.0),
        TelemetrySample::new(-45.5, 0.25, 359.75),
    ];
    let mut sent = Vec::new();
    for sample in &samples {
        sent.push(publisher.publish(sample).unwrap());
    }
    assert_eq!(publisher.subscriber_count(), 1);

    for expected in &sent {
        let message = subscriber.recv_timeout(RECV_TIMEOUT).unwrap().unwrap();
        assert_eq!(keys(&message), ["e1", "e2", "imu", "timestamp"]);
        assert_eq!(message["e1"], expected.e1);
        assert_eq!(message["e2"], expected.e2);
        assert_eq!(message["imu"], expected.imu);
        let timestamp = message["timestamp"].as_f64().unwrap();
        assert!((timestamp - expected.timestamp).abs() < 1e-3);
    }
}

#[test]
fn test_late_subscriber_misses_earlier_messages() {
    let mut publisher = TelemetryPublisher::bind("127.0.0.1:0").unwrap();
    publisher
        .publish(&TelemetrySample::new(1.0, 1.0, 1.0))
        .unwrap();

    let mut subscriber = Subscriber::connect(publisher.local_addr()).unwrap();
    publisher
        .publish(&TelemetrySample::new(2.0, 2.0, 2.0))
        .unwrap();

    let message = subscriber.recv_timeout(RECV_TIMEOUT).unwrap().unwrap();
    assert_eq!(message["e1"], 2.0);
}

#[test]
fn test_non_finite_values_are_null() {
    let mut publisher = TelemetryPublisher::bind("127.0.0.1:0").unwrap();
    let mut subscriber = Subscriber::connect(publisher.local_addr()).unwrap();
    publisher
        .publish(&TelemetrySample::new(f32::NAN, f32::INFINITY, 5.0))
        .unwrap();

    let message = subscriber.recv_timeout(RECV_TIMEOUT).unwrap().unwrap();
    assert!(message["e1"].is_null());
    assert!(message["e2"].is_null());
    assert_eq!(message["imu"], 5.0);
}

#[test]
fn test_sensor_node_streams_mock_frames() {
    let mock = MockTransport::new();
    mock.inject_stale(&[0xAA; 7]);
    let samples = [
        TelemetrySample::new(10.0, 20.0, 30.0),
        TelemetrySample::new(11.0, 21.0, 31.0),
        TelemetrySample::new(12.0, 22.0, 32.0),
    ];
    mock.inject_read(&samples[0].encode());
    // Short read: dropped, the loop carries on
    mock.inject_read(&samples[1].encode()[..6]);
    mock.inject_timeout();
    mock.inject_read(&samples[1].encode());
    mock.inject_read(&samples[2].encode());
    mock.close();

    let publisher = TelemetryPublisher::bind("127.0.0.1:0").unwrap();
    let mut subscriber = Subscriber::connect(publisher.local_addr()).unwrap();

    let mut node = SensorNode::new(mock.clone(), publisher);
    let running = AtomicBool::new(true);
    let err = node.run(&running).unwrap_err();
    assert!(matches!(err, Error::Disconnected));

    let stats = node.stats();
    assert_eq!(stats.frames.decoded, 3);
    assert_eq!(stats.frames.discarded, 1);
    assert_eq!(stats.published, 3);
    assert_eq!(mock.clear_count(), 1);

    for sample in &samples {
        let message = subscriber.recv_timeout(RECV_TIMEOUT).unwrap().unwrap();
        assert_eq!(message["e1"], f64::from(sample.e1_deg));
        assert_eq!(message["e2"], f64::from(sample.e2_deg));
        assert_eq!(message["imu"], f64::from(sample.imu_heading_deg));
    }

    // Dropping the node closes the publisher
    drop(node);
    let err = subscriber.recv_timeout(RECV_TIMEOUT).unwrap_err();
    assert!(err.is_disconnect());
}
