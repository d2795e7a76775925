//! Integration tests for zenoh-bridge-solar: the forwarding loop end to end
//! against an in-memory publisher.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use solarbus_bridge_framework::{BridgeError, Publish};
use solarbus_common::Format;
use tokio::io::BufReader;
use tokio_test::io::Builder;
use zenoh_bridge_solar::{
    ForwardError, LineSource, ModuleAddress, Reading, StopReason, StreamForwarder, decode,
};

/// Records every publish; optionally fails on the n-th call (1-based).
#[derive(Default)]
struct MockPublisher {
    messages: Mutex<Vec<(String, Vec<u8>)>>,
    attempts: AtomicUsize,
    fail_on: Option<usize>,
}

impl MockPublisher {
    fn failing_on(attempt: usize) -> Self {
        Self {
            fail_on: Some(attempt),
            ..Default::default()
        }
    }

    fn keys(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn readings(&self) -> Vec<Reading> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|(_, p)| serde_json::from_slice(p).expect("payload is JSON"))
            .collect()
    }
}

impl Publish for MockPublisher {
    async fn publish(&self, key: &str, payload: Vec<u8>) -> solarbus_bridge_framework::Result<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on == Some(attempt) {
            return Err(BridgeError::publish(key, "session closed"));
        }
        self.messages.lock().unwrap().push((key.to_string(), payload));
        Ok(())
    }
}

fn forwarder(publisher: &MockPublisher) -> StreamForwarder<&MockPublisher> {
    StreamForwarder::new(publisher, "solar/modules", Format::Json)
}

#[tokio::test]
async fn test_scenario_hex_address() {
    let publisher = MockPublisher::default();
    let stats = forwarder(&publisher)
        .run(LineSource::new(&b"1A 00120,0345,0210\n"[..]))
        .await
        .unwrap();

    assert_eq!(stats.published, 1);
    assert_eq!(publisher.keys(), vec!["solar/modules/26"]);

    let messages = publisher.messages.lock().unwrap();
    assert_eq!(
        std::str::from_utf8(&messages[0].1).unwrap(),
        r#"{"count": 120, "voltage": 34.5, "temperature": 21.0}"#
    );
}

#[tokio::test]
async fn test_scenario_two_subfields_not_published() {
    let publisher = MockPublisher::default();
    let stats = forwarder(&publisher)
        .run(LineSource::new(&b"2: 5,100\n"[..]))
        .await
        .unwrap();

    assert_eq!(stats.published, 0);
    assert_eq!(stats.malformed_reading, 1);
    assert_eq!(publisher.attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_end_of_file_is_done() {
    let publisher = MockPublisher::default();
    let stats = forwarder(&publisher)
        .run(LineSource::new(&b""[..]))
        .await
        .unwrap();

    assert_eq!(stats.stop_reason, StopReason::EndOfStream);
    assert_eq!(stats.lines_read, 0);
}

#[tokio::test]
async fn test_isolation_and_order() {
    let valid = [
        "0x01: 1,100,200\n",
        "2: 2,110,210\n",
        "3A 3,120,220\n",
        "4: noise 4,130,230\n",
    ];
    let malformed = ["\n", "2: 5,100\n", "x: 1,2,3\n", "5: a,b,c\n", ": 1,2,3\n"];

    // Interleave: M, V, M, M, V, V, M, V, M
    let input = [
        malformed[0], valid[0], malformed[1], malformed[2], valid[1], valid[2], malformed[3],
        valid[3], malformed[4],
    ]
    .concat();

    let publisher = MockPublisher::default();
    let stats = forwarder(&publisher)
        .run(LineSource::new(input.as_bytes()))
        .await
        .unwrap();

    assert_eq!(stats.lines_read, 9);
    assert_eq!(stats.published, 4);
    assert_eq!(stats.skipped(), 5);
    assert_eq!(
        publisher.keys(),
        vec![
            "solar/modules/1",
            "solar/modules/2",
            "solar/modules/58",
            "solar/modules/4"
        ]
    );

    let counts: Vec<i64> = publisher.readings().iter().map(|r| r.count).collect();
    assert_eq!(counts, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_same_module_published_in_order() {
    let input = "9: 1,1,1\n9: 2,2,2\n9: 3,3,3\n";
    let publisher = MockPublisher::default();
    forwarder(&publisher)
        .run(LineSource::new(input.as_bytes()))
        .await
        .unwrap();

    let readings = publisher.readings();
    let counts: Vec<i64> = readings.iter().map(|r| r.count).collect();
    assert_eq!(counts, vec![1, 2, 3]);
    assert_eq!(readings[2].voltage, 0.3);
}

#[tokio::test]
async fn test_publish_failure_is_fatal() {
    let input = "1: 1,1,1\n2: 2,2,2\n3: 3,3,3\n";
    let publisher = MockPublisher::failing_on(2);

    let result = forwarder(&publisher)
        .run(LineSource::new(input.as_bytes()))
        .await;

    match result {
        Err(ForwardError::Publish(BridgeError::Publish { key, .. })) => {
            assert_eq!(key, "solar/modules/2");
        }
        other => panic!("expected publish error, got {:?}", other),
    }

    // The third line was never attempted.
    assert_eq!(publisher.attempts.load(Ordering::SeqCst), 2);
    assert_eq!(publisher.keys(), vec!["solar/modules/1"]);
}

#[tokio::test]
async fn test_read_error_is_fatal() {
    let mock = Builder::new()
        .read(b"1: 1,1,1\n")
        .read_error(std::io::Error::other("device unplugged"))
        .build();
    let publisher = MockPublisher::default();

    let result = forwarder(&publisher)
        .run(LineSource::new(BufReader::new(mock)))
        .await;

    assert!(matches!(result, Err(ForwardError::Source(_))));
    assert_eq!(publisher.keys(), vec!["solar/modules/1"]);
}

#[tokio::test]
async fn test_shutdown_while_waiting_for_input() {
    // The mock blocks for a long time before delivering the second line.
    let mock = Builder::new()
        .read(b"1: 1,1,1\n")
        .wait(Duration::from_secs(3600))
        .build();
    let publisher = MockPublisher::default();

    let stats = forwarder(&publisher)
        .run_until(
            LineSource::new(BufReader::new(mock)),
            tokio::time::sleep(Duration::from_millis(50)),
        )
        .await
        .unwrap();

    assert_eq!(stats.stop_reason, StopReason::Shutdown);
    assert_eq!(stats.published, 1);
}

#[test]
fn test_truncation_idempotence_on_prefixed_lines() {
    let payload = format!("0x1A:{} 00120,0345,0210\n", " ".repeat(115));
    let prefixed = format!("[2024-06-01 12:00:00.000] {}", payload);

    assert_eq!(decode(&prefixed), decode(&payload));
    assert_eq!(decode(&payload).unwrap().0, ModuleAddress(26));
}

#[tokio::test]
async fn test_forward_from_file() {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let path = std::env::temp_dir().join(format!("solar_stream_{}.log", nanos));
    std::fs::write(&path, "7: 10,2305,412\nbroken line\n8: 11,2299,409").unwrap();

    let publisher = MockPublisher::default();
    let source = LineSource::open(&path).await.expect("file should open");
    let stats = forwarder(&publisher).run(source).await.unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(stats.lines_read, 3);
    assert_eq!(publisher.keys(), vec!["solar/modules/7", "solar/modules/8"]);

    let readings = publisher.readings();
    assert!((readings[0].voltage - 230.5).abs() < 1e-9);
    assert!((readings[1].temperature - 40.9).abs() < 1e-9);
}

#[cfg(unix)]
#[test]
fn test_shutdown_on_idle_fifo_releases_runtime() {
    use std::io::Write;
    use std::time::{SystemTime, UNIX_EPOCH};

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let path = std::env::temp_dir().join(format!("solar_fifo_{}", nanos));
    let status = std::process::Command::new("mkfifo")
        .arg(&path)
        .status()
        .expect("mkfifo should run");
    assert!(status.success());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();

    let publisher = MockPublisher::default();
    let (stats, writer) = runtime.block_on(async {
        let source = LineSource::open(&path).await.expect("fifo should open");

        // The reader is open, so this does not block. The writer then stays idle.
        let mut writer = std::fs::OpenOptions::new()
            .write(true)
            .open(&path)
            .unwrap();
        writer.write_all(b"4: 9,2300,250\n").unwrap();

        let stats = forwarder(&publisher)
            .run_until(source, tokio::time::sleep(Duration::from_millis(200)))
            .await
            .unwrap();
        (stats, writer)
    });

    assert_eq!(stats.stop_reason, StopReason::Shutdown);
    assert_eq!(publisher.keys(), vec!["solar/modules/4"]);

    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        drop(runtime);
        let _ = tx.send(());
    });
    rx.recv_timeout(Duration::from_secs(5))
        .expect("runtime should shut down while the FIFO writer is idle");

    drop(writer);
    std::fs::remove_file(&path).ok();
}

#[tokio::test]
async fn test_extreme_values_use_exponent_notation() {
    let publisher = MockPublisher::default();
    forwarder(&publisher)
        .run(LineSource::new(&b"1: 1,100000000000000000,0.0001\n"[..]))
        .await
        .unwrap();

    let messages = publisher.messages.lock().unwrap();
    assert_eq!(
        std::str::from_utf8(&messages[0].1).unwrap(),
        r#"{"count": 1, "voltage": 1e+16, "temperature": 1e-05}"#
    );
}
