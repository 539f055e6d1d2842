//! Integration tests for the storage adapter

use bytes::Bytes;
use ferry_core::{AdapterConfig, Error, MemoryTransfer, SessionEvent, StorageAdapter, TransferError};
use ferry_testing::assertions::{
    assert_events, assert_no_operations, assert_not_found, assert_operations,
    assert_transfer_error,
};
use ferry_testing::fixtures::{adapter_options, debug_config, payloads, scoped_options};
use ferry_testing::{init_test_logging, Call, RecordingSink, ScriptedTransfer};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_pending, assert_ready_ok};

fn adapter(client: &ScriptedTransfer) -> StorageAdapter {
    StorageAdapter::new(scoped_options(80), Arc::new(client.clone())).unwrap()
}

#[tokio::test]
async fn test_round_trip() {
    init_test_logging();
    let client = ScriptedTransfer::with_inner(MemoryTransfer::new().with_chunk_size(4096), true);
    let adapter = adapter(&client);

    for (name, data) in payloads() {
        adapter.create_file(name, data.clone()).await.unwrap();
        let read = adapter.get_file_data(name).await.unwrap();
        assert_eq!(read, Bytes::from(data), "round trip mismatch for {}", name);
    }
}

#[tokio::test]
async fn test_text_payload_stored_as_utf8() {
    let client = ScriptedTransfer::new();
    let adapter = adapter(&client);

    adapter.create_file("greeting.txt", String::from("héllo")).await.unwrap();

    assert_eq!(
        client.store().file("/uploads/greeting.txt").unwrap(),
        Bytes::from("héllo".as_bytes().to_vec())
    );
}

#[tokio::test]
async fn test_operations_wait_for_readiness() {
    let client = ScriptedTransfer::held();
    let adapter = Arc::new(adapter(&client));

    let pending = {
        let adapter = adapter.clone();
        tokio::spawn(async move { adapter.create_file("early.txt", "early").await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!pending.is_finished());
    assert_eq!(client.calls(), vec![Call::Connect]);
    assert_no_operations(&client);

    client.release();
    pending.await.unwrap().unwrap();
    assert_operations(&client, &[Call::Put("/uploads/early.txt".to_string())]);
}

#[tokio::test]
async fn test_connection_started_by_construction() {
    let client = ScriptedTransfer::new();
    let adapter = adapter(&client);

    adapter.wait_ready().await.unwrap();
    assert_eq!(client.calls(), vec![Call::Connect]);
    assert!(client.store().is_connected());
}

#[tokio::test]
async fn test_pending_read_resumes_once_ready() {
    let client = ScriptedTransfer::held();
    client.store().insert("/uploads/queued.txt", "queued");
    let adapter = adapter(&client);

    let mut read = tokio_test::task::spawn(adapter.get_file_data("queued.txt"));
    assert_pending!(read.poll());

    client.release();
    adapter.wait_ready().await.unwrap();

    let data = assert_ready_ok!(read.poll());
    assert_eq!(data, Bytes::from_static(b"queued"));
}

#[tokio::test]
async fn test_unreachable_server_hangs_without_timeout() {
    let client = ScriptedTransfer::refusing();
    let adapter = adapter(&client);

    let mut write = tokio_test::task::spawn(adapter.create_file("a.txt", "a"));
    assert_pending!(write.poll());

    let waited = tokio::time::timeout(Duration::from_millis(100), adapter.delete_file("a.txt")).await;
    assert!(waited.is_err());
    assert_pending!(write.poll());
    assert_no_operations(&client);
}

#[tokio::test]
async fn test_unreachable_server_times_out_when_bounded() {
    let client = ScriptedTransfer::refusing();
    let mut options = scoped_options(80);
    options.connect_timeout_ms = Some(50);
    let adapter = StorageAdapter::new(options, Arc::new(client.clone())).unwrap();

    let err = adapter.get_file_data("a.txt").await.unwrap_err();
    assert!(matches!(err, Error::ConnectionTimeout(_)));
    assert_no_operations(&client);
}

#[tokio::test]
async fn test_location_is_connection_independent() {
    let client = ScriptedTransfer::held();
    let adapter = adapter(&client);

    let before = adapter.get_file_location("a b.txt");
    assert_eq!(before, "http://example.com/files/a%20b.txt");
    assert_eq!(adapter.get_file_location("a b.txt"), before);

    client.release();
    adapter.wait_ready().await.unwrap();
    assert_eq!(adapter.get_file_location("a b.txt"), before);
    assert_no_operations(&client);
}

#[test]
fn test_location_with_custom_port() {
    let adapter = StorageAdapter::new(scoped_options(8080), Arc::new(MemoryTransfer::new())).unwrap();
    let location = adapter.get_file_location("a b.txt");

    assert_eq!(location, "http://example.com:8080/files/a%20b.txt");
    assert!(location.contains(":8080"));
}

#[test]
fn test_missing_ftp_host_fails_construction() {
    let client = ScriptedTransfer::new();
    let mut options = adapter_options();
    options.ftp.host = None;

    let err = StorageAdapter::new(options, Arc::new(client.clone())).unwrap_err();
    assert!(matches!(err, Error::MissingOption { key: "ftp.host" }));
    assert!(err.to_string().contains("ftp.host"));
    assert!(client.calls().is_empty());
}

#[test]
fn test_missing_http_host_fails_construction() {
    let mut options = adapter_options();
    options.http.host = None;

    let err = StorageAdapter::new(options, Arc::new(MemoryTransfer::new())).unwrap_err();
    assert!(err.to_string().contains("http.host"));
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let client = ScriptedTransfer::new();
    let adapter = adapter(&client);

    assert_not_found(adapter.get_file_data("nope.txt").await);
    assert_operations(&client, &[Call::Get("/uploads/nope.txt".to_string())]);
}

#[tokio::test]
async fn test_stream_error_discards_partial_data() {
    let client = ScriptedTransfer::with_inner(MemoryTransfer::new().with_chunk_size(8), true);
    let adapter = adapter(&client);
    adapter.create_file("big.bin", vec![7u8; 64]).await.unwrap();

    client.fail_stream_after(3);
    let result = adapter.get_file_data("big.bin").await;

    assert!(
        matches!(result, Err(Error::Transfer(TransferError::Stream(_)))),
        "expected stream error, got {:?}",
        result
    );
    assert_transfer_error(result);
    assert_operations(&client, &[
        Call::Put("/uploads/big.bin".to_string()),
        Call::Get("/uploads/big.bin".to_string()),
    ]);
}

#[tokio::test]
async fn test_concurrent_writes_last_one_wins() {
    let client = ScriptedTransfer::new();
    client.delay_puts(Duration::from_millis(10));
    let adapter = adapter(&client);

    let (first, second) = tokio::join!(
        adapter.create_file("same.txt", "first payload"),
        adapter.create_file("same.txt", "second payload"),
    );
    first.unwrap();
    second.unwrap();

    let stored = adapter.get_file_data("same.txt").await.unwrap();
    assert!(
        stored == Bytes::from_static(b"first payload")
            || stored == Bytes::from_static(b"second payload"),
        "unexpected content: {:?}",
        stored
    );
}

#[tokio::test]
async fn test_delete_then_read_is_not_found() {
    let client = ScriptedTransfer::new();
    let adapter = adapter(&client);

    adapter.create_file("gone.txt", "bye").await.unwrap();
    adapter.delete_file("gone.txt").await.unwrap();

    assert_not_found(adapter.get_file_data("gone.txt").await);
    assert_operations(&client, &[
        Call::Put("/uploads/gone.txt".to_string()),
        Call::Delete("/uploads/gone.txt".to_string()),
        Call::Get("/uploads/gone.txt".to_string()),
    ]);
}

#[tokio::test]
async fn test_delete_missing_file_fails() {
    let client = ScriptedTransfer::new();
    let adapter = adapter(&client);

    assert_not_found(adapter.delete_file("never-created.txt").await);
}

#[tokio::test]
async fn test_diagnostics_enabled() {
    let client = ScriptedTransfer::new();
    let sink = RecordingSink::new();
    let adapter = StorageAdapter::with_sink(debug_config(), Arc::new(client.clone()), sink.clone());

    adapter.wait_ready().await.unwrap();
    adapter.close().await.unwrap();

    assert_events(&sink, &[
        SessionEvent::Greeting("220 ferry in-memory transfer ready".to_string()),
        SessionEvent::End,
        SessionEvent::Close { had_error: false },
    ]);
    assert_operations(&client, &[Call::End]);
}

#[tokio::test]
async fn test_diagnostics_disabled() {
    let client = ScriptedTransfer::new();
    let sink = RecordingSink::new();
    let config = AdapterConfig::from_options(scoped_options(80)).unwrap();
    let adapter = StorageAdapter::with_sink(config, Arc::new(client), sink.clone());

    adapter.wait_ready().await.unwrap();
    adapter.create_file("quiet.txt", "shh").await.unwrap();
    adapter.close().await.unwrap();

    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn test_connect_failure_reported_to_diagnostics() {
    let client = ScriptedTransfer::refusing();
    let sink = RecordingSink::new();
    let mut config = debug_config();
    config.connect_timeout_ms = Some(200);
    let adapter = StorageAdapter::with_sink(config, Arc::new(client), sink.clone());

    assert!(matches!(adapter.wait_ready().await, Err(Error::ConnectionTimeout(_))));
    assert_events(&sink, &[SessionEvent::Error(
        "Connection error: connection to ftp.example.com:21 refused".to_string(),
    )]);
}

#[tokio::test]
async fn test_close_before_ready_abandons_connect() {
    let client = ScriptedTransfer::held();
    let sink = RecordingSink::new();
    let adapter = StorageAdapter::with_sink(debug_config(), Arc::new(client.clone()), sink.clone());

    adapter.close().await.unwrap();
    client.release();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(!client.store().is_connected());
    assert_events(&sink, &[SessionEvent::Close { had_error: false }]);
}

#[tokio::test]
async fn test_close_after_failed_connect_reports_error() {
    let client = ScriptedTransfer::refusing();
    let sink = RecordingSink::new();
    let mut config = debug_config();
    config.connect_timeout_ms = Some(100);
    let adapter = StorageAdapter::with_sink(config, Arc::new(client.clone()), sink.clone());

    assert!(adapter.wait_ready().await.is_err());
    adapter.close().await.unwrap();

    assert_events(&sink, &[
        SessionEvent::Error("Connection error: connection to ftp.example.com:21 refused".to_string()),
        SessionEvent::Close { had_error: true },
    ]);
    assert_no_operations(&client);
}
