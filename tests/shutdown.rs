//! Integration tests for the graceful shutdown cascade.

use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use tokio_tungstenite::tungstenite::Message;

use backbone::lifecycle::App;

mod common;

#[tokio::test]
async fn test_shutdown_notifies_messaging_clients_then_closes() {
    let store = common::RecordingStore::new();
    let running = App::new(common::test_args(&[]))
        .with_storage(store.clone())
        .start()
        .await
        .unwrap();

    let ws_url = format!("ws://{}/socket", running.local_addr());
    let (mut ws, _) = tokio_tungstenite::connect_async(ws_url).await.unwrap();

    // The session registers on the server side shortly after the handshake;
    // wait for it so the exit broadcast has a recipient.
    let hub = running.hub();
    while hub.session_count() == 0 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let code = running.shutdown().await;
    assert_eq!(code, 0);

    // The client saw the exit broadcast, then a close frame.
    let frame = ws.next().await.unwrap().unwrap();
    let text = frame.into_text().unwrap();
    let body: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
    assert_eq!(body["event"], "exit");

    let next = ws.next().await.unwrap().unwrap();
    assert!(matches!(next, Message::Close(_)));

    assert_eq!(store.disconnects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_second_shutdown_is_a_noop() {
    let store = common::RecordingStore::new();
    let running = App::new(common::test_args(&[]))
        .with_storage(store.clone())
        .start()
        .await
        .unwrap();

    assert_eq!(running.shutdown().await, 0);
    assert_eq!(running.shutdown().await, 0);

    // Storage disconnect happened exactly once.
    assert_eq!(store.disconnects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_triggers_run_cascade_once() {
    let store = common::RecordingStore::new();
    let running = App::new(common::test_args(&[]))
        .with_storage(store.clone())
        .start()
        .await
        .unwrap();

    let (a, b) = tokio::join!(running.shutdown(), running.shutdown());
    assert_eq!((a, b), (0, 0));
    assert_eq!(store.disconnects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_messaging_timeout_does_not_block_remaining_steps() {
    let config_path = common::write_config(
        "messaging-timeout",
        "[shutdown]\nmessaging_close_ms = 100\nserver_close_ms = 1000\n",
    );
    let store = common::RecordingStore::new();
    let running = App::new(common::test_args(&[
        "--config",
        config_path.to_str().unwrap(),
    ]))
    .with_storage(store.clone())
    .start()
    .await
    .unwrap();
    let base = running.url();

    // A session that never acknowledges the close directive keeps the hub
    // from draining; the messaging step must hit its bound.
    let hub = running.hub();
    let stuck = hub.register().unwrap();

    let started = Instant::now();
    let code = running.shutdown().await;
    let elapsed = started.elapsed();

    assert_eq!(code, 0);
    // Well inside the sum of the step bounds.
    assert!(
        elapsed < Duration::from_millis(1500),
        "shutdown took {:?}",
        elapsed
    );
    // Past the messaging bound, so the step actually timed out.
    assert!(elapsed >= Duration::from_millis(100));

    // Later steps still ran: server no longer accepts, storage disconnected.
    let refused = reqwest::Client::new()
        .get(format!("{}/api/v0/status", base))
        .timeout(Duration::from_millis(500))
        .send()
        .await;
    assert!(refused.is_err());
    assert_eq!(store.disconnects.load(Ordering::SeqCst), 1);

    drop(stuck);
    std::fs::remove_file(config_path).ok();
}
