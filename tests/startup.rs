//! Integration tests for the startup pipeline.

use std::time::Duration;

use backbone::events::{self, topic, EventBus};
use backbone::lifecycle::App;

mod common;

#[tokio::test]
async fn test_start_listening_fires_once_with_wellformed_url() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe();

    let running = App::new(common::test_args(&[]))
        .with_event_bus(bus)
        .start()
        .await
        .unwrap();

    let event = events::next_named(&mut rx, topic::START_LISTENING)
        .await
        .unwrap();
    let url = event.payload["url"].as_str().unwrap();
    assert_eq!(url, running.url());
    assert!(url.starts_with("http://127.0.0.1:"));
    let port: u16 = url.rsplit(':').next().unwrap().parse().unwrap();
    assert_eq!(port, running.local_addr().port());

    // Exactly once: nothing further arrives.
    let second = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(second.is_err());

    running.shutdown().await;
}

#[tokio::test]
async fn test_stage_failure_short_circuits_later_stages() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe();
    let store = common::RecordingStore::failing();

    let err = App::new(common::test_args(&[]))
        .with_event_bus(bus)
        .with_storage(store.clone())
        .start()
        .await
        .unwrap_err();

    assert!(err.to_string().contains("storage stage failed"));

    // Model registration never ran, and no listening event was published.
    assert!(store.collections.lock().unwrap().is_empty());
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_models_registered_against_connected_store() {
    let store = common::RecordingStore::new();

    let running = App::new(common::test_args(&[]))
        .with_storage(store.clone())
        .start()
        .await
        .unwrap();

    assert_eq!(store.connects.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert!(!store.collections.lock().unwrap().is_empty());

    running.shutdown().await;
}

#[tokio::test]
async fn test_bind_conflict_is_fatal_and_silent() {
    let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = occupied.local_addr().unwrap().port();

    let bus = EventBus::new();
    let mut rx = bus.subscribe();

    let err = App::new(common::test_args(&["--port", &port.to_string()]))
        .with_event_bus(bus)
        .start()
        .await
        .unwrap_err();

    assert!(err.to_string().contains("address already in use"));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_addon_routes_served_and_error_route_last() {
    let running = App::new(common::test_args(&[])).start().await.unwrap();
    let base = running.url();
    let client = reqwest::Client::new();

    // Core route.
    let status: serde_json::Value = client
        .get(format!("{}/api/v0/status", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["status"], "ok");
    assert_eq!(status["storage"]["connected"], true);

    // Addon route, not shadowed by the fallback.
    let console = client
        .get(format!("{}/console", base))
        .send()
        .await
        .unwrap();
    assert_eq!(console.status(), 200);
    assert!(console.text().await.unwrap().contains("backbone"));

    // Unknown path hits the catch-all error route.
    let missing = client.get(format!("{}/no/such/route", base)).send().await.unwrap();
    assert_eq!(missing.status(), 404);
    let body: serde_json::Value = missing.json().await.unwrap();
    assert_eq!(body["error"], "not found");

    running.shutdown().await;
}
