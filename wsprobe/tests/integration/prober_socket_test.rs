//! Integration Test: 実ソケットに対するプローブ

use std::sync::Arc;
use std::time::Duration;

use wsprobe::probe::{Prober, WebSocketConnector};
use wsprobe::registry::EndpointRegistry;
use wsprobe::types::ProbeOutcome;

use crate::support::ws::{refused_uri, spawn_silent_server, spawn_ws_server};

fn prober(uris: &[String], timeout: Duration) -> Prober {
    let registry = EndpointRegistry::from_uris(uris).unwrap();
    Prober::new(registry, Arc::new(WebSocketConnector::new())).with_timeout(timeout)
}

#[tokio::test]
async fn test_reachable_server_is_up_with_measured_latency() {
    let server = spawn_ws_server(Duration::from_millis(5)).await;
    let uris = vec![server.uri()];

    let batch = prober(&uris, Duration::from_secs(2)).sweep().await;

    assert_eq!(batch.results.len(), 1);
    let result = &batch.results[0];
    assert_eq!(result.endpoint, server.uri());
    assert!(result.success, "unexpected failure: {:?}", result.reason);
    assert_eq!(result.outcome, ProbeOutcome::Connected);
    assert!(result.latency_ms >= 5.0, "latency {} < 5ms", result.latency_ms);
}

#[tokio::test]
async fn test_closed_port_is_refused() {
    let uris = vec![refused_uri().await];

    let batch = prober(&uris, Duration::from_secs(2)).sweep().await;

    let result = &batch.results[0];
    assert!(!result.success);
    assert_eq!(result.outcome, ProbeOutcome::Refused);
    assert!(result.latency_ms < 2_000.0);
}

#[tokio::test]
async fn test_silent_server_times_out_at_configured_timeout() {
    let server = spawn_silent_server().await;
    let uris = vec![server.uri()];

    let batch = prober(&uris, Duration::from_millis(300)).sweep().await;

    let result = &batch.results[0];
    assert!(!result.success);
    assert_eq!(result.outcome, ProbeOutcome::TimedOut);
    assert!(
        result.latency_ms <= 300.0 && result.latency_ms >= 250.0,
        "latency {} not near timeout",
        result.latency_ms
    );
}

#[tokio::test]
async fn test_mixed_endpoints_keep_registry_order() {
    let up = spawn_ws_server(Duration::ZERO).await;
    let silent = spawn_silent_server().await;
    let refused = refused_uri().await;
    let uris = vec![silent.uri(), refused.clone(), up.uri()];

    let batch = prober(&uris, Duration::from_millis(200))
        .with_parallel(true)
        .sweep()
        .await;

    let endpoints: Vec<&str> = batch.results.iter().map(|r| r.endpoint.as_str()).collect();
    assert_eq!(endpoints, vec![silent.uri().as_str(), refused.as_str(), up.uri().as_str()]);
    assert_eq!(batch.results[0].outcome, ProbeOutcome::TimedOut);
    assert_eq!(batch.results[1].outcome, ProbeOutcome::Refused);
    assert_eq!(batch.results[2].outcome, ProbeOutcome::Connected);
    assert_eq!(batch.up_count(), 1);
}
