//! Integration Test: HTTP経由のメトリクス公開

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use wsprobe::bootstrap::initialize;
use wsprobe::config::ProbeConfig;
use wsprobe::metrics::CollectMode;
use wsprobe::probe::WebSocketConnector;

use crate::support::http::spawn_exporter;
use crate::support::ws::{refused_uri, spawn_ws_server};

fn config(endpoints: Vec<String>, mode: CollectMode) -> ProbeConfig {
    ProbeConfig {
        endpoints,
        interval: Duration::from_secs(60),
        timeout: Duration::from_secs(2),
        parallel: false,
        mode,
    }
}

fn sample(body: &str, series: &str) -> Option<f64> {
    body.lines()
        .find(|line| line.starts_with(series))
        .and_then(|line| line.rsplit_once(' '))
        .and_then(|(_, value)| value.parse().ok())
}

#[tokio::test]
async fn test_cached_exporter_serves_latest_sweep() {
    let up = spawn_ws_server(Duration::from_millis(5)).await;
    let down = refused_uri().await;
    let cancel = CancellationToken::new();
    let ctx = initialize(
        &config(vec![up.uri(), down.clone()], CollectMode::Cached),
        Arc::new(WebSocketConnector::new()),
        cancel.clone(),
    )
    .unwrap();

    // 初回スイープの完了を待つ
    let bridge = ctx.state.bridge.clone();
    tokio::time::timeout(Duration::from_secs(5), async {
        while bridge.snapshot().cycle == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("first sweep did not complete");

    let server = spawn_exporter(ctx.state).await;
    let response = reqwest::get(server.url("/metrics")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"));

    let body = response.text().await.unwrap();
    let up_label = format!("{{endpoint=\"{}\"}}", up.uri());
    let down_label = format!("{{endpoint=\"{}\"}}", down);
    assert_eq!(sample(&body, &format!("websocket_probe_success{up_label}")), Some(1.0));
    assert_eq!(sample(&body, &format!("websocket_probe_success{down_label}")), Some(0.0));
    assert!(sample(&body, &format!("websocket_probe_latency{up_label}")).unwrap() >= 5.0);
    assert!(sample(&body, &format!("websocket_probe_latency{down_label}")).is_some());

    cancel.cancel();
    server.stop().await.unwrap();
    ctx.scheduler.unwrap().await.unwrap();
}

#[tokio::test]
async fn test_sync_exporter_probes_on_each_scrape() {
    let up = spawn_ws_server(Duration::ZERO).await;
    let ctx = initialize(
        &config(vec![up.uri()], CollectMode::Synchronous),
        Arc::new(WebSocketConnector::new()),
        CancellationToken::new(),
    )
    .unwrap();
    let bridge = ctx.state.bridge.clone();
    let server = spawn_exporter(ctx.state).await;

    for expected_cycle in 1..=2u64 {
        let body = reqwest::get(server.url("/metrics"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(
            sample(&body, "websocket_probe_cycle"),
            Some(expected_cycle as f64)
        );
    }
    assert_eq!(bridge.snapshot().cycle, 2);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_probes_api_in_sync_mode_replaces_pending_batch() {
    let ctx = initialize(
        &config(vec![refused_uri().await], CollectMode::Synchronous),
        Arc::new(WebSocketConnector::new()),
        CancellationToken::new(),
    )
    .unwrap();
    // スクレイプ前はプレースホルダのまま
    let snapshot = ctx.state.bridge.snapshot();
    assert_eq!(snapshot.cycle, 0);
    assert_eq!(snapshot.up_count(), 0);

    let server = spawn_exporter(ctx.state).await;
    let json: serde_json::Value = reqwest::get(server.url("/api/probes"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["mode"], "sync");
    assert_eq!(json["cycle"], 1);
    assert_eq!(json["results"][0]["outcome"], "refused");

    server.stop().await.unwrap();
}
