//! Property-based tests using proptest

use prometheus::TextEncoder;
use proptest::prelude::*;
use std::time::Duration;

use wsprobe::metrics::collector::{families_for, round_latency};
use wsprobe::registry::EndpointRegistry;
use wsprobe::types::{Endpoint, ProbeBatch, ProbeOutcome, ProbeResult};

fn endpoints(ids: &[u16]) -> Vec<Endpoint> {
    ids.iter()
        .map(|id| Endpoint::parse(&format!("ws://127.0.0.1:{}/p{}", 1000 + id, id)).unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// round_latency
// ---------------------------------------------------------------------------

proptest! {
    /// 丸めは0.005ms以内の誤差
    #[test]
    fn round_latency_is_close(ms in 0.0f64..1_000_000.0) {
        prop_assert!((round_latency(ms) - ms).abs() <= 0.005 + 1e-6);
    }

    /// 非負の入力は非負のまま
    #[test]
    fn round_latency_is_non_negative(ms in 0.0f64..1_000_000.0) {
        prop_assert!(round_latency(ms) >= 0.0);
    }

    /// 丸めは冪等
    #[test]
    fn round_latency_is_idempotent(ms in 0.0f64..100_000.0) {
        let once = round_latency(ms);
        prop_assert!((round_latency(once) - once).abs() < 1e-9);
    }
}

// ---------------------------------------------------------------------------
// ProbeResult / ProbeBatch
// ---------------------------------------------------------------------------

proptest! {
    /// 経過時間からのレイテンシ換算は非負かつミリ秒単位
    #[test]
    fn result_latency_matches_elapsed(micros in 0u64..60_000_000) {
        let endpoint = Endpoint::parse("ws://localhost:8080").unwrap();
        let result = ProbeResult::connected(&endpoint, Duration::from_micros(micros));
        prop_assert!(result.latency_ms >= 0.0);
        prop_assert!((result.latency_ms - micros as f64 / 1_000.0).abs() < 1e-6);
    }

    /// 失敗結果は常にsuccess=false
    #[test]
    fn failed_result_is_never_success(micros in 0u64..10_000_000, refused in any::<bool>()) {
        let endpoint = Endpoint::parse("wss://example.com/feed").unwrap();
        let outcome = if refused { ProbeOutcome::Refused } else { ProbeOutcome::TimedOut };
        let result = ProbeResult::failed(&endpoint, outcome, Duration::from_micros(micros), "x");
        prop_assert!(!result.success);
        prop_assert_eq!(result.outcome, outcome);
    }

    /// プレースホルダバッチはレジストリ順に1エンドポイント1結果
    #[test]
    fn pending_batch_covers_registry_in_order(
        ids in prop::collection::hash_set(0u16..500, 1..20),
    ) {
        let ids: Vec<u16> = ids.into_iter().collect();
        let list = endpoints(&ids);
        let uris: Vec<&str> = list.iter().map(Endpoint::address).collect();
        let registry = EndpointRegistry::from_uris(&uris).unwrap();

        let batch = ProbeBatch::pending(registry.list());
        prop_assert_eq!(batch.results.len(), registry.len());
        prop_assert_eq!(batch.up_count(), 0);
        for (result, uri) in batch.results.iter().zip(&uris) {
            prop_assert_eq!(&result.endpoint, uri);
            prop_assert_eq!(result.outcome, ProbeOutcome::Pending);
        }
    }

    /// 重複を含む一覧は拒否される
    #[test]
    fn duplicate_uris_are_rejected(ids in prop::collection::vec(0u16..500, 1..10)) {
        let list = endpoints(&ids);
        let mut uris: Vec<&str> = list.iter().map(Endpoint::address).collect();
        uris.push(uris[0]);
        prop_assert!(EndpointRegistry::from_uris(&uris).is_err());
    }

    /// エンドポイントごとに成否とレイテンシの2系列が出る
    #[test]
    fn families_have_one_series_per_endpoint(
        ids in prop::collection::hash_set(0u16..500, 1..20),
        up_mask in any::<u32>(),
    ) {
        let ids: Vec<u16> = ids.into_iter().collect();
        let list = endpoints(&ids);
        let mut batch = ProbeBatch::pending(&list);
        batch.cycle = 1;
        batch.results = list
            .iter()
            .enumerate()
            .map(|(i, endpoint)| {
                if up_mask & (1 << i) != 0 {
                    ProbeResult::connected(endpoint, Duration::from_millis(i as u64))
                } else {
                    ProbeResult::failed(endpoint, ProbeOutcome::Refused, Duration::ZERO, "refused")
                }
            })
            .collect();

        let families = families_for(&batch).unwrap();
        let text = TextEncoder::new().encode_to_string(&families).unwrap();
        let samples = |name: &str| -> Vec<f64> {
            text.lines()
                .filter(|line| line.starts_with(&format!("{name}{{")))
                .filter_map(|line| line.rsplit_once(' '))
                .map(|(_, value)| value.parse().unwrap())
                .collect()
        };
        let success = samples("websocket_probe_success");
        prop_assert_eq!(success.len(), list.len());
        prop_assert_eq!(samples("websocket_probe_latency").len(), list.len());

        let up: f64 = success.iter().sum();
        prop_assert_eq!(up as usize, batch.up_count());
    }
}
