//! プローブ結果の型定義

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use super::endpoint::Endpoint;

/// 1回の接続試行の分類
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// 初回スイープ完了前のプレースホルダ
    Pending,
    /// 接続確立
    Connected,
    /// 相手側が接続を拒否（TCP RST、アップグレード拒否）
    Refused,
    /// タイムアウト
    TimedOut,
    /// 上記以外の失敗（DNS、TLS、プロトコル等）
    Error,
}

impl ProbeOutcome {
    /// ProbeOutcomeを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Connected => "connected",
            Self::Refused => "refused",
            Self::TimedOut => "timed_out",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 1エンドポイントに対する1回のプローブ結果
///
/// 生成後は変更しない。
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProbeResult {
    /// エンドポイントの同一性（設定されたアドレス文字列）
    pub endpoint: String,
    /// 接続確立に成功したか
    pub success: bool,
    /// 試行開始から結果確定までの経過時間（ミリ秒）
    pub latency_ms: f64,
    /// 結果の分類
    pub outcome: ProbeOutcome,
    /// 失敗理由（診断用）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ProbeResult {
    /// 接続成功
    pub fn connected(endpoint: &Endpoint, elapsed: Duration) -> Self {
        Self {
            endpoint: endpoint.address().to_string(),
            success: true,
            latency_ms: duration_to_ms(elapsed),
            outcome: ProbeOutcome::Connected,
            reason: None,
        }
    }

    /// 接続失敗（成功以外の分類すべて）
    pub fn failed(
        endpoint: &Endpoint,
        outcome: ProbeOutcome,
        elapsed: Duration,
        reason: impl Into<String>,
    ) -> Self {
        debug_assert!(outcome != ProbeOutcome::Connected);
        Self {
            endpoint: endpoint.address().to_string(),
            success: false,
            latency_ms: duration_to_ms(elapsed),
            outcome,
            reason: Some(reason.into()),
        }
    }

    /// 初回スイープ前のプレースホルダ
    pub fn pending(endpoint: &Endpoint) -> Self {
        Self {
            endpoint: endpoint.address().to_string(),
            success: false,
            latency_ms: 0.0,
            outcome: ProbeOutcome::Pending,
            reason: Some("not probed yet".to_string()),
        }
    }
}

/// 1回のスイープで得られたプローブ結果の集合
///
/// レジストリ順に1エンドポイント1結果。
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProbeBatch {
    /// スイープ番号（0は初回スイープ前のプレースホルダ）
    pub cycle: u64,
    /// スイープ開始時刻
    pub started_at: DateTime<Utc>,
    /// スイープ完了時刻
    pub completed_at: DateTime<Utc>,
    /// エンドポイントごとの結果
    pub results: Vec<ProbeResult>,
}

impl ProbeBatch {
    /// 初回スイープ前のプレースホルダバッチ
    pub fn pending(endpoints: &[Endpoint]) -> Self {
        let now = Utc::now();
        Self {
            cycle: 0,
            started_at: now,
            completed_at: now,
            results: endpoints.iter().map(ProbeResult::pending).collect(),
        }
    }

    /// 成功したエンドポイント数
    pub fn up_count(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    /// 全エンドポイントが成功したか
    pub fn all_up(&self) -> bool {
        self.up_count() == self.results.len()
    }
}

fn duration_to_ms(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}
