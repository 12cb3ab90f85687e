//! エンドポイント型定義
//!
//! プローブ対象のWebSocketエンドポイント。起動時に一度だけ読み込まれ、
//! プロセス終了まで変更されない。

use crate::common::error::ProbeError;
use url::Url;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// エンドポイントのトランスポート種別
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
    /// 平文（`ws://`）
    Ws,
    /// TLS（`wss://`）
    Wss,
}

impl Scheme {
    /// Schemeを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ws => "ws",
            Self::Wss => "wss",
        }
    }

    /// スキームの既定ポート
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Ws => 80,
            Self::Wss => 443,
        }
    }

    /// 暗号化トランスポートか
    pub fn is_encrypted(&self) -> bool {
        matches!(self, Self::Wss)
    }
}

impl FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ws" => Ok(Self::Ws),
            "wss" => Ok(Self::Wss),
            other => Err(format!("unsupported scheme '{other}' (expected ws or wss)")),
        }
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// プローブ対象エンドポイント
///
/// 同一性は設定されたアドレス文字列（`address`）で判定し、
/// メトリクスの`endpoint`ラベルにもそのまま使う。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Endpoint {
    /// 設定されたアドレス文字列（前後の空白は除去済み）
    address: String,
    /// トランスポート種別
    scheme: Scheme,
    /// ホスト名またはIPアドレス
    host: String,
    /// ポート（未指定ならスキームの既定値）
    port: u16,
    /// パス（クエリを含む）
    path: String,
}

impl Endpoint {
    /// URI文字列からエンドポイントを生成
    pub fn parse(uri: &str) -> Result<Self, ProbeError> {
        let address = uri.trim();
        let invalid = |reason: String| ProbeError::InvalidEndpoint {
            uri: address.to_string(),
            reason,
        };

        if address.is_empty() {
            return Err(invalid("empty address".to_string()));
        }

        let url = Url::parse(address).map_err(|e| invalid(e.to_string()))?;
        let scheme: Scheme = url.scheme().parse().map_err(invalid)?;
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("missing host".to_string()))?
            .to_string();
        let port = url.port().unwrap_or_else(|| scheme.default_port());

        let mut path = url.path().to_string();
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }

        Ok(Self {
            address: address.to_string(),
            scheme,
            host,
            port,
            path,
        })
    }

    /// 設定されたアドレス文字列（同一性キー）
    pub fn address(&self) -> &str {
        &self.address
    }

    /// トランスポート種別
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// ホスト
    pub fn host(&self) -> &str {
        &self.host
    }

    /// ポート
    pub fn port(&self) -> u16 {
        self.port
    }

    /// パス
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl FromStr for Endpoint {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.address)
    }
}
