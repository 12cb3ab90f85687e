//! 型定義モジュール
//!
//! ドメインエンティティの型定義を提供

/// エンドポイント関連の型定義
pub mod endpoint;

/// プローブ結果関連の型定義
pub mod probe;

pub use endpoint::{Endpoint, Scheme};
pub use probe::{ProbeBatch, ProbeOutcome, ProbeResult};
