//! エンドポイント登録管理
//!
//! プローブ対象を起動時に一度だけ読み込み、順序付きの不変リストとして保持する。

pub mod endpoints;

pub use endpoints::EndpointRegistry;
