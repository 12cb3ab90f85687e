//! プローブ（接続試行・計測・定期実行）
//!
//! - `connector`: 1回の接続試行と失敗分類
//! - `prober`: 全エンドポイントのスイープ、タイムアウト、計時
//! - `scheduler`: スイープの定期実行

pub mod connector;
pub mod prober;
pub mod scheduler;

pub use connector::{ConnectError, Connector, ProbeConnection, WebSocketConnector};
pub use prober::Prober;
pub use scheduler::ProbeScheduler;
