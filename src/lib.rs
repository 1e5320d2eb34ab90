//! receipt-scan
//!
//! - proxy: 画像を推論ゲートウェイへ転送して商品リストを返す抽出サービス
//! - orchestrator: 画像選択 → 抽出 → 編集 → 確定 の状態機械
//! - client: プロキシを呼ぶHTTPクライアント

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod notify;
pub mod orchestrator;
pub mod pantry;
pub mod proxy;
pub mod review;
pub mod upload;
