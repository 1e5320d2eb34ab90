//! モデル応答パーサー
//!
//! 推論ゲートウェイの自由形式テキストからJSONを抽出してパースする

use crate::error::{Error, Result};
use regex::Regex;
use serde_json::Value;

lazy_static::lazy_static! {
    /// コードフェンスで囲まれたブロック（言語指定は json のみ許容）
    static ref FENCED_BLOCK: Regex = Regex::new(r"```(?:json|JSON)?\s*([\s\S]*?)```").unwrap();
}

/// モデル応答からJSON部分を抽出
///
/// 抽出優先順位:
/// 1. コードフェンス（```json ... ``` / ``` ... ```）の中身
/// 2. 最初の `{` から最後の `}` まで
/// 3. 前後空白を除いた全文
///
/// # Examples
/// ```
/// use receipt_scan_common::extract_json;
///
/// let reply = "Here you go:\n```json\n{\"items\": []}\n```";
/// assert_eq!(extract_json(reply), "{\"items\": []}");
/// ```
pub fn extract_json(reply: &str) -> &str {
    if let Some(caps) = FENCED_BLOCK.captures(reply) {
        if let Some(body) = caps.get(1) {
            return body.as_str().trim();
        }
    }

    if let (Some(start), Some(end)) = (reply.find('{'), reply.rfind('}')) {
        if end > start {
            return &reply[start..=end];
        }
    }

    reply.trim()
}

/// モデル応答をJSONとしてパース
///
/// 抽出したJSONをそのまま `Value` で返す（形の検証は取り込み側の責務）
pub fn parse_model_reply(reply: &str) -> Result<Value> {
    let json_str = extract_json(reply);
    if json_str.is_empty() {
        return Err(Error::Parse("empty model reply".into()));
    }
    Ok(serde_json::from_str(json_str)?)
}
