//! 取り込み時の正規化
//!
//! モデル出力（RawItem）を厳密な ExtractedItem へ変換する。
//! ここより先に未検証のデータを流さない。

use crate::types::{Category, ExtractedItem, RawItem, Unit};
use serde_json::Value;

/// 編集リストで許容する最小数量
pub const MIN_QUANTITY: f64 = 0.1;

/// 数量が判定できない場合の値
pub const DEFAULT_QUANTITY: f64 = 1.0;

/// 商品名を正規化（前後空白除去、連続空白の圧縮、先頭大文字化）
pub fn normalize_name(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 編集時の数量クランプ
///
/// 非有限値と下限未満は `MIN_QUANTITY` に丸める
pub fn clamp_quantity(quantity: f64) -> f64 {
    if quantity.is_finite() && quantity >= MIN_QUANTITY {
        quantity
    } else {
        MIN_QUANTITY
    }
}

/// モデル出力の数量を正規化
///
/// 数値または数値文字列（小数点カンマ可）を受け付け、
/// 判定不能・0以下は `DEFAULT_QUANTITY`
pub fn normalize_quantity(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(q) if q.is_finite() && q > 0.0 => clamp_quantity(q),
        _ => DEFAULT_QUANTITY,
    }
}

/// 信頼度を [0, 1] に収める（欠落・非有限値は0）
pub fn normalize_confidence(confidence: Option<f64>) -> f64 {
    match confidence {
        Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// 1商品を正規化（名前がなければ None）
pub fn normalize_item(raw: &RawItem) -> Option<ExtractedItem> {
    let name = match &raw.name {
        Value::String(s) => normalize_name(s),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    };
    if name.is_empty() {
        return None;
    }

    let unit = raw
        .unit
        .as_str()
        .and_then(Unit::parse_lenient)
        .unwrap_or_default();
    let category = raw
        .category
        .as_str()
        .and_then(Category::parse_lenient)
        .unwrap_or_default();

    Some(ExtractedItem {
        name,
        quantity: normalize_quantity(&raw.quantity),
        unit,
        category,
    })
}

/// 商品リストを正規化（順序は維持）
pub fn normalize_items(raw: &[RawItem]) -> Vec<ExtractedItem> {
    raw.iter().filter_map(normalize_item).collect()
}
