//! プロンプト生成モジュール
//!
//! 抽出サービスが推論ゲートウェイへ送る固定指示:
//! - build_system_prompt: システム指示（出力形式・単位・カテゴリ）
//! - USER_INSTRUCTION: ユーザー指示

use crate::types::{Category, Unit};

/// ユーザー指示（画像と一緒に送る）
pub const USER_INSTRUCTION: &str =
    "Extract all products and quantities from this receipt or shopping list.";

/// システム指示を生成
///
/// 単位・カテゴリの一覧は列挙型から組み立てるので、型と指示がずれることはない
pub fn build_system_prompt() -> String {
    let units = Unit::ALL
        .iter()
        .map(|u| format!("\"{}\" ({})", u.label(), u.display_name()))
        .collect::<Vec<_>>()
        .join(", ");

    let categories = Category::ALL
        .iter()
        .map(|c| format!("\"{}\"", c.label()))
        .collect::<Vec<_>>()
        .join(", ");

    let default_unit = Unit::default().label();
    let default_category = Category::default().label();

    format!(
        r#"You are an OCR expert for purchase receipts and shopping lists. Your task is to extract every product and its quantity from the provided image.

RULES:
1. Return ONLY valid JSON, with no additional text.
2. Every product must have: "name" (string), "quantity" (number), "unit" (string).
3. Normalize names: first letter uppercase, no abbreviations.
4. Valid units are: {units}.
5. If the quantity cannot be determined, use 1. If the unit cannot be determined, use "{default_unit}".
6. Ignore prices, totals, dates and store details.
7. Merge duplicate products by summing their quantities.
8. Categorize every product with "category", which must be one of: {categories}. Use "{default_category}" when unsure.

Respond ONLY with this JSON format:
{{
  "items": [
    {{ "name": "Product name", "quantity": 1, "unit": "{default_unit}", "category": "Pantry" }}
  ],
  "confidence": 0.95,
  "rawText": "raw text read from the receipt"
}}"#
    )
}
