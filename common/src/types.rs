//! スキャン結果の型定義
//!
//! プロキシとクライアントで共有される型:
//! - Unit / Category: 固定の列挙セット（未知の値はデフォルトへフォールバック）
//! - RawItem / ExtractionPayload: モデル出力をそのまま受ける緩い型
//! - ExtractedItem: 正規化済み（IDなし）
//! - ScannedItem / ScanResult: 編集リストに載る最終形

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// 数量の単位
///
/// シリアライズ時はモデルに指示しているラベル（`ud`, `kg`, `g`, `L`, `ml`, `docena`, `pack`）を使う
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    #[serde(rename = "ud")]
    Unit,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "L")]
    Liter,
    #[serde(rename = "ml")]
    Milliliter,
    #[serde(rename = "docena")]
    Dozen,
    #[serde(rename = "pack")]
    Pack,
}

impl Unit {
    pub const ALL: [Unit; 7] = [
        Unit::Unit,
        Unit::Kilogram,
        Unit::Gram,
        Unit::Liter,
        Unit::Milliliter,
        Unit::Dozen,
        Unit::Pack,
    ];

    /// JSON上のラベル
    pub fn label(&self) -> &'static str {
        match self {
            Unit::Unit => "ud",
            Unit::Kilogram => "kg",
            Unit::Gram => "g",
            Unit::Liter => "L",
            Unit::Milliliter => "ml",
            Unit::Dozen => "docena",
            Unit::Pack => "pack",
        }
    }

    /// 表示名
    pub fn display_name(&self) -> &'static str {
        match self {
            Unit::Unit => "unit",
            Unit::Kilogram => "kilogram",
            Unit::Gram => "gram",
            Unit::Liter => "liter",
            Unit::Milliliter => "milliliter",
            Unit::Dozen => "dozen",
            Unit::Pack => "pack",
        }
    }

    /// 表記揺れを許容して単位を判定（大文字小文字・末尾ピリオド無視）
    pub fn parse_lenient(s: &str) -> Option<Unit> {
        let key = s.trim().trim_end_matches('.').to_lowercase();
        let unit = match key.as_str() {
            "ud" | "uds" | "u" | "un" | "unit" | "units" | "unidad" | "unidades" | "pc" | "pcs"
            | "piece" | "pieces" => Unit::Unit,
            "kg" | "kgs" | "kilo" | "kilos" | "kilogram" | "kilograms" | "kilogramo"
            | "kilogramos" => Unit::Kilogram,
            "g" | "gr" | "grs" | "gram" | "grams" | "gramo" | "gramos" => Unit::Gram,
            "l" | "lt" | "lts" | "liter" | "liters" | "litre" | "litres" | "litro" | "litros" => {
                Unit::Liter
            }
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" | "mililitro"
            | "mililitros" => Unit::Milliliter,
            "docena" | "docenas" | "dozen" | "dozens" | "doz" => Unit::Dozen,
            "pack" | "packs" | "pk" | "package" | "paquete" | "paquetes" => Unit::Pack,
            _ => return None,
        };
        Some(unit)
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::parse_lenient(s).ok_or_else(|| {
            format!("Unknown unit: {}. Use ud, kg, g, L, ml, docena or pack", s)
        })
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 商品カテゴリ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    Vegetables,
    Fruits,
    #[serde(rename = "Dairy & Eggs")]
    DairyEggs,
    #[serde(rename = "Meat & Seafood")]
    MeatSeafood,
    Bakery,
    Pantry,
    Beverages,
    Frozen,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Vegetables,
        Category::Fruits,
        Category::DairyEggs,
        Category::MeatSeafood,
        Category::Bakery,
        Category::Pantry,
        Category::Beverages,
        Category::Frozen,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Vegetables => "Vegetables",
            Category::Fruits => "Fruits",
            Category::DairyEggs => "Dairy & Eggs",
            Category::MeatSeafood => "Meat & Seafood",
            Category::Bakery => "Bakery",
            Category::Pantry => "Pantry",
            Category::Beverages => "Beverages",
            Category::Frozen => "Frozen",
            Category::Other => "Other",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Category::Vegetables => "🥬",
            Category::Fruits => "🍎",
            Category::DairyEggs => "🧀",
            Category::MeatSeafood => "🥩",
            Category::Bakery => "🍞",
            Category::Pantry => "🫙",
            Category::Beverages => "🥤",
            Category::Frozen => "🧊",
            Category::Other => "📦",
        }
    }

    /// 表記揺れを許容してカテゴリを判定
    ///
    /// 大文字小文字・記号・"and"/"&" の違い、末尾の複数形sを無視する
    pub fn parse_lenient(s: &str) -> Option<Category> {
        let key = category_key(s);
        if key.is_empty() {
            return None;
        }

        Category::ALL.into_iter().find(|cat| {
            let label_key = category_key(cat.label());
            key == label_key || key == label_key.trim_end_matches('s')
        })
    }
}

/// 比較用キー
///
/// 記号・空白・camelCaseの境目で単語に分け、`and` の単語を落として連結する
fn category_key(s: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in s.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }

    words.into_iter().filter(|w| w != "and").collect()
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::parse_lenient(s).ok_or_else(|| format!("Unknown category: {}", s))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// モデル出力の1商品（未検証）
///
/// 型が揃っている保証がないため全フィールドを `Value` で受ける
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawItem {
    pub name: Value,
    pub quantity: Value,
    pub unit: Value,
    pub category: Value,
}

/// 抽出サービスの成功レスポンス（未検証）
#[derive(Debug, Clone, Default)]
pub struct ExtractionPayload {
    pub items: Vec<RawItem>,
    pub confidence: Option<f64>,
    pub raw_text: Option<String>,
}

impl ExtractionPayload {
    /// 任意のJSON値から緩く読み取る
    ///
    /// - `items` が配列でなければ空扱い
    /// - オブジェクトでない要素は捨てる
    pub fn from_value(value: &Value) -> Self {
        let items = value
            .get("items")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter(|v| v.is_object())
                    .filter_map(|v| serde_json::from_value::<RawItem>(v.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        let confidence = value.get("confidence").and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        });

        let raw_text = value
            .get("rawText")
            .and_then(Value::as_str)
            .map(str::to_string);

        Self { items, confidence, raw_text }
    }
}

/// 正規化済みの商品（IDは呼び出し側で付与）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedItem {
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    pub category: Category,
}

/// 編集リスト上の商品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedItem {
    pub id: String,
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    pub category: Category,
}

impl ScannedItem {
    pub fn from_extracted(id: String, item: ExtractedItem) -> Self {
        Self {
            id,
            name: item.name,
            quantity: item.quantity,
            unit: item.unit,
            category: item.category,
        }
    }
}

/// 1回の抽出結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub items: Vec<ScannedItem>,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unit_labels_roundtrip_through_serde() {
        for unit in Unit::ALL {
            let json = serde_json::to_string(&unit).unwrap();
            assert_eq!(json, format!("\"{}\"", unit.label()));
            let back: Unit = serde_json::from_str(&json).unwrap();
            assert_eq!(back, unit);
        }
    }

    #[test]
    fn test_unit_parse_lenient() {
        assert_eq!(Unit::parse_lenient("L"), Some(Unit::Liter));
        assert_eq!(Unit::parse_lenient("l"), Some(Unit::Liter));
        assert_eq!(Unit::parse_lenient("Litres"), Some(Unit::Liter));
        assert_eq!(Unit::parse_lenient(" KG "), Some(Unit::Kilogram));
        assert_eq!(Unit::parse_lenient("gr."), Some(Unit::Gram));
        assert_eq!(Unit::parse_lenient("ud"), Some(Unit::Unit));
        assert_eq!(Unit::parse_lenient("dozen"), Some(Unit::Dozen));
        assert_eq!(Unit::parse_lenient("paquete"), Some(Unit::Pack));
        assert_eq!(Unit::parse_lenient("barrel"), None);
        assert_eq!(Unit::parse_lenient(""), None);
    }

    #[test]
    fn test_unit_default_is_unit() {
        assert_eq!(Unit::default(), Unit::Unit);
        assert_eq!(Unit::default().display_name(), "unit");
    }

    #[test]
    fn test_unit_from_str_error() {
        let err = "barrel".parse::<Unit>().unwrap_err();
        assert!(err.contains("barrel"));
    }

    #[test]
    fn test_category_parse_lenient() {
        assert_eq!(Category::parse_lenient("Dairy & Eggs"), Some(Category::DairyEggs));
        assert_eq!(Category::parse_lenient("dairy and eggs"), Some(Category::DairyEggs));
        assert_eq!(Category::parse_lenient("DAIRY&EGGS"), Some(Category::DairyEggs));
        assert_eq!(Category::parse_lenient("meat & seafood"), Some(Category::MeatSeafood));
        assert_eq!(Category::parse_lenient("fruit"), Some(Category::Fruits));
        assert_eq!(Category::parse_lenient("vegetables"), Some(Category::Vegetables));
        assert_eq!(Category::parse_lenient("dairy-and-eggs"), Some(Category::DairyEggs));
        assert_eq!(Category::parse_lenient("DairyAndEggs"), Some(Category::DairyEggs));
        assert_eq!(Category::parse_lenient("Meat_and_Seafood"), Some(Category::MeatSeafood));
        assert_eq!(Category::parse_lenient("MEAT AND SEAFOOD"), Some(Category::MeatSeafood));
        assert_eq!(Category::parse_lenient("Snacks"), None);
        assert_eq!(Category::parse_lenient("  "), None);
    }

    #[test]
    fn test_category_serde_uses_labels() {
        let json = serde_json::to_string(&Category::MeatSeafood).unwrap();
        assert_eq!(json, "\"Meat & Seafood\"");
        let back: Category = serde_json::from_str("\"Dairy & Eggs\"").unwrap();
        assert_eq!(back, Category::DairyEggs);
    }

    #[test]
    fn test_category_every_label_has_emoji() {
        for cat in Category::ALL {
            assert!(!cat.emoji().is_empty(), "{} has no emoji", cat);
        }
        assert_eq!(Category::default(), Category::Other);
    }

    #[test]
    fn test_payload_from_value() {
        let value = json!({
            "items": [
                {"name": "Milk", "quantity": 2, "unit": "L", "category": "Dairy & Eggs"},
                "not an object",
                {"name": "Bread"}
            ],
            "confidence": 0.9,
            "rawText": "MILK 2L\nBREAD"
        });

        let payload = ExtractionPayload::from_value(&value);
        assert_eq!(payload.items.len(), 2);
        assert_eq!(payload.items[0].name, json!("Milk"));
        assert_eq!(payload.items[1].quantity, Value::Null);
        assert_eq!(payload.confidence, Some(0.9));
        assert_eq!(payload.raw_text.as_deref(), Some("MILK 2L\nBREAD"));
    }

    #[test]
    fn test_payload_from_value_tolerates_wrong_shapes() {
        let payload = ExtractionPayload::from_value(&json!({"items": null, "confidence": "0.5"}));
        assert!(payload.items.is_empty());
        assert_eq!(payload.confidence, Some(0.5));
        assert_eq!(payload.raw_text, None);

        let payload = ExtractionPayload::from_value(&json!([1, 2, 3]));
        assert!(payload.items.is_empty());
        assert_eq!(payload.confidence, None);
    }

    #[test]
    fn test_scan_result_serializes_camel_case() {
        let result = ScanResult {
            items: vec![ScannedItem {
                id: "scan-1-0".to_string(),
                name: "Milk".to_string(),
                quantity: 2.0,
                unit: Unit::Liter,
                category: Category::DairyEggs,
            }],
            confidence: 0.9,
            raw_text: Some("MILK".to_string()),
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["rawText"], "MILK");
        assert_eq!(value["items"][0]["unit"], "L");
        assert_eq!(value["items"][0]["category"], "Dairy & Eggs");
    }
}
