use crate::upload::ImageUpload;
use receipt_scan_common::{Category, Unit};

/// スキャンの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanStatus {
    #[default]
    Idle,
    Uploading,
    Scanning,
    Done,
    Error,
}

/// 選択画像のローカルプレビュー参照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: usize,
    /// 内容のSHA-256
    pub digest: String,
}

impl Preview {
    pub fn of(upload: &ImageUpload) -> Self {
        Self {
            file_name: upload.file_name.clone(),
            mime_type: upload.mime_type.clone(),
            size_bytes: upload.bytes.len(),
            digest: upload.digest(),
        }
    }
}

/// セッション世代トークン
///
/// 画像選択ごとに発行され、リセットや次の選択で無効になる
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanTicket(pub(crate) u64);

/// 抽出結果を適用したか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultDisposition {
    Applied,
    /// 古いチケットの結果なので捨てた
    Discarded,
}

/// 商品の部分更新
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<Unit>,
    pub category: Option<Category>,
}

impl ItemUpdate {
    pub fn name(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Default::default() }
    }

    pub fn quantity(quantity: f64) -> Self {
        Self { quantity: Some(quantity), ..Default::default() }
    }

    pub fn unit(unit: Unit) -> Self {
        Self { unit: Some(unit), ..Default::default() }
    }

    pub fn category(category: Category) -> Self {
        Self { category: Some(category), ..Default::default() }
    }
}
