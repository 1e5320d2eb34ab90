//! 確定した商品の受け渡し先

use crate::error::Result;
use receipt_scan_common::ScannedItem;
use std::path::Path;

/// 確定リストを受け取る外部協調者
///
/// 受け取った後の扱いは実装側の責務
pub trait Pantry {
    fn add_items(&mut self, items: Vec<ScannedItem>);
}

/// メモリ上のパントリー
#[derive(Debug, Clone, Default)]
pub struct PantryList {
    items: Vec<ScannedItem>,
    batches: usize,
}

impl PantryList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[ScannedItem] {
        &self.items
    }

    /// 受け取った回数
    pub fn batches(&self) -> usize {
        self.batches
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.items)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl Pantry for PantryList {
    fn add_items(&mut self, items: Vec<ScannedItem>) {
        self.batches += 1;
        self.items.extend(items);
    }
}
