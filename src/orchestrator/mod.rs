//! スキャンオーケストレータ
//!
//! 画像選択 → 抽出呼び出し → 編集リスト → 確定 を順に進める状態機械。
//!
//! ## 状態遷移
//! - idle → uploading（画像選択。プレビュー作成、前回結果をクリア）
//! - uploading → scanning（抽出呼び出しを発行）
//! - scanning → done（成功。0件なら注意メッセージ付き）
//! - scanning → error（失敗。メッセージ保持＋通知）
//! - 任意 → idle（画像削除/リセット）
//! - done → idle（確定。パントリーへ渡して通知）
//!
//! 抽出結果は発行時の `ScanTicket` と一緒に適用する。
//! リセットや別画像の選択でチケットが古くなった結果は捨てる。

mod types;

pub use types::{ItemUpdate, Preview, ResultDisposition, ScanStatus, ScanTicket};

use crate::client::{ReceiptScanner, ScanError};
use crate::notify::{Notification, Notifier};
use crate::pantry::Pantry;
use crate::upload::ImageUpload;
use receipt_scan_common::{
    clamp_quantity, normalize_confidence, normalize_items, Category, ExtractionPayload, ScanResult, ScannedItem,
    Unit,
};
use tracing::{debug, info};

pub const NO_PRODUCTS_MESSAGE: &str = "No products detected. Try another image.";
pub const SCAN_ERROR_TITLE: &str = "Scan error";
pub const CONFIRM_TITLE: &str = "Products added!";
pub const NEW_ITEM_NAME: &str = "New product";

#[derive(Debug, Default)]
pub struct ScanOrchestrator {
    status: ScanStatus,
    preview: Option<Preview>,
    items: Vec<ScannedItem>,
    confidence: f64,
    raw_text: Option<String>,
    message: Option<String>,
    generation: u64,
    next_seq: u64,
}

impl ScanOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ScanStatus {
        self.status
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn items(&self) -> &[ScannedItem] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&ScannedItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn raw_text(&self) -> Option<&str> {
        self.raw_text.as_deref()
    }

    /// インライン表示するメッセージ（エラーまたは0件の注意）
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// 現在の編集リストを抽出結果の形で取り出す
    pub fn result(&self) -> ScanResult {
        ScanResult {
            items: self.items.clone(),
            confidence: self.confidence,
            raw_text: self.raw_text.clone(),
        }
    }

    // =============================================
    // スキャンのライフサイクル
    // =============================================

    /// 画像を選択して新しいセッションを開始
    pub fn select_file(&mut self, upload: &ImageUpload) -> ScanTicket {
        self.clear_session();
        self.preview = Some(Preview::of(upload));
        self.status = ScanStatus::Uploading;
        debug!(file = %upload.file_name, generation = self.generation, "image selected");
        ScanTicket(self.generation)
    }

    /// 抽出呼び出しを開始してよいか判定し、scanning へ進める
    ///
    /// 同じチケットで2回目の呼び出しは許可しない
    pub fn begin_scan(&mut self, ticket: ScanTicket) -> bool {
        if !self.is_current(ticket) || self.status != ScanStatus::Uploading {
            return false;
        }
        self.status = ScanStatus::Scanning;
        true
    }

    /// 抽出結果を適用
    pub fn apply_result(
        &mut self,
        ticket: ScanTicket,
        result: Result<ExtractionPayload, ScanError>,
        notifier: &dyn Notifier,
    ) -> ResultDisposition {
        if !self.is_current(ticket) || self.status != ScanStatus::Scanning {
            debug!(ticket = ticket.0, generation = self.generation, "discarding stale scan result");
            return ResultDisposition::Discarded;
        }

        match result {
            Ok(payload) => {
                self.items = normalize_items(&payload.items)
                    .into_iter()
                    .map(|item| {
                        let id = self.next_id("scan");
                        ScannedItem::from_extracted(id, item)
                    })
                    .collect();
                self.confidence = normalize_confidence(payload.confidence);
                self.raw_text = payload.raw_text;
                self.status = ScanStatus::Done;

                if self.items.is_empty() {
                    self.message = Some(NO_PRODUCTS_MESSAGE.to_string());
                }
                info!(items = self.items.len(), confidence = self.confidence, "scan finished");
            }
            Err(err) => {
                self.status = ScanStatus::Error;
                self.message = Some(err.message.clone());
                notifier.notify(Notification::error(SCAN_ERROR_TITLE, err.message));
            }
        }

        ResultDisposition::Applied
    }

    /// 選択から結果適用までを一続きで実行
    pub async fn scan<S: ReceiptScanner>(
        &mut self,
        upload: &ImageUpload,
        scanner: &S,
        notifier: &dyn Notifier,
    ) -> ResultDisposition {
        let ticket = self.select_file(upload);
        if !self.begin_scan(ticket) {
            return ResultDisposition::Discarded;
        }
        let result = scanner.scan_image(upload).await;
        self.apply_result(ticket, result, notifier)
    }

    /// 画像を外してidleへ戻す（処理中の結果は以後無視される）
    pub fn reset(&mut self) {
        self.clear_session();
    }

    // =============================================
    // 編集
    // =============================================

    /// IDで1件更新（数量は下限0.1にクランプ）
    pub fn update_item(&mut self, id: &str, update: ItemUpdate) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };

        if let Some(name) = update.name {
            item.name = name;
        }
        if let Some(quantity) = update.quantity {
            item.quantity = clamp_quantity(quantity);
        }
        if let Some(unit) = update.unit {
            item.unit = unit;
        }
        if let Some(category) = update.category {
            item.category = category;
        }
        true
    }

    /// 数量を増減（+/- ボタン）
    pub fn step_quantity(&mut self, id: &str, delta: f64) -> Option<f64> {
        let item = self.items.iter_mut().find(|item| item.id == id)?;
        item.quantity = clamp_quantity(item.quantity + delta);
        Some(item.quantity)
    }

    pub fn remove_item(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// 手動で1件追加（done のときのみ）
    pub fn add_item(&mut self) -> Option<&ScannedItem> {
        if self.status != ScanStatus::Done {
            return None;
        }
        let id = self.next_id("manual");
        self.items.push(ScannedItem {
            id,
            name: NEW_ITEM_NAME.to_string(),
            quantity: 1.0,
            unit: Unit::default(),
            category: Category::default(),
        });
        self.items.last()
    }

    /// 現在のリストをパントリーへ渡してリセット
    ///
    /// 空なら何もしない。渡した件数を返す
    pub fn confirm(&mut self, pantry: &mut dyn Pantry, notifier: &dyn Notifier) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }

        let items = std::mem::take(&mut self.items);
        let count = items.len();
        pantry.add_items(items);
        notifier.notify(Notification::success(CONFIRM_TITLE, confirm_description(count)));
        info!(count, "items handed to pantry");

        self.clear_session();
        Some(count)
    }

    // =============================================
    // 内部
    // =============================================

    fn is_current(&self, ticket: ScanTicket) -> bool {
        ticket.0 == self.generation
    }

    fn clear_session(&mut self) {
        self.generation += 1;
        self.status = ScanStatus::Idle;
        self.preview = None;
        self.items.clear();
        self.confidence = 0.0;
        self.raw_text = None;
        self.message = None;
    }

    fn next_id(&mut self, prefix: &str) -> String {
        let seq = self.next_seq;
        self.next_seq += 1;
        format!("{}-{}-{}", prefix, chrono::Utc::now().timestamp_millis(), seq)
    }
}

pub fn confirm_description(count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{} product{} added to your pantry.", count, plural)
}
