//! 対話的な確認・編集
//!
//! 抽出結果を一覧表示し、編集・削除・手動追加・確定・別画像での再スキャンを行う

use crate::client::ReceiptScanner;
use crate::error::Result;
use crate::notify::Notifier;
use crate::orchestrator::{ItemUpdate, ScanOrchestrator, ScanStatus};
use crate::pantry::Pantry;
use crate::upload::ImageUpload;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use indicatif::ProgressBar;
use receipt_scan_common::{Category, ScannedItem, Unit};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Confirmed(usize),
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Edit,
    Increase,
    Decrease,
    Remove,
    Add,
    Confirm,
    TryAnother,
    Quit,
}

impl Action {
    fn label(&self, item_count: usize) -> String {
        match self {
            Action::Edit => "商品を編集".into(),
            Action::Increase => "数量 +1".into(),
            Action::Decrease => "数量 -1".into(),
            Action::Remove => "商品を削除".into(),
            Action::Add => "商品を手動で追加".into(),
            Action::Confirm => format!("{}件をパントリーに追加", item_count),
            Action::TryAnother => "別の画像で試す".into(),
            Action::Quit => "保存せずに終了".into(),
        }
    }
}

/// 状態に応じて選べる操作
fn available_actions(status: ScanStatus, item_count: usize) -> Vec<Action> {
    let mut actions = Vec::new();
    if status == ScanStatus::Done {
        if item_count > 0 {
            actions.extend([Action::Edit, Action::Increase, Action::Decrease, Action::Remove]);
        }
        actions.push(Action::Add);
        if item_count > 0 {
            actions.push(Action::Confirm);
        }
    }
    actions.extend([Action::TryAnother, Action::Quit]);
    actions
}

/// 一覧表示用の1行
pub fn format_item_line(item: &ScannedItem) -> String {
    format!(
        "{} {} · {} {} ({})",
        item.category.emoji(),
        item.name,
        format_quantity(item.quantity),
        item.unit,
        item.category
    )
}

/// 小数2桁まで、末尾の0は落とす
fn format_quantity(quantity: f64) -> String {
    let text = format!("{:.2}", quantity);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// 現在の状態を表示
pub fn print_session(orch: &ScanOrchestrator) {
    if let Some(preview) = orch.preview() {
        println!("📄 {} ({}, {} bytes)", preview.file_name, preview.mime_type, preview.size_bytes);
    }
    if let Some(message) = orch.message() {
        println!("⚠ {}", message);
    }
    if orch.items().is_empty() {
        return;
    }

    println!("\n🧺 検出された商品: {}件", orch.items().len());
    if orch.confidence() > 0.0 {
        println!("   信頼度 {}%", (orch.confidence() * 100.0).round() as i64);
    }
    for (i, item) in orch.items().iter().enumerate() {
        println!("  {:>2}. {}", i + 1, format_item_line(item));
    }
    println!();
}

/// スピナーを出しながらスキャン
pub async fn scan_with_spinner<S: ReceiptScanner>(
    orch: &mut ScanOrchestrator,
    upload: &ImageUpload,
    scanner: &S,
    notifier: &dyn Notifier,
) {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("{} をスキャン中...", upload.file_name));
    spinner.enable_steady_tick(Duration::from_millis(100));
    orch.scan(upload, scanner, notifier).await;
    spinner.finish_and_clear();
}

/// 確定またはキャンセルまで対話
pub async fn run<S: ReceiptScanner>(
    orch: &mut ScanOrchestrator,
    scanner: &S,
    pantry: &mut dyn Pantry,
    notifier: &dyn Notifier,
) -> Result<ReviewOutcome> {
    let theme = ColorfulTheme::default();

    loop {
        print_session(orch);

        let actions = available_actions(orch.status(), orch.items().len());
        let labels: Vec<String> = actions.iter().map(|a| a.label(orch.items().len())).collect();
        let choice = Select::with_theme(&theme)
            .with_prompt("操作を選択")
            .items(&labels)
            .default(0)
            .interact()?;

        match actions[choice] {
            Action::Edit => {
                if let Some(id) = pick_item(&theme, orch.items())? {
                    let update = prompt_update(&theme, orch, &id)?;
                    orch.update_item(&id, update);
                }
            }
            Action::Increase | Action::Decrease => {
                let delta = if actions[choice] == Action::Increase { 1.0 } else { -1.0 };
                if let Some(id) = pick_item(&theme, orch.items())? {
                    orch.step_quantity(&id, delta);
                }
            }
            Action::Remove => {
                if let Some(id) = pick_item(&theme, orch.items())? {
                    orch.remove_item(&id);
                }
            }
            Action::Add => {
                let id = orch.add_item().map(|item| item.id.clone());
                if let Some(id) = id {
                    let update = prompt_update(&theme, orch, &id)?;
                    orch.update_item(&id, update);
                }
            }
            Action::Confirm => {
                if let Some(count) = orch.confirm(pantry, notifier) {
                    return Ok(ReviewOutcome::Confirmed(count));
                }
            }
            Action::TryAnother => {
                orch.reset();
                let path: String = Input::with_theme(&theme)
                    .with_prompt("画像ファイルのパス")
                    .interact_text()?;
                match ImageUpload::from_path(&PathBuf::from(path.trim())) {
                    Ok(upload) => scan_with_spinner(orch, &upload, scanner, notifier).await,
                    Err(e) => println!("✖ {}", e),
                }
            }
            Action::Quit => {
                orch.reset();
                return Ok(ReviewOutcome::Abandoned);
            }
        }
    }
}

fn pick_item(theme: &ColorfulTheme, items: &[ScannedItem]) -> Result<Option<String>> {
    if items.is_empty() {
        return Ok(None);
    }
    let labels: Vec<String> = items.iter().map(format_item_line).collect();
    let choice = Select::with_theme(theme)
        .with_prompt("商品を選択")
        .items(&labels)
        .default(0)
        .interact_opt()?;
    Ok(choice.map(|i| items[i].id.clone()))
}

fn prompt_update(theme: &ColorfulTheme, orch: &ScanOrchestrator, id: &str) -> Result<ItemUpdate> {
    let Some(item) = orch.item(id) else {
        return Ok(ItemUpdate::default());
    };

    let name: String = Input::with_theme(theme)
        .with_prompt("商品名")
        .with_initial_text(item.name.clone())
        .interact_text()?;

    let quantity: f64 = Input::with_theme(theme)
        .with_prompt("数量")
        .default(item.quantity)
        .interact_text()?;

    let unit_labels: Vec<String> = Unit::ALL
        .iter()
        .map(|u| format!("{} ({})", u.label(), u.display_name()))
        .collect();
    let unit_index = Select::with_theme(theme)
        .with_prompt("単位")
        .items(&unit_labels)
        .default(Unit::ALL.iter().position(|u| *u == item.unit).unwrap_or(0))
        .interact()?;

    let category_labels: Vec<String> = Category::ALL
        .iter()
        .map(|c| format!("{} {}", c.emoji(), c.label()))
        .collect();
    let category_index = Select::with_theme(theme)
        .with_prompt("カテゴリ")
        .items(&category_labels)
        .default(Category::ALL.iter().position(|c| *c == item.category).unwrap_or(0))
        .interact()?;

    Ok(ItemUpdate {
        name: Some(name),
        quantity: Some(quantity),
        unit: Some(Unit::ALL[unit_index]),
        category: Some(Category::ALL[category_index]),
    })
}
