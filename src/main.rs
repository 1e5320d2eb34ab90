use clap::Parser;
use anyhow::Context;
use receipt_scan::{cli, config, logging, proxy, review};
use receipt_scan::client::ProxyClient;
use receipt_scan::notify::ConsoleNotifier;
use receipt_scan::orchestrator::{ScanOrchestrator, ScanStatus};
use receipt_scan::pantry::PantryList;
use receipt_scan::upload::ImageUpload;
use cli::{Cli, Commands};
use config::Config;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = Config::load().context("設定ファイルの読み込みに失敗")?;

    match cli.command {
        Commands::Serve { bind } => {
            println!("🧾 receipt-scan - 抽出プロキシ\n");

            let addr = bind.unwrap_or_else(|| config.bind_addr.clone());
            let service = proxy::ReceiptExtractionService::new(proxy::GatewaySettings::from_config(&config))?;
            proxy::serve(&addr, Arc::new(service), config.max_body_bytes)
                .await
                .with_context(|| format!("プロキシを {} で起動できません", addr))?;
        }

        Commands::Scan { file, proxy, yes, output } => {
            println!("🧾 receipt-scan - レシートスキャン\n");

            let upload = ImageUpload::from_path(&file)
                .with_context(|| format!("画像を読み込めません: {}", file.display()))?;
            let endpoint = proxy.unwrap_or_else(|| config.proxy_url.clone());
            let client = ProxyClient::new(endpoint, Duration::from_secs(config.timeout_seconds))?;
            println!("📡 プロキシ: {}", client.endpoint());
            let notifier = ConsoleNotifier;
            let mut pantry = PantryList::new();
            let mut orch = ScanOrchestrator::new();

            review::scan_with_spinner(&mut orch, &upload, &client, &notifier).await;

            let confirmed = if yes {
                review::print_session(&orch);
                if orch.status() == ScanStatus::Error {
                    println!("別の画像で試してください: receipt-scan scan <FILE>");
                }
                orch.confirm(&mut pantry, &notifier).is_some()
            } else {
                matches!(
                    review::run(&mut orch, &client, &mut pantry, &notifier).await?,
                    review::ReviewOutcome::Confirmed(_)
                )
            };

            if confirmed {
                match output {
                    Some(path) => {
                        pantry
                            .save(&path)
                            .with_context(|| format!("保存に失敗: {}", path.display()))?;
                        println!("✔ 結果を保存: {}", path.display());
                    }
                    None => println!("{}", pantry.to_json()?),
                }
            }
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  ゲートウェイ: {}", config.gateway_url);
                println!("  モデル: {}", config.model);
                println!("  バインドアドレス: {}", config.bind_addr);
                println!("  プロキシURL: {}", config.proxy_url);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  ボディ上限: {} bytes", config.max_body_bytes);
                println!("  APIキー: {}", if config.resolve_api_key().is_some() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}
