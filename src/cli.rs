use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "receipt-scan")]
#[command(about = "レシート写真から商品を抽出してパントリーに登録するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 抽出プロキシ（scan-receipt）を起動
    Serve {
        /// バインドアドレス（デフォルト: 設定ファイルの bind_addr）
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// レシート画像をスキャンして確認・編集
    Scan {
        /// 画像またはPDFファイル
        #[arg(required = true)]
        file: PathBuf,

        /// プロキシのURL（デフォルト: 設定ファイルの proxy_url）
        #[arg(long)]
        proxy: Option<String>,

        /// 確認せずにそのまま確定
        #[arg(short, long)]
        yes: bool,

        /// 確定したリストの出力先JSON（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan() {
        let cli = Cli::try_parse_from(["receipt-scan", "scan", "ticket.jpg", "--yes", "-o", "out.json"]).unwrap();
        match cli.command {
            Commands::Scan { file, proxy, yes, output } => {
                assert_eq!(file, PathBuf::from("ticket.jpg"));
                assert!(proxy.is_none());
                assert!(yes);
                assert_eq!(output, Some(PathBuf::from("out.json")));
            }
            _ => panic!("expected scan"),
        }
    }

    #[test]
    fn test_parse_serve_with_global_verbose() {
        let cli = Cli::try_parse_from(["receipt-scan", "serve", "--bind", "0.0.0.0:9000", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Serve { bind: Some(ref b) } if b == "0.0.0.0:9000"));
    }

    #[test]
    fn test_scan_requires_file() {
        assert!(Cli::try_parse_from(["receipt-scan", "scan"]).is_err());
    }
}
