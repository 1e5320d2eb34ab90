use crate::error::{ReceiptScanError, Result};
use crate::proxy::DEFAULT_MAX_BODY_BYTES;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// APIキーを上書きする環境変数
pub const API_KEY_ENV: &str = "RECEIPT_SCAN_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub gateway_url: String,
    pub model: String,
    pub bind_addr: String,
    pub proxy_url: String,
    pub timeout_seconds: u64,
    /// プロキシが受け付けるリクエストボディの上限（バイト）
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            gateway_url: "https://ai.gateway.lovable.dev/v1/chat/completions".into(),
            model: "google/gemini-2.5-flash".into(),
            bind_addr: "127.0.0.1:8787".into(),
            proxy_url: "http://127.0.0.1:8787/scan-receipt".into(),
            timeout_seconds: 120,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// 指定パスから読み込み（ファイルがなければデフォルト）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ReceiptScanError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("receipt-scan").join("config.json"))
    }

    /// 推論ゲートウェイの認証情報を解決
    ///
    /// 環境変数を優先し、空文字は未設定扱い
    pub fn resolve_api_key(&self) -> Option<String> {
        let from_env = std::env::var(API_KEY_ENV).ok();
        pick_api_key(from_env, self.api_key.clone())
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }
}

fn pick_api_key(from_env: Option<String>, from_file: Option<String>) -> Option<String> {
    from_env
        .filter(|k| !k.trim().is_empty())
        .or_else(|| from_file.filter(|k| !k.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_api_key_prefers_env() {
        assert_eq!(
            pick_api_key(Some("env-key".into()), Some("file-key".into())),
            Some("env-key".to_string())
        );
    }

    #[test]
    fn test_pick_api_key_ignores_blank() {
        assert_eq!(
            pick_api_key(Some("  ".into()), Some("file-key".into())),
            Some("file-key".to_string())
        );
        assert_eq!(pick_api_key(None, Some(String::new())), None);
        assert_eq!(pick_api_key(None, None), None);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api_key.is_none());
        assert!(config.gateway_url.ends_with("/chat/completions"));
        assert!(config.proxy_url.ends_with("/scan-receipt"));
        assert_eq!(config.timeout_seconds, 120);
    }
}
