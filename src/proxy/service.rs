//! レシート抽出サービス
//!
//! 1リクエスト = 1回の推論ゲートウェイ呼び出し。状態は持たない。
//! 処理の流れ:
//! 1. 入力検証（画像なし → MissingInput）
//! 2. 認証情報の確認（なし → Configuration）
//! 3. 固定指示＋インライン画像でゲートウェイ呼び出し
//! 4. ステータス分類（429 / 402 / その他）
//! 5. 応答テキストからJSONを抽出してパース（失敗 → ExtractionParse）

use super::error::ExtractError;
use super::gateway::{build_chat_request, ChatResponse};
use crate::config::Config;
use crate::error::Result;
use crate::upload::DEFAULT_MIME_TYPE;
use receipt_scan_common::{build_system_prompt, parse_model_reply, USER_INSTRUCTION};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// 推論ゲートウェイの接続設定
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl GatewaySettings {
    /// 設定ファイル＋環境変数から解決（プロセス起動時に1回）
    pub fn from_config(config: &Config) -> Self {
        Self {
            url: config.gateway_url.clone(),
            model: config.model.clone(),
            api_key: config.resolve_api_key(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

/// プロキシが受け取るリクエストボディ
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

pub struct ReceiptExtractionService {
    client: reqwest::Client,
    settings: GatewaySettings,
    system_prompt: String,
}

impl ReceiptExtractionService {
    pub fn new(settings: GatewaySettings) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            settings,
            system_prompt: build_system_prompt(),
        })
    }

    pub fn has_credential(&self) -> bool {
        self.settings.api_key.is_some()
    }

    /// 画像から商品リストを抽出
    ///
    /// 成功時はパースしたJSONをそのまま返す（IDの付与はクライアント側）
    pub async fn extract(&self, request: ScanRequest) -> std::result::Result<Value, ExtractError> {
        let image_base64 = request
            .image_base64
            .filter(|s| !s.is_empty())
            .ok_or(ExtractError::MissingInput)?;

        let mime_type = request
            .mime_type
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(ExtractError::Configuration)?;

        info!(mime_type = %mime_type, payload_len = image_base64.len(), "scanning receipt");

        let content = self.call_gateway(api_key, &mime_type, &image_base64).await?;

        match parse_model_reply(&content) {
            Ok(parsed) => {
                debug!(reply_len = content.len(), "model reply parsed");
                Ok(parsed)
            }
            Err(e) => {
                error!("Failed to parse AI response: {}", content);
                Err(ExtractError::ExtractionParse {
                    reason: e.to_string(),
                    raw: content,
                })
            }
        }
    }

    async fn call_gateway(
        &self,
        api_key: &str,
        mime_type: &str,
        image_base64: &str,
    ) -> std::result::Result<String, ExtractError> {
        let body = build_chat_request(
            &self.settings.model,
            &self.system_prompt,
            USER_INSTRUCTION,
            mime_type,
            image_base64,
        );

        let response = self
            .client
            .post(&self.settings.url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => {
                    warn!("AI gateway rate limited");
                    ExtractError::RateLimited
                }
                StatusCode::PAYMENT_REQUIRED => {
                    warn!("AI gateway quota exhausted");
                    ExtractError::QuotaExceeded
                }
                _ => {
                    let text = response.text().await.unwrap_or_default();
                    error!(status = status.as_u16(), "AI gateway error: {}", text);
                    ExtractError::Upstream { status: status.as_u16(), body: text }
                }
            });
        }

        let payload: ChatResponse = response.json().await?;
        Ok(payload.first_text().to_string())
    }
}
