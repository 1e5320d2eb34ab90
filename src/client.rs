//! 抽出サービスのクライアント
//!
//! 失敗時は常にメッセージ付きの `ScanError` を返す。
//! サービスが返したメッセージを優先し、なければ汎用メッセージ。

use crate::error::Result;
use crate::upload::ImageUpload;
use receipt_scan_common::ExtractionPayload;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_SCAN_ERROR: &str = "Error scanning the receipt";

/// 抽出呼び出しの失敗
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ScanError {
    pub message: String,
    /// HTTPステータス（通信自体に失敗した場合は None）
    pub status: Option<u16>,
}

impl ScanError {
    pub fn new(message: impl Into<String>, status: Option<u16>) -> Self {
        Self { message: message.into(), status }
    }
}

/// 画像 → 抽出結果（IDなし）
#[allow(async_fn_in_trait)]
pub trait ReceiptScanner {
    async fn scan_image(&self, upload: &ImageUpload) -> std::result::Result<ExtractionPayload, ScanError>;
}

/// HTTP経由でプロキシを呼ぶクライアント
pub struct ProxyClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ProxyClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoint: endpoint.into() })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ReceiptScanner for ProxyClient {
    async fn scan_image(&self, upload: &ImageUpload) -> std::result::Result<ExtractionPayload, ScanError> {
        let body = json!({
            "imageBase64": upload.to_base64(),
            "mimeType": upload.mime_type,
        });

        debug!(endpoint = %self.endpoint, file = %upload.file_name, "calling scan-receipt");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("scan-receipt request failed: {}", e);
                ScanError::new(DEFAULT_SCAN_ERROR, None)
            })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            warn!("scan-receipt response unreadable: {}", e);
            ScanError::new(DEFAULT_SCAN_ERROR, Some(status))
        })?;
        let value: Option<Value> = serde_json::from_str(&text).ok();

        if !(200..300).contains(&status) {
            let message = value
                .as_ref()
                .and_then(service_message)
                .unwrap_or_else(|| DEFAULT_SCAN_ERROR.to_string());
            return Err(ScanError::new(message, Some(status)));
        }

        let value = value.ok_or_else(|| ScanError::new(DEFAULT_SCAN_ERROR, Some(status)))?;
        if let Some(message) = service_message(&value) {
            return Err(ScanError::new(message, Some(status)));
        }

        Ok(ExtractionPayload::from_value(&value))
    }
}

/// `{"error": "..."}` のメッセージ
fn service_message(value: &Value) -> Option<String> {
    value
        .get("error")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}
