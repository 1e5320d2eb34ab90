//! 抽出サービスのエラー分類
//!
//! すべてプロキシ境界でJSONエラーボディ＋ステータスに変換される。
//! 内部の詳細（上流のボディ、設定不備の内容）はログにのみ出す。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

pub const MISSING_INPUT_MESSAGE: &str = "No image provided";
pub const INVALID_REQUEST_MESSAGE: &str = "Invalid request body";
pub const PAYLOAD_TOO_LARGE_MESSAGE: &str = "The image is too large. Try a smaller image.";
pub const CONFIGURATION_MESSAGE: &str = "The scanning service is not configured. Please try again later.";
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests, please try again in a few seconds.";
pub const QUOTA_EXCEEDED_MESSAGE: &str = "AI credits exhausted. Add funds in your workspace settings.";
pub const UPSTREAM_MESSAGE: &str = "Error processing the image";
pub const PARSE_MESSAGE: &str = "Could not extract products. Try a clearer image.";

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("リクエストに画像がありません")]
    MissingInput,

    #[error("リクエストボディが不正: {0}")]
    InvalidRequest(String),

    #[error("リクエストボディが上限を超えています")]
    PayloadTooLarge,

    #[error("推論ゲートウェイのAPIキーが設定されていません")]
    Configuration,

    #[error("推論ゲートウェイのレート制限")]
    RateLimited,

    #[error("推論ゲートウェイのクレジット切れ")]
    QuotaExceeded,

    #[error("推論ゲートウェイエラー (status {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("推論ゲートウェイ呼び出し失敗: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("モデル応答のJSONパースに失敗: {reason}")]
    ExtractionParse { reason: String, raw: String },
}

impl ExtractError {
    pub fn status(&self) -> StatusCode {
        match self {
            ExtractError::MissingInput | ExtractError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ExtractError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ExtractError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ExtractError::QuotaExceeded => StatusCode::PAYMENT_REQUIRED,
            ExtractError::ExtractionParse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ExtractError::Configuration
            | ExtractError::Upstream { .. }
            | ExtractError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// クライアントに返すメッセージ
    pub fn user_message(&self) -> &'static str {
        match self {
            ExtractError::MissingInput => MISSING_INPUT_MESSAGE,
            ExtractError::InvalidRequest(_) => INVALID_REQUEST_MESSAGE,
            ExtractError::PayloadTooLarge => PAYLOAD_TOO_LARGE_MESSAGE,
            ExtractError::Configuration => CONFIGURATION_MESSAGE,
            ExtractError::RateLimited => RATE_LIMITED_MESSAGE,
            ExtractError::QuotaExceeded => QUOTA_EXCEEDED_MESSAGE,
            ExtractError::Upstream { .. } | ExtractError::Transport(_) => UPSTREAM_MESSAGE,
            ExtractError::ExtractionParse { .. } => PARSE_MESSAGE,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl IntoResponse for ExtractError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), "scan-receipt failed: {}", self);
        } else {
            warn!(status = status.as_u16(), "scan-receipt rejected: {}", self);
        }

        let raw_response = match &self {
            ExtractError::ExtractionParse { raw, .. } => Some(raw.clone()),
            _ => None,
        };
        let body = ErrorBody {
            error: self.user_message().to_string(),
            raw_response,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ExtractError::MissingInput.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ExtractError::InvalidRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ExtractError::PayloadTooLarge.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(ExtractError::Configuration.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ExtractError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ExtractError::QuotaExceeded.status(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(
            ExtractError::Upstream { status: 503, body: "down".into() }.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ExtractError::ExtractionParse { reason: "eof".into(), raw: "oops".into() }.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_user_message_hides_internal_detail() {
        let err = ExtractError::Upstream { status: 500, body: "stack trace at line 42".into() };
        assert_eq!(err.user_message(), UPSTREAM_MESSAGE);
        assert!(!err.user_message().contains("stack trace"));

        assert!(!ExtractError::Configuration.user_message().contains("API"));
    }

    #[test]
    fn test_error_body_omits_raw_response_when_absent() {
        let body = ErrorBody { error: "x".into(), raw_response: None };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, serde_json::json!({"error": "x"}));
    }
}
