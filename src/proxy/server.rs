//! プロキシHTTPサーバー
//!
//! - `POST /scan-receipt`: 抽出
//! - `OPTIONS /scan-receipt`: CORSプリフライト（CorsLayerが応答、ボディなし）
//! - `GET /health`: 死活確認
//!
//! すべてのレスポンスに許可的なCORSヘッダーを付ける。
//! リクエストボディは `max_body_bytes` まで（超過は413のJSONエラー）。

use super::error::ExtractError;
use super::service::{ReceiptExtractionService, ScanRequest};
use crate::error::{ReceiptScanError, Result};
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header::ACCESS_CONTROL_ALLOW_HEADERS;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

pub const SCAN_PATH: &str = "/scan-receipt";
pub const HEALTH_PATH: &str = "/health";

/// リクエストボディの上限（base64化したスマホ写真が収まる大きさ）
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

const ALLOW_HEADERS: [&str; 8] = [
    "authorization",
    "x-client-info",
    "apikey",
    "content-type",
    "x-supabase-client-platform",
    "x-supabase-client-platform-version",
    "x-supabase-client-runtime",
    "x-supabase-client-runtime-version",
];

pub fn router(service: Arc<ReceiptExtractionService>, max_body_bytes: usize) -> Router {
    Router::new()
        .route(SCAN_PATH, post(scan_receipt))
        .route(HEALTH_PATH, get(health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_str(&ALLOW_HEADERS.join(", ")).ok(),
        ))
        .layer(cors_layer())
        .with_state(service)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(ALLOW_HEADERS.map(HeaderName::from_static))
}

/// 指定アドレスでサーバーを起動
pub async fn serve(
    addr: &str,
    service: Arc<ReceiptExtractionService>,
    max_body_bytes: usize,
) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| ReceiptScanError::Config(format!("不正なバインドアドレス {}: {}", addr, e)))?;
    let listener = TcpListener::bind(addr).await?;
    serve_listener(listener, service, max_body_bytes).await
}

/// バインド済みのリスナーで起動（テストではポート0で使う）
pub async fn serve_listener(
    listener: TcpListener,
    service: Arc<ReceiptExtractionService>,
    max_body_bytes: usize,
) -> Result<()> {
    if !service.has_credential() {
        warn!("AI gateway API key is not configured; every scan request will fail with 500");
    }

    let local_addr = listener.local_addr()?;
    info!(max_body_bytes, "scan-receipt proxy listening on http://{}{}", local_addr, SCAN_PATH);

    axum::serve(listener, router(service, max_body_bytes))
        .await
        .map_err(|e| ReceiptScanError::Server(e.to_string()))
}

async fn scan_receipt(
    State(service): State<Arc<ReceiptExtractionService>>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> std::result::Result<Json<Value>, ExtractError> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ExtractError::PayloadTooLarge
        } else {
            ExtractError::InvalidRequest(rejection.body_text())
        }
    })?;
    let request: ScanRequest =
        serde_json::from_slice(&body).map_err(|e| ExtractError::InvalidRequest(e.to_string()))?;
    let parsed = service.extract(request).await?;
    Ok(Json(parsed))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
