mod error;
mod gateway;
mod server;
mod service;

pub use error::{
    ErrorBody, ExtractError, CONFIGURATION_MESSAGE, INVALID_REQUEST_MESSAGE, MISSING_INPUT_MESSAGE,
    PARSE_MESSAGE, PAYLOAD_TOO_LARGE_MESSAGE, QUOTA_EXCEEDED_MESSAGE, RATE_LIMITED_MESSAGE, UPSTREAM_MESSAGE,
};
pub use server::{router, serve, serve_listener, DEFAULT_MAX_BODY_BYTES, HEALTH_PATH, SCAN_PATH};
pub use service::{GatewaySettings, ReceiptExtractionService, ScanRequest};
