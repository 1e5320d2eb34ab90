//! アップロード画像の読み込み
//!
//! 拡張子からMIMEタイプを判定し、判定できなければ中身から推定する。
//! 受け付けるのは `image/*` と `application/pdf` のみ。

use crate::error::{ReceiptScanError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use std::path::Path;

/// MIMEタイプ不明時のデフォルト
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

const PDF_MIME_TYPE: &str = "application/pdf";

const EXTENSION_MIME_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("avif", "image/avif"),
    ("pdf", PDF_MIME_TYPE),
];

/// 選択された1ファイル
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// ファイルから読み込み
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ReceiptScanError::FileNotFound(path.display().to_string()));
        }

        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let mime_type = path
            .extension()
            .and_then(|ext| mime_from_extension(&ext.to_string_lossy()))
            .map(str::to_string)
            .or_else(|| sniff_mime_type(&bytes))
            .ok_or_else(|| ReceiptScanError::UnsupportedFile(file_name.clone()))?;

        Self::new(file_name, mime_type, bytes)
    }

    /// MIMEタイプを検証して生成
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();
        let mime_type = mime_type.into();
        if !is_accepted_mime_type(&mime_type) {
            return Err(ReceiptScanError::UnsupportedFile(format!("{} ({})", file_name, mime_type)));
        }
        Ok(Self { file_name, mime_type, bytes })
    }

    /// Base64（data URLプレフィックスなし）
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// 内容のSHA-256（16進）
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }
}

pub fn is_accepted_mime_type(mime_type: &str) -> bool {
    let mime = mime_type.trim().to_lowercase();
    (mime.starts_with("image/") && mime.len() > "image/".len()) || mime == PDF_MIME_TYPE
}

fn mime_from_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.to_lowercase();
    EXTENSION_MIME_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

/// 中身から推定（PDFシグネチャ → imageクレートの判定）
fn sniff_mime_type(bytes: &[u8]) -> Option<String> {
    if bytes.starts_with(b"%PDF-") {
        return Some(PDF_MIME_TYPE.to_string());
    }
    image::guess_format(bytes)
        .ok()
        .map(|format| format.to_mime_type().to_string())
}
