//! Receipt Scan Common Library
//!
//! プロキシ（抽出サービス）とクライアント（オーケストレータ）で共有される型とユーティリティ

pub mod types;
pub mod error;
pub mod normalize;
pub mod parser;
pub mod prompts;

pub use types::{Category, ExtractedItem, RawItem, ExtractionPayload, ScanResult, ScannedItem, Unit};
pub use error::{Error, Result};
pub use normalize::{clamp_quantity, normalize_confidence, normalize_item, normalize_items, normalize_name, MIN_QUANTITY};
pub use parser::{extract_json, parse_model_reply};
pub use prompts::{build_system_prompt, USER_INSTRUCTION};
