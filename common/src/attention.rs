//! 注目領域マップ（ヒートマップ）参照
//!
//! 判定APIの `heatmapImage` はData URLかURL文字列。
//! パイプラインは中身を解釈せずそのまま結果へ引き継ぐ。

use base64::{engine::general_purpose::STANDARD, Engine as _};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// ヒートマップ画像への不透明な参照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttentionMapRef(String);

/// Data URLをデコードした画像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    /// MIMEタイプに対応する拡張子
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "bin",
        }
    }
}

impl AttentionMapRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `data:<mime>;base64,<data>` 形式ならデコードする
    ///
    /// 通常のURLやBase64として不正な場合は `None`。
    pub fn decode(&self) -> Option<DecodedImage> {
        lazy_static::lazy_static! {
            static ref DATA_URL_RE: Regex =
                Regex::new(r"(?s)^data:([\w.+-]+/[\w.+-]+);base64,(.*)$").unwrap();
        }

        let caps = DATA_URL_RE.captures(self.0.trim())?;
        let mime_type = caps.get(1)?.as_str().to_lowercase();
        let payload: String = caps
            .get(2)?
            .as_str()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let bytes = STANDARD.decode(payload).ok()?;

        Some(DecodedImage { mime_type, bytes })
    }
}
