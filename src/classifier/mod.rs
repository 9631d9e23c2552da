//! 判定API連携
//!
//! 判定モデル本体は外部のHTTPエンドポイント。ここでは画像を送り、
//! レスポンスを `ClassifierResponse` に変換するだけで再試行はしない。

mod http;

pub use http::HttpClassifier;

use crate::error::{AutolensError, Result};
use autolens_common::ClassifierResponse;
use image::ImageFormat;
use std::future::Future;
use std::path::Path;

/// 判定APIへ送る画像
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    /// 先頭バイトから形式を判定して作る（JPEG/PNG/WebPのみ）
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();
        let format = image::guess_format(&bytes)
            .map_err(|e| AutolensError::ImageLoad(format!("{}: {}", file_name, e)))?;

        match format {
            ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP => Ok(Self {
                mime_type: format.to_mime_type().to_string(),
                file_name,
                bytes,
            }),
            other => Err(AutolensError::ImageLoad(format!(
                "{}: 未対応の画像形式です ({:?})",
                file_name, other
            ))),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AutolensError::FileNotFound(path.display().to_string()));
        }

        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Self::new(file_name, bytes)
    }
}

/// 画像 → 車種ラベルの判定器
pub trait Classifier: Send + Sync {
    fn classify(
        &self,
        image: &ImagePayload,
    ) -> impl Future<Output = autolens_common::Result<ClassifierResponse>> + Send;
}
