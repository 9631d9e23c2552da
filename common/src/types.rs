//! 判定結果の型定義
//!
//! CLIとパイプラインで共有される型:
//! - ClassifierResponse: 判定API（画像→車種ラベル）の出力
//! - MetadataRecord: メタデータストアの車両レコード
//! - IdentificationResult: 最終出力（判定結果＋車両スペック）

use crate::attention::AttentionMapRef;
use serde::{Deserialize, Serialize};

/// 仕様値が不明な場合の表示値
pub const UNKNOWN_SPEC: &str = "N/A";

/// 候補1件（ラベルと確信度）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub name: String,
    /// 0–100
    pub confidence: f64,
}

/// 判定APIの出力
///
/// `top_predictions` は確信度の降順で届く前提（検証はしない）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierResponse {
    pub car_name: String,
    pub confidence: f64,
    #[serde(default)]
    pub top_predictions: Vec<Prediction>,
    #[serde(default, rename = "heatmapImage", skip_serializing_if = "Option::is_none")]
    pub attention_map: Option<AttentionMapRef>,
}

/// 車両スペック
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specs {
    pub horsepower: String,
    pub acceleration: String,
    pub fuel_type: String,
    pub origin: String,
}

impl Specs {
    /// 全項目 "N/A" のスペック
    pub fn unknown() -> Self {
        Self {
            horsepower: UNKNOWN_SPEC.into(),
            acceleration: UNKNOWN_SPEC.into(),
            fuel_type: UNKNOWN_SPEC.into(),
            origin: UNKNOWN_SPEC.into(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        *self == Self::unknown()
    }
}

impl Default for Specs {
    fn default() -> Self {
        Self::unknown()
    }
}

/// メタデータストアの車両レコード（読み取り専用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    pub year: String,
    pub make: String,
    pub model: String,
    pub body_type: String,
    pub specs: Specs,
}

impl MetadataRecord {
    /// モデル名が欠けていれば判定ラベルで補う
    pub fn with_model_or(mut self, label: &str) -> Self {
        if self.model.trim().is_empty() {
            self.model = label.to_string();
        }
        self
    }
}

/// make/model/year の出所
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum RecordOrigin {
    /// メタデータストアに登録済み
    Database,
    /// ラベルからの推定
    #[default]
    Fallback,
}

/// 判定結果
///
/// 1回の判定につき1度だけ組み立てられ、次の投稿かリセットで丸ごと置き換わる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationResult {
    pub car_name: String,
    pub confidence: f64,
    #[serde(default)]
    pub top_predictions: Vec<Prediction>,
    pub year: String,
    pub make: String,
    pub model: String,
    pub body_type: String,
    pub specs: Specs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attention_map: Option<AttentionMapRef>,
    #[serde(default)]
    pub record_origin: RecordOrigin,
}

impl IdentificationResult {
    /// 見出し（"2012 BMW"）
    pub fn headline(&self) -> String {
        format!("{} {}", self.year, self.make)
    }
}
