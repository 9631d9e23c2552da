//! 判定APIレスポンスパーサー
//!
//! 必須項目（`carName`, `confidence`）が欠けたレスポンスは
//! `MalformedClassifierResponse` として扱い、部分的な結果は作らない。

use crate::attention::AttentionMapRef;
use crate::error::{Error, Result};
use crate::types::{ClassifierResponse, Prediction};
use serde::Deserialize;

/// 受信時の形（全項目省略可能として受け、後で検証する）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    car_name: Option<String>,
    confidence: Option<f64>,
    #[serde(default)]
    top_predictions: Option<Vec<Prediction>>,
    #[serde(default)]
    heatmap_image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: String,
}

/// 判定APIのレスポンス本文をパース
///
/// # Arguments
/// * `body` - レスポンス本文（JSON）
///
/// # Returns
/// * `Ok(ClassifierResponse)` - パース成功
/// * `Err(Error::MalformedClassifierResponse)` - JSONでない、または必須項目が欠けている
///
/// # Examples
/// ```
/// use autolens_common::parse_classifier_response;
///
/// let body = r#"{"carName": "Audi_R8_Coupe_2012", "confidence": 88.1, "topPredictions": []}"#;
/// let response = parse_classifier_response(body).unwrap();
/// assert_eq!(response.car_name, "Audi_R8_Coupe_2012");
/// ```
pub fn parse_classifier_response(body: &str) -> Result<ClassifierResponse> {
    let wire: WireResponse = serde_json::from_str(body.trim())
        .map_err(|e| Error::MalformedClassifierResponse(format!("JSONパースエラー: {}", e)))?;

    let car_name = wire
        .car_name
        .ok_or_else(|| Error::MalformedClassifierResponse("carName がありません".into()))?;

    let confidence = wire
        .confidence
        .ok_or_else(|| Error::MalformedClassifierResponse("confidence がありません".into()))?;

    if !confidence.is_finite() {
        return Err(Error::MalformedClassifierResponse(format!(
            "confidence が不正です: {}",
            confidence
        )));
    }

    Ok(ClassifierResponse {
        car_name,
        confidence,
        top_predictions: wire.top_predictions.unwrap_or_default(),
        attention_map: wire
            .heatmap_image
            .filter(|s| !s.trim().is_empty())
            .map(AttentionMapRef::new),
    })
}

/// エラーレスポンス `{"error": "..."}` からメッセージを取り出す
pub fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<WireError>(body.trim())
        .ok()
        .map(|e| e.error)
}
