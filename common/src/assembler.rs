//! 判定結果の組み立て
//!
//! 判定APIのレスポンスとメタデータ照合の結果から `IdentificationResult` を作る。
//! 照合先が使えない場合は結果を作らず、呼び出し元へ再試行可能な失敗を返す。

use crate::attention::AttentionMapRef;
use crate::error::{Error, Result};
use crate::fallback::parse_fallback;
use crate::key::normalize;
use crate::types::{ClassifierResponse, IdentificationResult, MetadataRecord, RecordOrigin};

/// メタデータ照合の結果
#[derive(Debug, Clone, PartialEq)]
pub enum ResolverOutcome {
    /// 登録済みレコード
    Found(MetadataRecord),
    /// レコードなし（フォールバック解析へ）
    NotFound,
    /// 通信失敗・タイムアウト
    Unavailable(String),
}

impl ResolverOutcome {
    /// 照合処理の戻り値から変換する
    ///
    /// `Err(ResolverUnavailable)` は `Unavailable` に、それ以外のエラーもストア障害として扱う。
    pub fn from_lookup(lookup: Result<Option<MetadataRecord>>) -> Self {
        match lookup {
            Ok(Some(record)) => ResolverOutcome::Found(record),
            Ok(None) => ResolverOutcome::NotFound,
            Err(Error::ResolverUnavailable(reason)) => ResolverOutcome::Unavailable(reason),
            Err(other) => ResolverOutcome::Unavailable(other.to_string()),
        }
    }
}

/// 判定結果を組み立てる
///
/// # Arguments
/// * `response` - 判定APIのレスポンス
/// * `outcome` - メタデータ照合の結果
/// * `attention_map` - 注目領域マップ（省略時はレスポンス内のものを使う）
///
/// # Returns
/// * `Ok(IdentificationResult)` - 登録済みレコードまたはフォールバック解析の結果
/// * `Err(Error::ResolverUnavailable)` - 照合先が使えない場合
pub fn assemble(
    response: &ClassifierResponse,
    outcome: ResolverOutcome,
    attention_map: Option<AttentionMapRef>,
) -> Result<IdentificationResult> {
    let (record, record_origin) = match outcome {
        // モデル名のないドキュメントは判定ラベルをそのまま使う
        ResolverOutcome::Found(record) => {
            (record.with_model_or(&response.car_name), RecordOrigin::Database)
        }
        ResolverOutcome::NotFound => {
            let key = normalize(response.car_name.as_str());
            (parse_fallback(&key, &response.car_name), RecordOrigin::Fallback)
        }
        ResolverOutcome::Unavailable(reason) => return Err(Error::ResolverUnavailable(reason)),
    };

    Ok(IdentificationResult {
        car_name: response.car_name.clone(),
        confidence: response.confidence,
        top_predictions: response.top_predictions.clone(),
        year: record.year,
        make: record.make,
        model: record.model,
        body_type: record.body_type,
        specs: record.specs,
        attention_map: attention_map.or_else(|| response.attention_map.clone()),
        record_origin,
    })
}
