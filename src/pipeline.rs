//! 判定パイプライン
//!
//! 1. 判定API呼び出し（タイムアウト付き）
//! 2. ラベル正規化 → メタデータ照合（タイムアウト付き）
//! 3. 判定結果の組み立て（未登録ならフォールバック解析）
//!
//! 2は1の結果に依存するため逐次実行する。

use crate::classifier::{Classifier, ImagePayload};
use crate::config::Config;
use crate::resolver::{MetadataSource, Resolver};
use autolens_common::{assemble, normalize, ClassifierResponse, Error, IdentificationResult, ResolverOutcome};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 呼び出し元が指定するタイムアウト
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub classifier: Duration,
    pub resolver: Duration,
}

impl Timeouts {
    pub fn from_config(config: &Config) -> Self {
        Self {
            classifier: config.classifier_timeout(),
            resolver: config.resolver_timeout(),
        }
    }
}

pub struct Pipeline<C, S> {
    classifier: C,
    resolver: Resolver<S>,
    classifier_timeout: Duration,
}

impl<C: Classifier, S: MetadataSource> Pipeline<C, S> {
    pub fn new(classifier: C, source: S, timeouts: Timeouts) -> Self {
        Self {
            classifier,
            resolver: Resolver::new(source, timeouts.resolver),
            classifier_timeout: timeouts.classifier,
        }
    }

    /// 画像1枚を判定して結果を組み立てる
    ///
    /// # Errors
    /// - `ClassifierUnavailable` / `MalformedClassifierResponse` - 判定API側の失敗
    /// - `ResolverUnavailable` - 照合先の失敗（部分的な結果は返さない）
    pub async fn identify(&self, image: &ImagePayload) -> autolens_common::Result<IdentificationResult> {
        let response = self.classify(image).await?;

        let key = normalize(response.car_name.as_str());
        debug!(label = %response.car_name, key = %key, "Label normalized");

        let outcome = self.resolver.resolve(&key).await;
        if outcome == ResolverOutcome::NotFound {
            info!(key = %key, "No metadata record, deriving from label");
        }

        let result = assemble(&response, outcome, None)?;
        info!(
            file = %image.file_name,
            car = %result.car_name,
            confidence = result.confidence,
            origin = ?result.record_origin,
            "Identification assembled"
        );
        Ok(result)
    }

    /// 判定API呼び出し（タイムアウトは `ClassifierUnavailable`）
    pub async fn classify(&self, image: &ImagePayload) -> autolens_common::Result<ClassifierResponse> {
        match tokio::time::timeout(self.classifier_timeout, self.classifier.classify(image)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    file = %image.file_name,
                    timeout_ms = self.classifier_timeout.as_millis() as u64,
                    "Classifier timed out"
                );
                Err(Error::ClassifierUnavailable(format!(
                    "classifier timed out after {}ms",
                    self.classifier_timeout.as_millis()
                )))
            }
        }
    }
}
