//! エラー型定義

use thiserror::Error;

/// 共通エラー型
///
/// 判定パイプラインが呼び出し元へ返す失敗はこの3種のみ:
/// `ClassifierUnavailable` / `ResolverUnavailable` / `MalformedClassifierResponse`。
/// メタデータ未登録はエラーではなくフォールバック解析で回復する。
#[derive(Error, Debug)]
pub enum Error {
    #[error("Classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    #[error("Metadata store unavailable: {0}")]
    ResolverUnavailable(String),

    #[error("Malformed classifier response: {0}")]
    MalformedClassifierResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// 再試行で回復し得る失敗か
    ///
    /// 不正な判定レスポンスは判定APIの障害と同じ扱い（結果は出さない）。
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::ClassifierUnavailable(_)
                | Error::ResolverUnavailable(_)
                | Error::MalformedClassifierResponse(_)
        )
    }

    /// 判定API側の失敗か
    pub fn is_classifier_failure(&self) -> bool {
        matches!(
            self,
            Error::ClassifierUnavailable(_) | Error::MalformedClassifierResponse(_)
        )
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
