//! メタデータ照合
//!
//! 正規化キーで照合先を1件だけ引く。照合先は差し替え可能:
//! - `StaticCatalogSource`: 起動時に読み込んだ静的カタログ
//! - `HttpMetadataStore`: ドキュメントストア（HTTP）
//!
//! 通信失敗・タイムアウトは `Unavailable`、レコードなしは `NotFound` として区別する。

mod http_store;
mod static_catalog;

pub use http_store::HttpMetadataStore;
pub use static_catalog::StaticCatalogSource;

use autolens_common::{
    normalize, parse_fallback, CanonicalKey, MetadataRecord, RecordOrigin, ResolverOutcome,
};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// 正規化キー → レコードの照合先
pub trait MetadataSource: Send + Sync {
    /// レコードがなければ `Ok(None)`、照合先の障害は `Err(ResolverUnavailable)`
    fn lookup(
        &self,
        key: &CanonicalKey,
    ) -> impl Future<Output = autolens_common::Result<Option<MetadataRecord>>> + Send;
}

/// 設定で選ぶ照合先
#[derive(Debug, Clone)]
pub enum MetadataBackend {
    Catalog(StaticCatalogSource),
    Http(HttpMetadataStore),
}

impl MetadataSource for MetadataBackend {
    async fn lookup(&self, key: &CanonicalKey) -> autolens_common::Result<Option<MetadataRecord>> {
        match self {
            MetadataBackend::Catalog(source) => source.lookup(key).await,
            MetadataBackend::Http(store) => store.lookup(key).await,
        }
    }
}

/// タイムアウト付きの照合
#[derive(Debug, Clone)]
pub struct Resolver<S> {
    source: S,
    timeout: Duration,
}

impl<S: MetadataSource> Resolver<S> {
    pub fn new(source: S, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    pub async fn resolve(&self, key: &CanonicalKey) -> ResolverOutcome {
        // 空キー・"." だけのキーは照合先に問い合わせず未登録扱い
        if !key.is_addressable() {
            return ResolverOutcome::NotFound;
        }

        match tokio::time::timeout(self.timeout, self.source.lookup(key)).await {
            Ok(lookup) => {
                let outcome = ResolverOutcome::from_lookup(lookup);
                match &outcome {
                    ResolverOutcome::Found(_) => debug!(key = %key, "Metadata record found"),
                    ResolverOutcome::NotFound => debug!(key = %key, "No metadata record"),
                    ResolverOutcome::Unavailable(reason) => {
                        warn!(key = %key, reason = %reason, "Metadata store unavailable")
                    }
                }
                outcome
            }
            Err(_) => {
                warn!(key = %key, timeout_ms = self.timeout.as_millis() as u64, "Metadata lookup timed out");
                ResolverOutcome::Unavailable(format!(
                    "lookup timed out after {}ms",
                    self.timeout.as_millis()
                ))
            }
        }
    }

    /// ラベルを照合し、なければフォールバック解析する
    pub async fn resolve_label(
        &self,
        label: &str,
    ) -> autolens_common::Result<(CanonicalKey, MetadataRecord, RecordOrigin)> {
        let key = normalize(label);
        match self.resolve(&key).await {
            ResolverOutcome::Found(record) => {
                Ok((key, record.with_model_or(label), RecordOrigin::Database))
            }
            ResolverOutcome::NotFound => {
                let record = parse_fallback(&key, label);
                Ok((key, record, RecordOrigin::Fallback))
            }
            ResolverOutcome::Unavailable(reason) => {
                Err(autolens_common::Error::ResolverUnavailable(reason))
            }
        }
    }
}
