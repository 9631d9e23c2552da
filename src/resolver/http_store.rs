//! HTTPドキュメントストア
//!
//! `GET {base}/cars/{key}` でドキュメントを1件取得する。404 はレコードなし。
//! 欠けている項目は既定値で埋める（year "----", make "Car", specs "N/A"）。
//! model も carName もなければ空のまま返し、組み立て時に判定ラベルで補う。

use super::MetadataSource;
use crate::error::{AutolensError, Result};
use autolens_common::fallback::{UNKNOWN_BODY_TYPE, UNKNOWN_MAKE, UNKNOWN_YEAR};
use autolens_common::types::UNKNOWN_SPEC;
use autolens_common::{CanonicalKey, Error, MetadataRecord, Specs};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

const USER_AGENT: &str = concat!("autolens/", env!("CARGO_PKG_VERSION"));
const COLLECTION: &str = "cars";

/// 保存されているドキュメント（全項目省略可能）
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredDocument {
    year: Option<String>,
    make: Option<String>,
    model: Option<String>,
    car_name: Option<String>,
    body_type: Option<String>,
    specs: Option<StoredSpecs>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSpecs {
    horsepower: Option<String>,
    acceleration: Option<String>,
    fuel_type: Option<String>,
    origin: Option<String>,
}

impl StoredDocument {
    fn into_record(self) -> MetadataRecord {
        let specs = self.specs.unwrap_or_default();
        let or_unknown = |v: Option<String>| v.unwrap_or_else(|| UNKNOWN_SPEC.to_string());

        MetadataRecord {
            year: self.year.unwrap_or_else(|| UNKNOWN_YEAR.to_string()),
            make: self.make.unwrap_or_else(|| UNKNOWN_MAKE.to_string()),
            model: self.model.or(self.car_name).unwrap_or_default(),
            body_type: self.body_type.unwrap_or_else(|| UNKNOWN_BODY_TYPE.to_string()),
            specs: Specs {
                horsepower: or_unknown(specs.horsepower),
                acceleration: or_unknown(specs.acceleration),
                fuel_type: or_unknown(specs.fuel_type),
                origin: or_unknown(specs.origin),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpMetadataStore {
    client: Client,
    base_url: Url,
}

impl HttpMetadataStore {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| AutolensError::Config(format!("メタデータストアURLが不正: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AutolensError::Config(format!(
                "メタデータストアURLが不正: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AutolensError::Config(format!("HTTPクライアント生成エラー: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// キーに対応するドキュメントURL（キーはパスセグメントとしてエスケープ）
    pub fn document_url(&self, key: &CanonicalKey) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(COLLECTION).push(key.as_str());
        }
        url
    }
}

impl MetadataSource for HttpMetadataStore {
    async fn lookup(&self, key: &CanonicalKey) -> autolens_common::Result<Option<MetadataRecord>> {
        // コレクション全体を取りに行かない
        if !key.is_addressable() {
            return Ok(None);
        }

        let url = self.document_url(key);
        debug!(url = %url, "Fetching metadata document");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::ResolverUnavailable(format!("request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Error::ResolverUnavailable(format!("HTTP {}", status)));
        }

        // 壊れたドキュメントで部分的な結果を作らない
        let document: StoredDocument = response
            .json()
            .await
            .map_err(|e| Error::ResolverUnavailable(format!("invalid document: {}", e)))?;

        Ok(Some(document.into_record()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Resolver;
    use crate::test_support::serve_once;
    use autolens_common::{normalize, RecordOrigin};
    use std::time::Duration;

    #[test]
    fn test_document_url_escapes_key() {
        let store = HttpMetadataStore::new("http://localhost:8080/api/").unwrap();
        let url = store.document_url(&normalize("Ram_C/V_Cargo_Van_Minivan_2012"));
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/cars/Ram%20C_V%20Cargo%20Van%20Minivan%202012"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpMetadataStore::new("not a url"),
            Err(AutolensError::Config(_))
        ));
        assert!(HttpMetadataStore::new("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_full_document() {
        let json = r#"{
            "year": "2012", "make": "BMW", "model": "M3", "bodyType": "Coupe",
            "specs": {"horsepower": "414 HP", "acceleration": "4.1s", "fuelType": "Gasoline", "origin": "Germany"},
            "search_keywords": ["bmw"]
        }"#;
        let document: StoredDocument = serde_json::from_str(json).unwrap();
        let record = document.into_record();
        assert_eq!(record.model, "M3");
        assert_eq!(record.specs.fuel_type, "Gasoline");
    }

    #[test]
    fn test_sparse_document_defaults() {
        let document: StoredDocument =
            serde_json::from_str(r#"{"carName": "Audi R8", "specs": {"origin": "Germany"}}"#).unwrap();
        let record = document.into_record();
        assert_eq!(record.year, "----");
        assert_eq!(record.make, "Car");
        assert_eq!(record.model, "Audi R8");
        assert_eq!(record.body_type, "Car");
        assert_eq!(record.specs.origin, "Germany");
        assert_eq!(record.specs.horsepower, "N/A");

        // モデル名はストアでは補わない
        let empty = StoredDocument::default().into_record();
        assert_eq!(empty.model, "");
        assert!(empty.specs.is_unknown());
        assert_eq!(empty.with_model_or("Audi_R8_Coupe_2012").model, "Audi_R8_Coupe_2012");
    }

    #[tokio::test]
    async fn test_lookup_found() {
        let (base, server) = serve_once("200 OK", r#"{"year": "2012", "make": "BMW", "model": "M3"}"#).await;
        let store = HttpMetadataStore::new(&format!("{}/api", base)).unwrap();

        let record = store.lookup(&normalize("BMW_M3_Coupe_2012")).await.unwrap().unwrap();
        assert_eq!(record.year, "2012");
        assert_eq!(record.model, "M3");

        let request = server.await.unwrap();
        assert_eq!(request.request_line(), "GET /api/cars/BMW%20M3%20Coupe%202012 HTTP/1.1");
    }

    #[tokio::test]
    async fn test_missing_model_resolves_to_raw_label() {
        let (base, _server) = serve_once("200 OK", r#"{"year": "2012", "make": "BMW"}"#).await;
        let store = HttpMetadataStore::new(&base).unwrap();
        let resolver = Resolver::new(store, Duration::from_secs(5));

        let (key, record, origin) = resolver.resolve_label("BMW_M3_Coupe_2012").await.unwrap();
        assert_eq!(key.as_str(), "BMW M3 Coupe 2012");
        assert_eq!(origin, RecordOrigin::Database);
        assert_eq!(record.model, "BMW_M3_Coupe_2012");
        assert_eq!(record.make, "BMW");
    }

    #[tokio::test]
    async fn test_not_found_status() {
        let (base, _server) = serve_once("404 Not Found", r#"{"error": "not found"}"#).await;
        let store = HttpMetadataStore::new(&base).unwrap();

        let record = store.lookup(&normalize("Acura_RL_Sedan_2012")).await.unwrap();
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let (base, _server) = serve_once("500 Internal Server Error", "{}").await;
        let store = HttpMetadataStore::new(&base).unwrap();

        let err = store.lookup(&normalize("Acura_RL_Sedan_2012")).await.unwrap_err();
        assert!(matches!(err, Error::ResolverUnavailable(ref r) if r.contains("500")));
    }

    #[tokio::test]
    async fn test_unparseable_document_is_unavailable() {
        let (base, _server) = serve_once("200 OK", "not a document").await;
        let store = HttpMetadataStore::new(&base).unwrap();

        let err = store.lookup(&normalize("Acura_RL_Sedan_2012")).await.unwrap_err();
        assert!(matches!(err, Error::ResolverUnavailable(ref r) if r.starts_with("invalid document")));
    }

    #[tokio::test]
    async fn test_dot_key_never_requests_collection() {
        // 接続先がなくても問い合わせないので未登録になる
        let store = HttpMetadataStore::new("http://127.0.0.1:1/api").unwrap();
        assert_eq!(store.document_url(&normalize("..")).as_str(), "http://127.0.0.1:1/api/cars");
        assert!(store.lookup(&normalize("..")).await.unwrap().is_none());
        assert!(store.lookup(&normalize(".")).await.unwrap().is_none());
    }
}
