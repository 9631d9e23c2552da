//! 静的カタログ
//!
//! 起動時に一度だけ読み込む不変のテーブル。
//! - `CatalogEntry`: 車両エントリ（メタデータレコードの静的版）
//! - `ImageTable`: カタログキー → 表示用画像パス
//!
//! 照合先として使う場合は `lookup` が `MetadataRecord` を返す。

use crate::error::Result;
use crate::key::CanonicalKey;
use crate::types::{MetadataRecord, Specs};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// 地域フィルタで「全て」を表す値
pub const ALL_REGIONS: &str = "All";

/// カタログの車両エントリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// ドキュメントID（正規化キー）
    pub id: String,
    /// 表示名（"BMW M3 Coupe"）
    pub name: String,
    pub make: String,
    pub model: String,
    pub year: String,
    #[serde(default = "default_body_type")]
    pub body_type: String,
    #[serde(default)]
    pub specs: Specs,
}

fn default_body_type() -> String {
    crate::fallback::UNKNOWN_BODY_TYPE.to_string()
}

impl CatalogEntry {
    pub fn key(&self) -> CanonicalKey {
        CanonicalKey::from_document_id(&self.id)
    }

    /// 地域（= 生産国）
    pub fn region(&self) -> &str {
        &self.specs.origin
    }

    pub fn to_record(&self) -> MetadataRecord {
        MetadataRecord {
            year: self.year.clone(),
            make: self.make.clone(),
            model: self.model.clone(),
            body_type: self.body_type.clone(),
            specs: self.specs.clone(),
        }
    }

    /// 名前・メーカー（大文字小文字無視）または年式に部分一致するか
    fn matches_query(&self, query_lower: &str, query: &str) -> bool {
        self.name.to_lowercase().contains(query_lower)
            || self.make.to_lowercase().contains(query_lower)
            || self.year.contains(query)
    }

    fn matches_region(&self, region: &str) -> bool {
        region.is_empty() || region == ALL_REGIONS || self.region() == region
    }
}

/// カタログキー → 画像パスの不変テーブル
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageTable(HashMap<String, String>);

impl ImageTable {
    pub fn new(map: HashMap<String, String>) -> Self {
        Self(map)
    }

    pub fn image_for(&self, key: &CanonicalKey) -> Option<&str> {
        self.0.get(key.as_str()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// カタログファイルの構造
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub cars: Vec<CatalogEntry>,
    #[serde(default)]
    pub images: ImageTable,
}

/// 静的カタログ
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    images: ImageTable,
    index: HashMap<CanonicalKey, usize>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>, images: ImageTable) -> Self {
        // 同じキーが重複した場合は後勝ち
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.key(), i))
            .collect();

        Self { entries, images, index }
    }

    /// JSONファイルから読み込み
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Ok(file.into())
    }

    pub fn to_file(&self) -> CatalogFile {
        CatalogFile {
            cars: self.entries.clone(),
            images: self.images.clone(),
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn images(&self) -> &ImageTable {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &CanonicalKey) -> Option<&CatalogEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    /// 正規化キーでレコードを引く
    pub fn lookup(&self, key: &CanonicalKey) -> Option<MetadataRecord> {
        self.get(key).map(CatalogEntry::to_record)
    }

    /// 検索語と地域で絞り込む
    ///
    /// 検索語は名前・メーカー・年式への部分一致、地域は完全一致（"All" は全件）。
    pub fn search(&self, query: &str, region: &str) -> Vec<&CatalogEntry> {
        let query = query.trim();
        let query_lower = query.to_lowercase();

        self.entries
            .iter()
            .filter(|e| e.matches_query(&query_lower, query))
            .filter(|e| e.matches_region(region))
            .collect()
    }

    /// 地域フィルタの選択肢（先頭は "All"）
    pub fn regions(&self) -> Vec<String> {
        let distinct: BTreeSet<&str> = self
            .entries
            .iter()
            .map(CatalogEntry::region)
            .filter(|r| !r.is_empty() && *r != crate::types::UNKNOWN_SPEC)
            .collect();

        std::iter::once(ALL_REGIONS.to_string())
            .chain(distinct.into_iter().map(String::from))
            .collect()
    }
}

impl From<CatalogFile> for Catalog {
    fn from(file: CatalogFile) -> Self {
        Catalog::new(file.cars, file.images)
    }
}
