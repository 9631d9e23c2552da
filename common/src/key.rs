//! 判定ラベル → 正規化キー
//!
//! 1. `_` を空白へ
//! 2. `/` を `_` へ
//! 3. 前後の空白を除去
//!
//! 順序に意味がある（`/` 由来の `_` は空白に戻らない）。
//! 空や壊れたラベルは空キーになり、照合で未登録として扱われる。

use serde::{Deserialize, Serialize};
use std::fmt;

/// メタデータストアの検索キー
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// 保存済みのドキュメントIDをそのままキーとして扱う（変換規則は通さない）
    pub fn from_document_id(id: &str) -> Self {
        CanonicalKey(id.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 1件のドキュメントを指せるキーか
    ///
    /// 空のキーと `.` だけのキーはパスセグメントとして消えるため不可。
    pub fn is_addressable(&self) -> bool {
        !self.0.is_empty() && !self.0.chars().all(|c| c == '.')
    }

    /// 空白区切りのトークン
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split_whitespace()
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 正規化キーへ変換できる値
///
/// 生ラベルは変換規則を通し、既に正規化済みのキーはそのまま返す。
pub trait IntoCanonicalKey {
    fn into_canonical_key(self) -> CanonicalKey;
}

impl IntoCanonicalKey for &str {
    fn into_canonical_key(self) -> CanonicalKey {
        CanonicalKey(self.replace('_', " ").replace('/', "_").trim().to_string())
    }
}

impl IntoCanonicalKey for &String {
    fn into_canonical_key(self) -> CanonicalKey {
        self.as_str().into_canonical_key()
    }
}

impl IntoCanonicalKey for CanonicalKey {
    fn into_canonical_key(self) -> CanonicalKey {
        self
    }
}

impl IntoCanonicalKey for &CanonicalKey {
    fn into_canonical_key(self) -> CanonicalKey {
        self.clone()
    }
}

/// 判定ラベルを正規化する
///
/// # Examples
/// ```
/// use autolens_common::normalize;
///
/// assert_eq!(normalize("BMW_M3_Coupe/2012").as_str(), "BMW M3 Coupe_2012");
/// ```
pub fn normalize(label: impl IntoCanonicalKey) -> CanonicalKey {
    label.into_canonical_key()
}
