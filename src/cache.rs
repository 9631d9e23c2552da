//! 判定結果キャッシュモジュール
//!
//! 画像のSHA-256ハッシュをキーにして判定結果をキャッシュし、
//! 同じ画像の再判定をスキップする。成功した結果のみ保存する。

use crate::error::Result;
use crate::scanner::ImageInfo;
use autolens_common::IdentificationResult;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::warn;

const CACHE_FILE_NAME: &str = ".autolens-cache.json";

/// キャッシュファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheFile {
    /// バージョン（互換性チェック用）
    version: u32,
    /// ファイルハッシュ → 判定結果のマップ
    entries: HashMap<String, CacheEntry>,
}

/// キャッシュエントリ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// ファイル名
    pub file_name: String,
    /// ファイルサイズ
    pub file_size: u64,
    /// 判定日時
    pub identified_at: DateTime<Utc>,
    /// 判定結果
    pub result: IdentificationResult,
}

impl CacheFile {
    const CURRENT_VERSION: u32 = 1;

    pub fn cache_path(folder: &Path) -> PathBuf {
        folder.join(CACHE_FILE_NAME)
    }

    /// キャッシュファイルを読み込み（読めない場合は空）
    pub fn load(folder: &Path) -> Self {
        let cache_path = Self::cache_path(folder);
        if !cache_path.exists() {
            return Self::default();
        }

        let file = match File::open(&cache_path) {
            Ok(f) => f,
            Err(_) => return Self::default(),
        };

        let reader = BufReader::new(file);
        match serde_json::from_reader::<_, CacheFile>(reader) {
            Ok(cache) => {
                // バージョンチェック
                if cache.version != Self::CURRENT_VERSION {
                    warn!(
                        found = cache.version,
                        expected = Self::CURRENT_VERSION,
                        "Cache version mismatch, starting fresh"
                    );
                    return Self::default();
                }
                cache
            }
            Err(e) => {
                warn!(path = %cache_path.display(), error = %e, "Unreadable cache file, starting fresh");
                Self::default()
            }
        }
    }

    /// キャッシュファイルを保存
    pub fn save(&self, folder: &Path) -> Result<()> {
        let file = File::create(Self::cache_path(folder))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// キャッシュファイルを削除（存在しなければ `Ok(false)`）
    pub fn clear(folder: &Path) -> Result<bool> {
        let cache_path = Self::cache_path(folder);
        if !cache_path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(cache_path)?;
        Ok(true)
    }

    /// キャッシュをルックアップ
    pub fn get(&self, hash: &str) -> Option<&IdentificationResult> {
        self.entries.get(hash).map(|e| &e.result)
    }

    /// キャッシュに追加
    pub fn insert(&mut self, hash: String, file_name: String, file_size: u64, result: IdentificationResult) {
        self.entries.insert(hash, CacheEntry {
            file_name,
            file_size,
            identified_at: Utc::now(),
            result,
        });
    }

    /// キャッシュ件数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CacheFile {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// 画像ファイルのハッシュを計算（SHA-256, hex）
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// キャッシュ済みの画像と未判定の画像に分ける
///
/// - キャッシュにある画像は結果と組で返す
/// - ない画像はハッシュと組で返す（ハッシュ計算に失敗した場合は空文字）
pub fn filter_cached_images(
    images: &[ImageInfo],
    cache: &CacheFile,
) -> (Vec<(ImageInfo, IdentificationResult)>, Vec<(ImageInfo, String)>) {
    let hashed: Vec<(ImageInfo, Option<String>)> = images
        .par_iter()
        .map(|img| (img.clone(), compute_file_hash(&img.path).ok()))
        .collect();

    let mut cached_results = Vec::new();
    let mut uncached_images = Vec::new();

    for (img, hash) in hashed {
        match hash {
            Some(hash) => match cache.get(&hash) {
                Some(result) => cached_results.push((img, result.clone())),
                None => uncached_images.push((img, hash)),
            },
            // ハッシュ計算失敗時は未キャッシュとして扱う
            None => uncached_images.push((img, String::new())),
        }
    }

    (cached_results, uncached_images)
}
