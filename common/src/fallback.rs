//! フォールバック解析
//!
//! メタデータ未登録のときに、正規化キーから make/model/year を推定する。
//! 検証済みの解析ではなく、どんな入力でも必ず結果を返す。

use crate::key::CanonicalKey;
use crate::types::{MetadataRecord, Specs};

/// 年式不明
pub const UNKNOWN_YEAR: &str = "----";
/// メーカー・ボディタイプ不明
pub const UNKNOWN_MAKE: &str = "Car";
pub const UNKNOWN_BODY_TYPE: &str = "Car";

/// 推定レコード
pub type DerivedRecord = MetadataRecord;

/// キーとラベルから推定レコードを作る
///
/// - 2トークン以上かつ末尾が数字のみ → 年式として取り出す
/// - 先頭トークン → make（なければ "Car"）
/// - 残り → model（空なら元ラベル）
/// - bodyType は "Car"、スペックは全て "N/A"
pub fn parse_fallback(key: &CanonicalKey, raw_label: &str) -> DerivedRecord {
    let mut tokens: Vec<&str> = key.tokens().collect();

    let year = match tokens.last() {
        Some(last) if tokens.len() >= 2 && is_numeric_token(last) => {
            let year = last.to_string();
            tokens.pop();
            year
        }
        _ => UNKNOWN_YEAR.to_string(),
    };

    let (make, rest) = match tokens.split_first() {
        Some((first, rest)) => (first.to_string(), rest),
        None => (UNKNOWN_MAKE.to_string(), &[][..]),
    };

    let model = if rest.is_empty() {
        raw_label.to_string()
    } else {
        rest.join(" ")
    };

    DerivedRecord {
        year,
        make,
        model,
        body_type: UNKNOWN_BODY_TYPE.to_string(),
        specs: Specs::unknown(),
    }
}

fn is_numeric_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}
