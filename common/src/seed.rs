//! スペック表からカタログを生成
//!
//! スペック表の1行（"Car Model" など表の列名のまま）を `CatalogEntry` に変換する。
//! 車名は「メーカー モデル ボディ 年式」の並びを前提に分解する。

use crate::catalog::{Catalog, CatalogEntry, ImageTable};
use crate::types::Specs;
use serde::Deserialize;

/// 2語で1メーカーになる先頭語
const TWO_WORD_MAKES: &[&str] = &["Aston", "Land", "Range", "AM", "Rolls-Royce"];

/// スペック表の1行
#[derive(Debug, Clone, Deserialize)]
pub struct SpecRow {
    #[serde(rename = "Car Model")]
    pub car_model: String,
    #[serde(rename = "Horsepower", default = "unknown")]
    pub horsepower: String,
    #[serde(rename = "Acceleration (0-60 mph)", default = "unknown")]
    pub acceleration: String,
    #[serde(rename = "Fuel Type", default = "unknown")]
    pub fuel_type: String,
    #[serde(rename = "Origin", default = "unknown")]
    pub origin: String,
    #[serde(rename = "Body Type", default)]
    pub body_type: String,
}

fn unknown() -> String {
    crate::types::UNKNOWN_SPEC.to_string()
}

/// 車名を (make, model, year) に分解する
///
/// ボディタイプの語はモデル名から取り除く（"RL Sedan" + "Sedan" → "RL"）。
pub fn parse_car_name(full_name: &str, body_type_hint: &str) -> (String, String, String) {
    let parts: Vec<&str> = full_name.split_whitespace().collect();
    let Some((year, head)) = parts.split_last() else {
        return (String::new(), String::new(), String::new());
    };

    let (make, model_start) = match head.first() {
        Some(first) if TWO_WORD_MAKES.contains(first) && head.len() >= 2 => (head[..2].join(" "), 2),
        Some(first) => (first.to_string(), 1),
        None => (String::new(), 0),
    };

    let body_words: Vec<String> = if is_blank_value(body_type_hint) {
        Vec::new()
    } else {
        body_type_hint
            .split_whitespace()
            .map(str::to_lowercase)
            .collect()
    };

    let model = head
        .get(model_start..)
        .unwrap_or_default()
        .iter()
        .filter(|token| !body_words.contains(&token.to_lowercase()))
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    (make, model, year.to_string())
}

/// 表計算ソフト由来の欠損値か
fn is_blank_value(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("nan")
}

impl SpecRow {
    pub fn to_entry(&self) -> CatalogEntry {
        let (make, model, year) = parse_car_name(&self.car_model, &self.body_type);
        let name = format!("{} {}", make, model).trim().to_string();

        CatalogEntry {
            id: self.car_model.replace('/', "_"),
            name,
            make,
            model,
            year,
            body_type: if is_blank_value(&self.body_type) {
                crate::fallback::UNKNOWN_BODY_TYPE.to_string()
            } else {
                self.body_type.trim().to_string()
            },
            specs: Specs {
                horsepower: self.horsepower.clone(),
                acceleration: self.acceleration.clone(),
                fuel_type: self.fuel_type.clone(),
                origin: self.origin.clone(),
            },
        }
    }
}

/// スペック表の行からカタログを生成（画像テーブルは引き継ぐ）
pub fn build_catalog(rows: &[SpecRow], images: ImageTable) -> Catalog {
    Catalog::new(rows.iter().map(SpecRow::to_entry).collect(), images)
}
