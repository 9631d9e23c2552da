//! 判定結果の表示
//!
//! 確信度ティアは表示のたびに計算する（主結果と各候補で個別に）。

use autolens_common::{
    normalize, ConfidenceTier, IdentificationResult, ImageTable, RecordOrigin, TierDisplay,
};
use serde::Serialize;

const DATABASE_CAPTION: &str = "✅ Verified specifications loaded from database.";
const FALLBACK_CAPTION: &str = "⚠️ Specifications unavailable. Name parsed from AI prediction.";

/// JSON出力の1件（ティアは出力時に付ける）
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub file_name: String,
    #[serde(flatten)]
    pub result: IdentificationResult,
    pub tier: TierDisplay,
}

impl ReportEntry {
    pub fn new(file_name: String, result: IdentificationResult) -> Self {
        let tier = ConfidenceTier::classify(result.confidence).display();
        Self { file_name, result, tier }
    }
}

/// 結果をテキストで描画する
pub fn render(result: &IdentificationResult, images: &ImageTable) -> String {
    let tier = ConfidenceTier::classify(result.confidence).display();

    let mut out = String::new();
    out.push_str(&format!("{}\n", result.headline()));
    out.push_str(&format!("  {}\n", result.model));
    out.push_str(&format!(
        "  {} 確信度: {:.2}% [{}] {}\n",
        tier.status_icon.symbol(),
        result.confidence,
        tier.label,
        tier.message
    ));
    out.push('\n');
    out.push_str(&format!("  馬力:     {}\n", result.specs.horsepower));
    out.push_str(&format!("  0-60mph:  {}\n", result.specs.acceleration));
    out.push_str(&format!("  燃料:     {}\n", result.specs.fuel_type));
    out.push_str(&format!("  生産国:   {}\n", result.specs.origin));
    out.push_str(&format!("  ボディ:   {}\n", result.body_type));

    let caption = match result.record_origin {
        RecordOrigin::Database => DATABASE_CAPTION,
        RecordOrigin::Fallback => FALLBACK_CAPTION,
    };
    out.push_str(&format!("  {}\n", caption));

    if let Some(image) = images.image_for(&normalize(result.car_name.as_str())) {
        out.push_str(&format!("  カタログ画像: {}\n", image));
    }

    if !result.top_predictions.is_empty() {
        out.push_str("\n  候補:\n");
        for (i, prediction) in result.top_predictions.iter().enumerate() {
            let tier = ConfidenceTier::classify(prediction.confidence);
            out.push_str(&format!(
                "    {}. {} {} {:.2}% [{}]\n",
                i + 1,
                tier.status_icon().symbol(),
                prediction.name,
                prediction.confidence,
                tier.label()
            ));
        }
    }

    out
}
