//! 確信度ティア
//!
//! 数値の確信度を表示用の4段階に分類する。永続化はせず、表示のたびに再計算する。
//! 主結果と各候補に同じ閾値を個別に適用する。

use serde::Serialize;
use std::fmt;

/// 閾値（上から順に評価、最初に一致したもの）
pub const EXCELLENT_THRESHOLD: f64 = 90.0;
pub const HIGH_THRESHOLD: f64 = 75.0;
pub const MEDIUM_THRESHOLD: f64 = 50.0;

/// 確信度ティア
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfidenceTier {
    Excellent,
    High,
    Medium,
    Low,
}

/// ステータスアイコン
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusIcon {
    CheckCircle,
    AlertCircle,
}

impl StatusIcon {
    /// 端末表示用の記号
    pub fn symbol(&self) -> &'static str {
        match self {
            StatusIcon::CheckCircle => "✔",
            StatusIcon::AlertCircle => "⚠",
        }
    }
}

impl ConfidenceTier {
    /// 確信度（0–100）からティアを求める
    ///
    /// NaNや負数は Low。
    pub fn classify(confidence: f64) -> Self {
        if confidence >= EXCELLENT_THRESHOLD {
            ConfidenceTier::Excellent
        } else if confidence >= HIGH_THRESHOLD {
            ConfidenceTier::High
        } else if confidence >= MEDIUM_THRESHOLD {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceTier::Excellent => "Excellent Match",
            ConfidenceTier::High => "High Confidence",
            ConfidenceTier::Medium => "Medium Confidence",
            ConfidenceTier::Low => "Low Confidence",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ConfidenceTier::Excellent => "AI is extremely confident in this result",
            ConfidenceTier::High => "AI is highly confident in this result",
            ConfidenceTier::Medium => "Medium confidence, check the visual details",
            ConfidenceTier::Low => "Low confidence, results may be inaccurate",
        }
    }

    /// 数値・見出し用の強調色
    pub fn emphasis_color(&self) -> &'static str {
        match self {
            ConfidenceTier::Excellent => "text-green-400",
            ConfidenceTier::High => "text-emerald-400",
            ConfidenceTier::Medium => "text-yellow-400",
            ConfidenceTier::Low => "text-red-400",
        }
    }

    /// バー・ステータス背景色
    pub fn status_color(&self) -> &'static str {
        match self {
            ConfidenceTier::Excellent => "bg-green-400",
            ConfidenceTier::High => "bg-emerald-400",
            ConfidenceTier::Medium => "bg-yellow-400",
            ConfidenceTier::Low => "bg-red-400",
        }
    }

    pub fn status_icon(&self) -> StatusIcon {
        match self {
            ConfidenceTier::Excellent | ConfidenceTier::High => StatusIcon::CheckCircle,
            ConfidenceTier::Medium | ConfidenceTier::Low => StatusIcon::AlertCircle,
        }
    }

    /// 表示用の値一式
    pub fn display(&self) -> TierDisplay {
        TierDisplay {
            tier: *self,
            label: self.label(),
            message: self.message(),
            emphasis_color: self.emphasis_color(),
            status_color: self.status_color(),
            status_icon: self.status_icon(),
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 表示層へ渡すティア情報
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierDisplay {
    pub tier: ConfidenceTier,
    pub label: &'static str,
    pub message: &'static str,
    pub emphasis_color: &'static str,
    pub status_color: &'static str,
    pub status_icon: StatusIcon,
}

/// `ConfidenceTier::classify` の関数形
pub fn classify(confidence: f64) -> ConfidenceTier {
    ConfidenceTier::classify(confidence)
}
