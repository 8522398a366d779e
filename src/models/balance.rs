//! Balance quality classification.

use serde::{Deserialize, Serialize};

/// Quality tier for a team split, derived from the score gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl BalanceQuality {
    /// Classify a score gap expressed in percent.
    pub fn from_diff_percent(diff_percent: f64) -> Self {
        if diff_percent < 1.5 {
            BalanceQuality::Excellent
        } else if diff_percent < 3.0 {
            BalanceQuality::Good
        } else if diff_percent < 5.0 {
            BalanceQuality::Fair
        } else {
            BalanceQuality::Poor
        }
    }

    /// Human-readable message for this tier.
    pub fn message(&self) -> &'static str {
        match self {
            BalanceQuality::Excellent => "Excellent balance! The teams are very evenly matched.",
            BalanceQuality::Good => "Good balance. The teams are fairly evenly matched.",
            BalanceQuality::Fair => "Acceptable balance, but it could be improved.",
            BalanceQuality::Poor => "Weak balance. Consider a different split.",
        }
    }

    /// Returns true if this tier counts as balanced.
    pub fn is_balanced(&self) -> bool {
        matches!(self, BalanceQuality::Excellent | BalanceQuality::Good)
    }
}

impl std::fmt::Display for BalanceQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BalanceQuality::Excellent => write!(f, "excellent"),
            BalanceQuality::Good => write!(f, "good"),
            BalanceQuality::Fair => write!(f, "fair"),
            BalanceQuality::Poor => write!(f, "poor"),
        }
    }
}

/// Human-facing verdict on a team split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceAssessment {
    pub quality: BalanceQuality,
    pub message: String,
    pub diff_percent: f64,
    pub is_balanced: bool,
}

impl BalanceAssessment {
    /// Assess a raw score gap (not yet multiplied by 100).
    pub fn from_diff(diff: f64) -> Self {
        let diff_percent = diff.abs() * 100.0;
        let quality = BalanceQuality::from_diff_percent(diff_percent);

        Self {
            quality,
            message: quality.message().to_string(),
            diff_percent,
            is_balanced: diff_percent < 3.0,
        }
    }
}

/// Render a percentage for display: 4 decimals below 0.01, 2 otherwise.
pub fn format_diff_percent(diff_percent: f64) -> String {
    if diff_percent < 0.01 {
        format!("{:.4}%", diff_percent)
    } else {
        format!("{:.2}%", diff_percent)
    }
}
