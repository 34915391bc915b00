use std::fmt;

use serde::{Deserialize, Serialize};

/// Totals at or below this value are high risk.
const HIGH_RISK_CEILING: f64 = 55.0;
/// Totals above [`HIGH_RISK_CEILING`] and at or below this value are medium risk.
const MEDIUM_RISK_CEILING: f64 = 70.0;

/// Three-tier risk label derived from a total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskStatus {
    #[serde(rename = "LOW RISK")]
    LowRisk,
    #[serde(rename = "MEDIUM RISK")]
    MediumRisk,
    #[serde(rename = "HIGH RISK")]
    HighRisk,
}

impl RiskStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RiskStatus::LowRisk => "LOW RISK",
            RiskStatus::MediumRisk => "MEDIUM RISK",
            RiskStatus::HighRisk => "HIGH RISK",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "LOW RISK" => Some(RiskStatus::LowRisk),
            "MEDIUM RISK" => Some(RiskStatus::MediumRisk),
            "HIGH RISK" => Some(RiskStatus::HighRisk),
            _ => None,
        }
    }
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps a total score onto a risk tier.
///
/// `s <= 55` is high risk, `55 < s <= 70` medium risk, `s > 70` low risk.
pub fn classify(total_score: f64) -> RiskStatus {
    match total_score {
        s if s <= HIGH_RISK_CEILING => RiskStatus::HighRisk,
        s if s <= MEDIUM_RISK_CEILING => RiskStatus::MediumRisk,
        _ => RiskStatus::LowRisk,
    }
}
