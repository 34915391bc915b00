use serde::Serialize;

use super::domain::Application;
use crate::repository::{AnswerDetail, Score};
use crate::scoring::RiskStatus;

/// Score fields exposed in application listings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub total_score: f64,
    pub status: RiskStatus,
}

impl From<&Score> for ScoreSummary {
    fn from(score: &Score) -> Self {
        Self {
            total_score: score.total_score,
            status: score.status,
        }
    }
}

/// Listing entry; `score` is omitted for applications that were never scored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationSummaryView {
    #[serde(flatten)]
    pub application: Application,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreSummary>,
}

/// Single application with its full score record when present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationDetailView {
    #[serde(flatten)]
    pub application: Application,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubmissionScoreView {
    pub total_score: f64,
    pub status: RiskStatus,
    pub risk_level: RiskStatus,
}

/// Outcome of a scoring submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionView {
    pub message: &'static str,
    pub score: SubmissionScoreView,
    #[serde(skip_serializing)]
    pub created: bool,
}

impl SubmissionView {
    pub fn new(total_score: f64, status: RiskStatus, created: bool) -> Self {
        Self {
            message: if created {
                "Scoring saved"
            } else {
                "Scoring updated"
            },
            score: SubmissionScoreView {
                total_score,
                status,
                risk_level: status,
            },
            created,
        }
    }
}

/// Application, its score, and every recorded answer with item and group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringDetailView {
    pub application: Application,
    pub score: Score,
    pub details: Vec<AnswerDetail>,
}
