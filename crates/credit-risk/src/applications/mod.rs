//! Loan application records owned by admins.

pub mod domain;
pub mod views;

pub use domain::{
    parse_date, Application, ApplicationFields, ApplicationId, ApplicationInput, Gender,
};
pub use views::{
    ApplicationDetailView, ApplicationSummaryView, ScoreSummary,
    ScoringDetailView, SubmissionScoreView, SubmissionView,
};
