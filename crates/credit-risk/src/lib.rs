//! Credit-risk scoring for loan applications.
//!
//! Administrators register applicants, answer a weighted questionnaire for each one, and
//! receive a 0–100 score with a risk classification. The scoring engine and classifier are
//! pure; persistence sits behind the repository traits with SQLite as the shipped backend.

pub mod accounts;
pub mod applications;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod repository;
pub mod scoring;
pub mod service;
pub mod storage;
pub mod telemetry;

pub use http::api_router;
pub use service::{RiskScoringService, ScoringRequest, ServiceError};
pub use storage::SqliteStore;
