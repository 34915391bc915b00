//! Weighted questionnaire scoring.
//!
//! `engine` is a pure function of the catalog and the selected items, `classifier` maps the
//! resulting total onto a risk tier, and `selection` validates a submitted answer set against
//! the catalog before anything is persisted.

mod classifier;
mod engine;
mod selection;

pub use classifier::{classify, RiskStatus};
pub use engine::{compute_score, GroupScore, ScoreBreakdown};
pub use selection::{validate_selection, SelectionError, ValidatedSelection};
