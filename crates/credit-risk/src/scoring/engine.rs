use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::catalog::{GroupId, GroupWithItems, ItemId};

/// Per-group contribution to a total score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupScore {
    pub raw_score: f64,
    pub weighted_score: f64,
}

/// Output of [`compute_score`]. No rounding is applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub total_score: f64,
    pub groups: BTreeMap<GroupId, GroupScore>,
}

/// Computes the weighted score of a selection against the catalog.
///
/// For every group, the raw score is the sum of `weight_f * weight_d` over its selected
/// items, the weighted score is `raw * weight_b`, and the total is the sum of weighted
/// scores in catalog order. Every selected item contributes even when several share a
/// category; cardinality is enforced by [`super::validate_selection`], not here.
pub fn compute_score(groups: &[GroupWithItems], selections: &BTreeSet<ItemId>) -> ScoreBreakdown {
    let mut breakdown = BTreeMap::new();
    let mut total_score = 0.0;

    for entry in groups {
        let raw_score: f64 = entry
            .items
            .iter()
            .filter(|item| selections.contains(&item.id))
            .map(|item| item.contribution())
            .sum();
        let weighted_score = raw_score * entry.group.weight_b;
        total_score += weighted_score;

        breakdown.insert(
            entry.group.id,
            GroupScore {
                raw_score,
                weighted_score,
            },
        );
    }

    ScoreBreakdown {
        total_score,
        groups: breakdown,
    }
}
