use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::{Catalog, CategoryKey, ItemId};

/// Reasons a submitted answer set is rejected before any state changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("At least one answer is required")]
    EmptySelection,
    #[error("All categories must be answered ({answered} of {expected} answered)")]
    IncompleteSelection { expected: usize, answered: usize },
    #[error("Item {0} does not exist")]
    UnknownItem(i64),
    #[error("Only one answer is allowed for category '{category}'")]
    DuplicateCategory { category: String },
}

/// Answer set that covers every category of the catalog exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSelection {
    items: BTreeSet<ItemId>,
}

impl ValidatedSelection {
    pub fn items(&self) -> &BTreeSet<ItemId> {
        &self.items
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.iter().copied().collect()
    }
}

/// Checks a submitted answer set against the catalog.
///
/// The count check runs first so a short submission is always reported as incomplete.
/// Afterwards every item must exist and no category may be answered twice; together with
/// the count check this means each category is answered exactly once.
pub fn validate_selection(
    catalog: &Catalog,
    submitted: &[ItemId],
) -> Result<ValidatedSelection, SelectionError> {
    if submitted.is_empty() {
        return Err(SelectionError::EmptySelection);
    }

    let categories = catalog.categories();
    if submitted.len() < categories.len() {
        return Err(SelectionError::IncompleteSelection {
            expected: categories.len(),
            answered: submitted.len(),
        });
    }

    let mut answered: BTreeMap<CategoryKey, ItemId> = BTreeMap::new();
    for id in submitted {
        let item = catalog.item(*id).ok_or(SelectionError::UnknownItem(id.0))?;
        if answered.insert(item.category_key(), item.id).is_some() {
            return Err(SelectionError::DuplicateCategory {
                category: item.category.clone(),
            });
        }
    }

    Ok(ValidatedSelection {
        items: answered.into_values().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{split_display_name, Group, GroupId, GroupWithItems, Item};

    fn item(id: i64, group: i64, name: &str) -> Item {
        let (category, option) = split_display_name(name);
        Item {
            id: ItemId(id),
            group_id: GroupId(group),
            display_name: name.to_string(),
            category,
            option,
            weight_d: 1.0,
            weight_f: 50.0,
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            GroupWithItems {
                group: Group {
                    id: GroupId(1),
                    name: "Character".to_string(),
                    weight_b: 0.5,
                },
                items: vec![
                    item(1, 1, "History - Clean"),
                    item(2, 1, "History - Late"),
                    item(3, 1, "Tenure - Long"),
                    item(4, 1, "Tenure - Short"),
                ],
            },
            GroupWithItems {
                group: Group {
                    id: GroupId(2),
                    name: "Capital".to_string(),
                    weight_b: 0.5,
                },
                items: vec![item(5, 2, "History - Savings"), item(6, 2, "History - None")],
            },
        ])
    }

    fn ids(raw: &[i64]) -> Vec<ItemId> {
        raw.iter().copied().map(ItemId).collect()
    }

    #[test]
    fn accepts_one_item_per_category() {
        let selection = validate_selection(&catalog(), &ids(&[1, 4, 6])).expect("valid");
        assert_eq!(selection.item_ids(), ids(&[1, 4, 6]));
    }

    #[test]
    fn short_submission_is_incomplete() {
        assert_eq!(
            validate_selection(&catalog(), &ids(&[1, 4])),
            Err(SelectionError::IncompleteSelection {
                expected: 3,
                answered: 2
            })
        );
    }

    #[test]
    fn empty_submission_is_rejected() {
        assert_eq!(
            validate_selection(&catalog(), &[]),
            Err(SelectionError::EmptySelection)
        );
    }

    #[test]
    fn two_items_from_one_category_are_rejected() {
        assert_eq!(
            validate_selection(&catalog(), &ids(&[1, 2, 6])),
            Err(SelectionError::DuplicateCategory {
                category: "History".to_string()
            })
        );
    }

    #[test]
    fn same_category_name_in_other_group_is_distinct() {
        assert!(validate_selection(&catalog(), &ids(&[2, 3, 5])).is_ok());
    }

    #[test]
    fn repeated_item_counts_as_duplicate() {
        assert!(matches!(
            validate_selection(&catalog(), &ids(&[1, 1, 4, 6])),
            Err(SelectionError::DuplicateCategory { .. })
        ));
    }

    #[test]
    fn unknown_item_is_rejected() {
        assert_eq!(
            validate_selection(&catalog(), &ids(&[1, 4, 42])),
            Err(SelectionError::UnknownItem(42))
        );
    }
}
