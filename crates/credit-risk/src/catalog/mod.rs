//! Weight catalog: groups of weighted questionnaire items.
//!
//! Items are stored with an explicit category so the scoring path never re-parses display
//! names. The category is derived once, when an item is defined, by splitting its display
//! name on the first `" - "`.

mod seed;

pub use seed::{default_questionnaire, GroupSeed, ItemSeed};

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Separator between the category and option label in an item display name.
pub const CATEGORY_SEPARATOR: &str = " - ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

/// Top-level weighted section of the questionnaire (`weight_b`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub weight_b: f64,
}

/// A selectable option inside a group. Items sharing `category` within one group are
/// mutually exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub group_id: GroupId,
    pub display_name: String,
    pub category: String,
    pub option: String,
    pub weight_d: f64,
    pub weight_f: f64,
}

impl Item {
    /// Contribution of this item to its group's raw score when selected.
    pub fn contribution(&self) -> f64 {
        self.weight_f * self.weight_d
    }

    pub fn category_key(&self) -> CategoryKey {
        CategoryKey {
            group_id: self.group_id,
            category: self.category.clone(),
        }
    }
}

/// A group together with its items, ordered by ascending item id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupWithItems {
    #[serde(flatten)]
    pub group: Group,
    pub items: Vec<Item>,
}

/// Identity of a cluster of mutually exclusive items.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CategoryKey {
    pub group_id: GroupId,
    pub category: String,
}

/// Splits a display name into `(category, option)` on the first separator.
///
/// Option labels may themselves contain the separator; only the first occurrence delimits
/// the category. Names without a separator form their own category with an empty option.
pub fn split_display_name(display_name: &str) -> (String, String) {
    match display_name.split_once(CATEGORY_SEPARATOR) {
        Some((category, option)) => (category.trim().to_string(), option.trim().to_string()),
        None => (display_name.trim().to_string(), String::new()),
    }
}

/// Ordered, read-only snapshot of the weight catalog.
///
/// Groups are ordered by ascending id and items within a group by ascending id. Callers
/// must not rely on any other ordering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    groups: Vec<GroupWithItems>,
}

impl Catalog {
    pub fn new(mut groups: Vec<GroupWithItems>) -> Self {
        groups.sort_by_key(|entry| entry.group.id);
        for entry in &mut groups {
            entry.items.sort_by_key(|item| item.id);
        }
        Self { groups }
    }

    pub fn groups(&self) -> &[GroupWithItems] {
        &self.groups
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.groups.iter().flat_map(|entry| entry.items.iter())
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items().find(|item| item.id == id)
    }

    /// Distinct category keys in catalog order.
    pub fn categories(&self) -> Vec<CategoryKey> {
        let mut seen = BTreeSet::new();
        let mut ordered = Vec::new();
        for item in self.items() {
            let key = item.category_key();
            if seen.insert(key.clone()) {
                ordered.push(key);
            }
        }
        ordered
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
