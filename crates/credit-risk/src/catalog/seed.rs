/// Static definition of a group used when a database is first created.
#[derive(Debug, Clone, Copy)]
pub struct GroupSeed {
    pub name: &'static str,
    pub weight_b: f64,
    pub items: &'static [ItemSeed],
}

#[derive(Debug, Clone, Copy)]
pub struct ItemSeed {
    pub display_name: &'static str,
    pub weight_d: f64,
    pub weight_f: f64,
}

const fn item(display_name: &'static str, weight_d: f64, weight_f: f64) -> ItemSeed {
    ItemSeed {
        display_name,
        weight_d,
        weight_f,
    }
}

// Category weights (`weight_d`) sum to 1 inside every group and group weights sum to 1,
// so the best answer in every category yields exactly 100.
const QUESTIONNAIRE: &[GroupSeed] = &[
    GroupSeed {
        name: "Character",
        weight_b: 0.25,
        items: &[
            item("Payment History - Always on time", 0.6, 100.0),
            item("Payment History - Occasionally late", 0.6, 60.0),
            item("Payment History - Previously defaulted", 0.6, 10.0),
            item("Employment Stability - More than 5 years", 0.4, 100.0),
            item("Employment Stability - 1 to 5 years", 0.4, 70.0),
            item("Employment Stability - Less than 1 year", 0.4, 30.0),
        ],
    },
    GroupSeed {
        name: "Capacity",
        weight_b: 0.35,
        items: &[
            item("Debt to Income - Below 30%", 0.5, 100.0),
            item("Debt to Income - 30% to 50%", 0.5, 60.0),
            item("Debt to Income - Above 50%", 0.5, 20.0),
            item("Monthly Income - Above 10 million", 0.5, 100.0),
            item("Monthly Income - 5 to 10 million", 0.5, 70.0),
            item("Monthly Income - Below 5 million", 0.5, 40.0),
        ],
    },
    GroupSeed {
        name: "Capital",
        weight_b: 0.2,
        items: &[
            item("Savings - More than 6 months of expenses", 1.0, 100.0),
            item("Savings - 1 to 6 months of expenses", 1.0, 60.0),
            item("Savings - None", 1.0, 20.0),
        ],
    },
    GroupSeed {
        name: "Collateral",
        weight_b: 0.2,
        items: &[
            item("Collateral Type - Property", 0.7, 100.0),
            item("Collateral Type - Vehicle", 0.7, 70.0),
            item("Collateral Type - None", 0.7, 20.0),
            item("Collateral Coverage - Above 100%", 0.3, 100.0),
            item("Collateral Coverage - 50% to 100%", 0.3, 60.0),
            item("Collateral Coverage - Below 50%", 0.3, 20.0),
        ],
    },
];

/// Questionnaire inserted by the initial migration.
pub fn default_questionnaire() -> &'static [GroupSeed] {
    QUESTIONNAIRE
}
