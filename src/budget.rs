//! Whole-trip budget validation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Itinerary;

/// Spend within this much of a ceiling counts as at the ceiling.
const AMOUNT_EPSILON: f64 = 1e-9;

/// Optional spending ceilings. Absent ceilings always pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetConstraints {
    #[serde(default)]
    pub max_total: Option<f64>,
    #[serde(default)]
    pub max_per_category: BTreeMap<String, f64>,
}

/// Summed cost estimates; activities without an estimate count as zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetBreakdown {
    pub total: f64,
    pub per_category: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "camelCase")]
pub enum BudgetScope {
    Total,
    Category(String),
}

impl fmt::Display for BudgetScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetScope::Total => f.write_str("total"),
            BudgetScope::Category(name) => write!(f, "category '{name}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetViolation {
    pub scope: BudgetScope,
    pub limit: f64,
    pub actual: f64,
    pub overage: f64,
}

impl fmt::Display for BudgetViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} spend {:.2} exceeds limit {:.2} by {:.2}",
            self.scope, self.actual, self.limit, self.overage
        )
    }
}

pub fn breakdown(itinerary: &Itinerary) -> BudgetBreakdown {
    let mut result = BudgetBreakdown::default();

    for activity in itinerary.activities() {
        let cost = activity.cost_estimate.unwrap_or(0.0);
        result.total += cost;
        *result.per_category.entry(activity.category.clone()).or_insert(0.0) += cost;
    }

    result
}

/// Check the itinerary against the ceilings.
///
/// The total is checked first, then categories in name order; the first
/// exceeded ceiling is returned.
pub fn validate(itinerary: &Itinerary, constraints: Option<&BudgetConstraints>) -> Result<BudgetBreakdown, BudgetViolation> {
    let spent = breakdown(itinerary);
    let Some(constraints) = constraints else {
        return Ok(spent);
    };

    if let Some(limit) = constraints.max_total {
        if exceeds(spent.total, limit) {
            return Err(BudgetViolation {
                scope: BudgetScope::Total,
                limit,
                actual: spent.total,
                overage: spent.total - limit,
            });
        }
    }

    for (category, &limit) in &constraints.max_per_category {
        let actual = spent.per_category.get(category).copied().unwrap_or(0.0);
        if exceeds(actual, limit) {
            return Err(BudgetViolation {
                scope: BudgetScope::Category(category.clone()),
                limit,
                actual,
                overage: actual - limit,
            });
        }
    }

    Ok(spent)
}

fn exceeds(actual: f64, limit: f64) -> bool {
    actual - limit > AMOUNT_EPSILON
}
