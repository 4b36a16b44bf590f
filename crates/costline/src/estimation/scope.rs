//! Expands trade subtotals into named, quantified scope systems.

use serde::Serialize;

use super::domain::{LineItem, ProjectDescription, SpaceType};
use super::pricing::{QuantityRule, ScopeItemTemplate};

/// One expanded scope line: the template's share of the trade spread over its quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeSystem {
    pub key: String,
    pub share: f64,
    #[serde(flatten)]
    pub item: LineItem,
}

fn counted(area: f64, sf_per_each: f64, minimum: f64) -> f64 {
    if sf_per_each <= 0.0 {
        return minimum.max(0.0);
    }
    (area.max(0.0) / sf_per_each).ceil().max(minimum)
}

fn override_or(
    project: &ProjectDescription,
    override_key: Option<&'static str>,
    compute: impl FnOnce() -> f64,
) -> f64 {
    override_key
        .and_then(|key| project.extra(key))
        .unwrap_or_else(compute)
}

/// Quantity produced by a rule for this project.
pub fn quantity_for(rule: &QuantityRule, project: &ProjectDescription) -> f64 {
    let quantity = match rule {
        QuantityRule::PerSquareFoot { multiplier } => project.square_footage.max(0.0) * multiplier,
        QuantityRule::PerFootprint { multiplier } => project.footprint() * multiplier,
        QuantityRule::PerFloor { per_floor } => f64::from(project.floors()) * per_floor,
        QuantityRule::PerDock {
            sf_per_dock,
            minimum,
            override_key,
        } => override_or(project, *override_key, || {
            let storage = project.area_of(&[SpaceType::Warehouse, SpaceType::Manufacturing]);
            let relevant = if storage > 0.0 {
                storage
            } else {
                project.square_footage
            };
            counted(relevant, *sf_per_dock, *minimum)
        }),
        QuantityRule::PerRestroomGroup {
            sf_per_group,
            minimum,
            override_key,
        } => override_or(project, *override_key, || {
            counted(project.square_footage, *sf_per_group, *minimum)
        }),
        QuantityRule::PerSpace {
            spaces,
            sf_per_each,
            minimum,
            override_key,
        } => override_or(project, *override_key, || {
            counted(project.area_of(spaces), *sf_per_each, *minimum)
        }),
        QuantityRule::SpaceArea { spaces } => project.area_of(spaces),
        QuantityRule::Constant(value) => *value,
    };
    if quantity.is_finite() {
        quantity.max(0.0)
    } else {
        0.0
    }
}

/// Spread `trade_subtotal` across the templates in declaration order.
///
/// Each system satisfies `quantity * unit_cost == trade_subtotal * share`; templates whose
/// quantity resolves to zero are skipped and their share stays unallocated.
pub fn expand(
    trade_subtotal: f64,
    templates: &[ScopeItemTemplate],
    project: &ProjectDescription,
    category: &str,
) -> Vec<ScopeSystem> {
    templates
        .iter()
        .filter_map(|template| {
            let quantity = quantity_for(&template.quantity, project);
            if quantity <= 0.0 {
                return None;
            }
            let allocation = trade_subtotal * template.share;
            Some(ScopeSystem {
                key: template.key.to_string(),
                share: template.share,
                item: LineItem {
                    name: template.label.to_string(),
                    quantity,
                    unit: template.unit,
                    unit_cost: allocation / quantity,
                    total_cost: allocation,
                    category: category.to_string(),
                },
            })
        })
        .collect()
}
