//! Trade cost calculators.
//!
//! Each calculator prices its own line items from the space mix and the pricing registry;
//! the shared [`TradeCalculator::calculate`] then applies the regional and classification
//! factors once to the whole trade and benchmarks the result.

mod electrical;
mod finishes;
mod hvac;
mod plumbing;
mod site;
mod structural;

pub use electrical::ElectricalCalculator;
pub use finishes::FinishesCalculator;
pub use hvac::HvacCalculator;
pub use plumbing::PlumbingCalculator;
pub use site::SiteCalculator;
pub use structural::StructuralCalculator;

use tracing::debug;

use super::domain::{
    LineItem, ProjectClassification, ProjectDescription, Trade, TradeResult, ValidationLevel,
    ValidationMessage,
};
use super::pricing::{ExpectedRange, PricingRegistry, SpaceRates};

pub trait TradeCalculator: Send + Sync {
    fn trade(&self) -> Trade;

    /// Unadjusted line items in national-average dollars.
    fn line_items(&self, project: &ProjectDescription, registry: &PricingRegistry) -> Vec<LineItem>;

    /// Benchmark cost per square foot before regional adjustment.
    fn expected_range(
        &self,
        project: &ProjectDescription,
        registry: &PricingRegistry,
    ) -> Option<ExpectedRange>;

    fn calculate(&self, project: &ProjectDescription, registry: &PricingRegistry) -> TradeResult {
        let trade = self.trade();
        let base_items = self.line_items(project, registry);
        let pre_regional_subtotal: f64 = base_items.iter().map(|item| item.total_cost).sum();

        let regional = registry.regional().resolve(&project.location);
        let classification_factor = classification_factor(project.classification, trade);
        let factor = regional.multiplier * classification_factor;

        let line_items: Vec<LineItem> = base_items.iter().map(|item| item.scaled(factor)).collect();
        let subtotal: f64 = line_items.iter().map(|item| item.total_cost).sum();
        let cost_per_sqft = per_square_foot(subtotal, project.square_footage);

        let validation = validate(
            trade,
            cost_per_sqft,
            project.square_footage,
            self.expected_range(project, registry)
                .map(|range| ExpectedRange::new(range.low * factor, range.high * factor)),
        );

        debug!(
            trade = trade.key(),
            items = line_items.len(),
            pre_regional_subtotal,
            regional_multiplier = regional.multiplier,
            classification_factor,
            subtotal,
            "trade priced"
        );

        TradeResult {
            trade,
            line_items,
            pre_regional_subtotal,
            regional_multiplier: regional.multiplier,
            classification_factor,
            stress_factor: 1.0,
            subtotal,
            cost_per_sqft,
            validation: vec![validation],
        }
    }
}

/// Calculator responsible for a trade.
pub fn calculator_for(trade: Trade) -> &'static dyn TradeCalculator {
    match trade {
        Trade::Structural => &StructuralCalculator,
        Trade::Mechanical => &HvacCalculator,
        Trade::Electrical => &ElectricalCalculator,
        Trade::Plumbing => &PlumbingCalculator,
        Trade::Finishes => &FinishesCalculator,
        Trade::Site => &SiteCalculator,
    }
}

/// Trades priced for a project, in calculation order.
pub fn trades_for(project: &ProjectDescription) -> Vec<Trade> {
    let site_work = project.building_type.includes_site_work()
        && project.classification == ProjectClassification::GroundUp;
    Trade::ordered()
        .into_iter()
        .filter(|trade| *trade != Trade::Site || site_work)
        .collect()
}

/// Scope of work relative to ground-up construction, per trade.
pub fn classification_factor(classification: ProjectClassification, trade: Trade) -> f64 {
    match classification {
        ProjectClassification::GroundUp => 1.0,
        ProjectClassification::Addition => match trade {
            Trade::Structural => 1.08,
            Trade::Mechanical | Trade::Electrical | Trade::Plumbing => 1.05,
            Trade::Finishes => 1.0,
            Trade::Site => 0.6,
        },
        ProjectClassification::Renovation => match trade {
            Trade::Structural => 0.40,
            Trade::Mechanical => 0.85,
            Trade::Electrical => 0.80,
            Trade::Plumbing => 0.85,
            Trade::Finishes => 0.90,
            Trade::Site => 0.25,
        },
    }
}

pub(crate) fn per_square_foot(amount: f64, square_footage: f64) -> f64 {
    if square_footage > 0.0 {
        amount / square_footage
    } else {
        0.0
    }
}

/// Devices needed to cover an area: `ceil(area / density)`, at least one when the space exists.
pub(crate) fn device_count(area: f64, sf_per_device: f64) -> f64 {
    if area <= 0.0 || sf_per_device <= 0.0 {
        return 0.0;
    }
    (area / sf_per_device).ceil().max(1.0)
}

/// Mix-weighted benchmark across the project's spaces.
pub(crate) fn weighted_range(
    project: &ProjectDescription,
    registry: &PricingRegistry,
    pick: impl Fn(&SpaceRates) -> ExpectedRange,
) -> Option<ExpectedRange> {
    let allocations = project.space_allocations();
    if allocations.is_empty() {
        return None;
    }
    let (low, high) = allocations.iter().fold((0.0, 0.0), |(low, high), allocation| {
        let range = pick(registry.space_rates(allocation.space));
        (
            low + range.low * allocation.fraction,
            high + range.high * allocation.fraction,
        )
    });
    Some(ExpectedRange::new(low, high))
}

fn validate(
    trade: Trade,
    cost_per_sqft: f64,
    square_footage: f64,
    expected: Option<ExpectedRange>,
) -> ValidationMessage {
    let label = trade.label();
    if square_footage <= 0.0 {
        return ValidationMessage {
            level: ValidationLevel::Info,
            message: format!("{label}: square footage is zero, cost per SF not benchmarked"),
        };
    }
    let Some(range) = expected else {
        return ValidationMessage {
            level: ValidationLevel::Info,
            message: format!("{label}: no benchmark range configured"),
        };
    };

    let band = format!("${:.2}-${:.2}/SF", range.low, range.high);
    if cost_per_sqft < range.low {
        ValidationMessage {
            level: ValidationLevel::Warning,
            message: format!(
                "{label}: ${cost_per_sqft:.2}/SF is below the expected {band} for this building mix"
            ),
        }
    } else if cost_per_sqft > range.high {
        ValidationMessage {
            level: ValidationLevel::Warning,
            message: format!(
                "{label}: ${cost_per_sqft:.2}/SF is above the expected {band} for this building mix"
            ),
        }
    } else {
        ValidationMessage {
            level: ValidationLevel::Success,
            message: format!("{label}: ${cost_per_sqft:.2}/SF is within the expected {band}"),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::BTreeMap;

    use crate::estimation::domain::{
        BuildingType, ProjectClassification, ProjectDescription, QualityLevel, SpaceType,
    };
    use crate::estimation::pricing::PricingRegistry;

    pub fn registry() -> PricingRegistry {
        PricingRegistry::standard().expect("embedded tables are consistent")
    }

    pub fn project(
        building_type: BuildingType,
        square_footage: f64,
        location: &str,
        mix: &[(SpaceType, f64)],
    ) -> ProjectDescription {
        ProjectDescription {
            building_type,
            subtype: String::new(),
            square_footage,
            location: location.to_string(),
            classification: ProjectClassification::GroundUp,
            building_mix: mix.iter().copied().collect(),
            special_requirements: String::new(),
            num_floors: 1,
            quality: QualityLevel::Standard,
            extras: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::test_support::{project, registry};
    use crate::estimation::domain::{BuildingType, SpaceType};

    fn assert_additive(result: &TradeResult) {
        let sum: f64 = result.line_items.iter().map(|item| item.total_cost).sum();
        assert!(
            (sum - result.subtotal).abs() <= 1e-6 * result.subtotal.abs().max(1.0),
            "{:?}: items {sum} vs subtotal {}",
            result.trade,
            result.subtotal
        );
    }

    #[test]
    fn every_calculator_is_additive_after_regional_scaling() {
        let registry = registry();
        let description = project(
            BuildingType::Restaurant,
            65_000.0,
            "Los Angeles, CA",
            &[
                (SpaceType::SurgicalSuite, 0.35),
                (SpaceType::PatientRoom, 0.2),
                (SpaceType::Kitchen, 0.05),
            ],
        );
        for trade in Trade::ordered() {
            let result = calculator_for(trade).calculate(&description, &registry);
            assert!(!result.line_items.is_empty(), "{trade:?} priced nothing");
            assert_additive(&result);
            let expected = result.pre_regional_subtotal * result.regional_multiplier;
            assert!((result.subtotal - expected).abs() < 1e-6 * expected);
        }
    }

    #[test]
    fn renovation_scales_structural_work_down() {
        let registry = registry();
        let ground_up = project(BuildingType::Office, 40_000.0, "Denver, CO", &[]);
        let mut renovation = ground_up.clone();
        renovation.classification = ProjectClassification::Renovation;

        let new_build = StructuralCalculator.calculate(&ground_up, &registry);
        let remodel = StructuralCalculator.calculate(&renovation, &registry);
        assert!((remodel.subtotal - new_build.subtotal * 0.40).abs() < 1e-6 * new_build.subtotal);
        assert_additive(&remodel);
    }

    #[test]
    fn zero_square_footage_degrades_without_panicking() {
        let registry = registry();
        let empty = project(BuildingType::Office, 0.0, "Nowhere", &[]);
        for trade in Trade::ordered() {
            let result = calculator_for(trade).calculate(&empty, &registry);
            assert_eq!(result.cost_per_sqft, 0.0);
            assert!(result.subtotal.is_finite());
            assert_eq!(result.validation[0].level, ValidationLevel::Info);
        }
    }

    #[test]
    fn site_trade_only_for_ground_up_site_work_types() {
        let mut warehouse = project(BuildingType::Industrial, 100_000.0, "Memphis", &[]);
        assert!(trades_for(&warehouse).contains(&Trade::Site));
        warehouse.classification = ProjectClassification::Renovation;
        assert!(!trades_for(&warehouse).contains(&Trade::Site));

        let office = project(BuildingType::Office, 100_000.0, "Memphis", &[]);
        assert_eq!(trades_for(&office).len(), 5);
    }

    #[test]
    fn device_counts_round_up_with_minimum_of_one() {
        assert_eq!(device_count(10.0, 400.0), 1.0);
        assert_eq!(device_count(801.0, 400.0), 3.0);
        assert_eq!(device_count(0.0, 400.0), 0.0);
    }
}
