use super::TradeCalculator;
use crate::estimation::domain::{LineItem, ProjectDescription, QualityLevel, Trade, Unit};
use crate::estimation::pricing::{ExpectedRange, PricingRegistry};

/// Frame premium per floor above grade.
const MULTI_STORY_PREMIUM: f64 = 0.03;

fn envelope_quality_factor(quality: QualityLevel) -> f64 {
    match quality {
        QualityLevel::Economy => 0.85,
        QualityLevel::Standard => 1.0,
        QualityLevel::Premium => 1.25,
    }
}

/// Exterior wall area from a square footprint.
pub(crate) fn exterior_wall_area(project: &ProjectDescription, floor_to_floor_ft: f64) -> f64 {
    let perimeter = 4.0 * project.footprint().sqrt();
    perimeter * floor_to_floor_ft * f64::from(project.floors())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralCalculator;

impl TradeCalculator for StructuralCalculator {
    fn trade(&self) -> Trade {
        Trade::Structural
    }

    fn line_items(
        &self,
        project: &ProjectDescription,
        registry: &PricingRegistry,
    ) -> Vec<LineItem> {
        let rates = registry.building_type(project.building_type).structural;
        let footprint = project.footprint();
        let floors = project.floors();
        let frame_premium = 1.0 + MULTI_STORY_PREMIUM * f64::from(floors - 1);

        vec![
            LineItem::new(
                "Foundations & Slab on Grade",
                footprint,
                Unit::SquareFoot,
                rates.foundation_per_sf,
                "Substructure",
            ),
            LineItem::new(
                format!("Superstructure ({floors} floors)"),
                project.square_footage,
                Unit::SquareFoot,
                rates.frame_per_sf * frame_premium,
                "Superstructure",
            ),
            LineItem::new(
                "Roof Structure & Membrane",
                footprint,
                Unit::SquareFoot,
                rates.roof_per_sf,
                "Roofing",
            ),
            LineItem::new(
                "Exterior Envelope",
                exterior_wall_area(project, rates.floor_to_floor_ft),
                Unit::SquareFoot,
                rates.envelope_per_sf * envelope_quality_factor(project.quality),
                "Envelope",
            ),
        ]
    }

    fn expected_range(
        &self,
        project: &ProjectDescription,
        registry: &PricingRegistry,
    ) -> Option<ExpectedRange> {
        Some(registry.building_type(project.building_type).structural.expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::domain::{BuildingType, ValidationLevel};
    use crate::estimation::trades::test_support::{project, registry};

    #[test]
    fn frame_premium_grows_with_floor_count() {
        let registry = registry();
        let mut low_rise = project(BuildingType::Office, 60_000.0, "Atlanta", &[]);
        low_rise.num_floors = 1;
        let mut mid_rise = low_rise.clone();
        mid_rise.num_floors = 5;

        let frame_rate = |description: &ProjectDescription| {
            StructuralCalculator.line_items(description, &registry)[1].unit_cost
        };
        assert!((frame_rate(&mid_rise) / frame_rate(&low_rise) - 1.12).abs() < 1e-9);
    }

    #[test]
    fn foundations_are_priced_on_the_footprint() {
        let registry = registry();
        let mut description = project(BuildingType::Office, 60_000.0, "Atlanta", &[]);
        description.num_floors = 3;
        let items = StructuralCalculator.line_items(&description, &registry);
        assert_eq!(items[0].quantity, 20_000.0);
    }

    #[test]
    fn typical_office_lands_in_benchmark_range() {
        let registry = registry();
        let mut description = project(BuildingType::Office, 65_000.0, "Kansas", &[]);
        description.num_floors = 3;
        let result = StructuralCalculator.calculate(&description, &registry);
        assert_eq!(result.validation[0].level, ValidationLevel::Success);
    }
}
