use super::{device_count, weighted_range, TradeCalculator};
use crate::estimation::domain::{LineItem, ProjectDescription, SpaceType, Trade, Unit};
use crate::estimation::pricing::{ExpectedRange, PricingRegistry};

const CALGREEN_PER_FIXTURE: f64 = 180.0;
const GREASE_INTERCEPTOR: f64 = 28_000.0;

/// Water heating plant sized by fixture count: (max fixtures, installed cost).
const WATER_HEATER_STEPS: [(f64, f64); 4] = [
    (20.0, 12_000.0),
    (60.0, 28_000.0),
    (150.0, 55_000.0),
    (f64::INFINITY, 95_000.0),
];

fn water_heater_cost(fixtures: f64) -> f64 {
    WATER_HEATER_STEPS
        .iter()
        .find(|(max_fixtures, _)| fixtures <= *max_fixtures)
        .map(|(_, cost)| *cost)
        .unwrap_or(95_000.0)
}

fn medical_gas_rate(space: SpaceType) -> Option<f64> {
    match space {
        SpaceType::SurgicalSuite => Some(14.0),
        SpaceType::PatientRoom => Some(8.0),
        SpaceType::MedicalExam => Some(3.0),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlumbingCalculator;

impl TradeCalculator for PlumbingCalculator {
    fn trade(&self) -> Trade {
        Trade::Plumbing
    }

    fn line_items(
        &self,
        project: &ProjectDescription,
        registry: &PricingRegistry,
    ) -> Vec<LineItem> {
        let square_footage = project.square_footage.max(0.0);
        let allocations = project.space_allocations();
        let mut items = Vec::new();
        let mut fixtures = 0.0;
        let mut piping_cost = 0.0;

        for allocation in &allocations {
            let rates = registry.space_rates(allocation.space).plumbing;
            let count = device_count(allocation.area, rates.sf_per_fixture);
            fixtures += count;
            piping_cost += allocation.area * rates.piping_per_sf;
            items.push(LineItem::new(
                format!("Plumbing Fixtures - {}", allocation.space.label()),
                count,
                Unit::Each,
                rates.fixture_cost.at(project.quality),
                "Fixtures",
            ));
        }

        let blended_piping = if square_footage > 0.0 {
            piping_cost / square_footage
        } else {
            0.0
        };
        items.push(LineItem::new(
            "Domestic Water, Waste & Vent Piping",
            square_footage,
            Unit::SquareFoot,
            blended_piping,
            "Piping",
        ));
        items.push(LineItem::lump_sum(
            format!("Water Heating Plant ({fixtures} fixtures)"),
            water_heater_cost(fixtures),
            "Equipment",
        ));

        let storage_area = project.area_of(&[SpaceType::Warehouse, SpaceType::Manufacturing]);
        let standard_area = (square_footage - storage_area).max(0.0);
        if standard_area > 0.0 {
            items.push(LineItem::new(
                "Fire Sprinkler System",
                standard_area,
                Unit::SquareFoot,
                3.75,
                "Fire Protection",
            ));
        }
        if storage_area > 0.0 {
            items.push(LineItem::new(
                "High-Piled Storage Sprinklers",
                storage_area,
                Unit::SquareFoot,
                5.25,
                "Fire Protection",
            ));
        }

        for allocation in &allocations {
            if let Some(rate) = medical_gas_rate(allocation.space) {
                items.push(LineItem::new(
                    format!("Medical Gas - {}", allocation.space.label()),
                    allocation.area,
                    Unit::SquareFoot,
                    rate,
                    "Medical Systems",
                ));
            }
        }

        if project.area_of(&[SpaceType::Kitchen, SpaceType::Restaurant]) > 0.0 {
            items.push(LineItem::lump_sum(
                "Grease Interceptor",
                GREASE_INTERCEPTOR,
                "Special Systems",
            ));
        }

        let lab_area = project.area_of(&[SpaceType::Laboratory]);
        if lab_area > 0.0 {
            items.push(LineItem::new(
                "Laboratory Acid Waste System",
                lab_area,
                Unit::SquareFoot,
                9.0,
                "Special Systems",
            ));
        }

        if project.is_california() {
            items.push(LineItem::new(
                "CALGreen Water Efficiency Upgrades",
                fixtures,
                Unit::Each,
                CALGREEN_PER_FIXTURE,
                "Code Compliance",
            ));
        }

        items
    }

    fn expected_range(
        &self,
        project: &ProjectDescription,
        registry: &PricingRegistry,
    ) -> Option<ExpectedRange> {
        weighted_range(project, registry, |rates| rates.plumbing.expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::domain::BuildingType;
    use crate::estimation::trades::test_support::{project, registry};

    #[test]
    fn water_heater_steps_by_fixture_count() {
        assert_eq!(water_heater_cost(20.0), 12_000.0);
        assert_eq!(water_heater_cost(21.0), 28_000.0);
        assert_eq!(water_heater_cost(151.0), 95_000.0);
    }

    #[test]
    fn surgical_space_adds_medical_gas() {
        let registry = registry();
        let description = project(
            BuildingType::Healthcare,
            20_000.0,
            "Nashville, TN",
            &[(SpaceType::SurgicalSuite, 0.5), (SpaceType::Office, 0.5)],
        );
        let items = PlumbingCalculator.line_items(&description, &registry);
        let gas = items
            .iter()
            .find(|item| item.name == "Medical Gas - Surgical Suite")
            .expect("medical gas");
        assert_eq!(gas.total_cost, 10_000.0 * 14.0);
        assert!(!items.iter().any(|item| item.name == "Grease Interceptor"));
    }

    #[test]
    fn kitchens_require_a_grease_interceptor() {
        let registry = registry();
        let description = project(
            BuildingType::Restaurant,
            3_500.0,
            "Austin",
            &[(SpaceType::Restaurant, 0.6), (SpaceType::Kitchen, 0.3)],
        );
        let items = PlumbingCalculator.line_items(&description, &registry);
        assert!(items.iter().any(|item| item.name == "Grease Interceptor"));
    }

    #[test]
    fn warehouse_area_uses_storage_sprinklers() {
        let registry = registry();
        let description = project(
            BuildingType::Industrial,
            100_000.0,
            "Memphis",
            &[(SpaceType::Warehouse, 0.9), (SpaceType::Office, 0.1)],
        );
        let items = PlumbingCalculator.line_items(&description, &registry);
        let storage = items
            .iter()
            .find(|item| item.name == "High-Piled Storage Sprinklers")
            .expect("storage sprinklers");
        assert!((storage.quantity - 90_000.0).abs() < 1e-6);
    }
}
