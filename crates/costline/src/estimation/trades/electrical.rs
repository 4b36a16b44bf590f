use super::{device_count, weighted_range, TradeCalculator};
use crate::estimation::domain::{BuildingType, LineItem, ProjectDescription, Trade, Unit};
use crate::estimation::pricing::{ExpectedRange, PricingRegistry};

const CIRCUIT_COST: f64 = 450.0;
const HIGH_LOAD_SERVICE_BUMP: f64 = 0.25;
const HIGH_LOAD_GENERATOR: f64 = 0.20;

/// Service sizes stepped by gross square footage: (max SF, amps, installed cost).
const SERVICE_STEPS: [(f64, u32, f64); 6] = [
    (10_000.0, 400, 25_000.0),
    (25_000.0, 800, 55_000.0),
    (50_000.0, 1_200, 95_000.0),
    (100_000.0, 2_000, 165_000.0),
    (200_000.0, 3_000, 260_000.0),
    (f64::INFINITY, 4_000, 380_000.0),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ElectricalCalculator;

fn service_step(square_footage: f64, high_load_share: f64) -> (u32, f64) {
    let index = SERVICE_STEPS
        .iter()
        .position(|(max_sf, _, _)| square_footage <= *max_sf)
        .unwrap_or(SERVICE_STEPS.len() - 1);
    let index = if high_load_share > HIGH_LOAD_SERVICE_BUMP {
        (index + 1).min(SERVICE_STEPS.len() - 1)
    } else {
        index
    };
    let (_, amps, cost) = SERVICE_STEPS[index];
    (amps, cost)
}

impl TradeCalculator for ElectricalCalculator {
    fn trade(&self) -> Trade {
        Trade::Electrical
    }

    fn line_items(
        &self,
        project: &ProjectDescription,
        registry: &PricingRegistry,
    ) -> Vec<LineItem> {
        let square_footage = project.square_footage.max(0.0);
        let mut items = Vec::new();
        let mut high_load_area = 0.0;

        for allocation in project.space_allocations() {
            let rates = registry.space_rates(allocation.space).electrical;
            let label = allocation.space.label();
            if rates.high_load {
                high_load_area += allocation.area;
            }

            items.push(LineItem::new(
                format!("Power & Lighting - {label}"),
                allocation.area,
                Unit::SquareFoot,
                rates.per_sf.at(project.quality),
                "Power & Lighting",
            ));
            items.push(LineItem::new(
                format!("Lighting Fixtures - {label}"),
                device_count(allocation.area, rates.sf_per_fixture),
                Unit::Each,
                rates.fixture_cost,
                "Devices",
            ));
            items.push(LineItem::new(
                format!("Branch Circuits - {label}"),
                device_count(allocation.area, rates.sf_per_circuit),
                Unit::Each,
                CIRCUIT_COST,
                "Devices",
            ));
        }

        let high_load_share = if square_footage > 0.0 {
            high_load_area / square_footage
        } else {
            0.0
        };
        let (amps, service_cost) = service_step(square_footage, high_load_share);
        items.push(LineItem::lump_sum(
            format!("Main Service & Switchgear - {amps}A"),
            service_cost,
            "Service & Distribution",
        ));

        let fire_alarm_rate = match project.building_type {
            BuildingType::Healthcare => 2.75,
            _ => 1.85,
        };
        items.push(LineItem::new(
            "Fire Alarm System",
            square_footage,
            Unit::SquareFoot,
            fire_alarm_rate,
            "Life Safety",
        ));
        items.push(LineItem::new(
            "Emergency & Exit Lighting",
            square_footage,
            Unit::SquareFoot,
            0.90,
            "Life Safety",
        ));
        items.push(LineItem::new(
            "Low Voltage & Data",
            square_footage,
            Unit::SquareFoot,
            2.25,
            "Special Systems",
        ));

        if project.building_type == BuildingType::Healthcare
            || high_load_share > HIGH_LOAD_GENERATOR
        {
            items.push(LineItem::lump_sum(
                "Emergency Generator & Transfer Switches",
                (square_footage * 3.5).max(150_000.0),
                "Special Systems",
            ));
        }

        if project.is_california() {
            items.push(LineItem::new(
                "Title 24 Lighting Controls",
                square_footage,
                Unit::SquareFoot,
                1.10,
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
        weighted_range(project, registry, |rates| rates.electrical.expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::domain::SpaceType;
    use crate::estimation::trades::test_support::{project, registry};

    #[test]
    fn service_steps_follow_square_footage_breakpoints() {
        assert_eq!(service_step(10_000.0, 0.0), (400, 25_000.0));
        assert_eq!(service_step(10_001.0, 0.0), (800, 55_000.0));
        assert_eq!(service_step(150_000.0, 0.0), (3_000, 260_000.0));
        assert_eq!(service_step(500_000.0, 0.0), (4_000, 380_000.0));
    }

    #[test]
    fn high_load_mix_bumps_service_one_step() {
        assert_eq!(service_step(20_000.0, 0.30), (1_200, 95_000.0));
        assert_eq!(service_step(500_000.0, 0.90), (4_000, 380_000.0));
    }

    #[test]
    fn fixtures_round_up_per_space() {
        let registry = registry();
        let description = project(
            BuildingType::Office,
            810.0,
            "Dallas, TX",
            &[(SpaceType::Office, 1.0)],
        );
        let items = ElectricalCalculator.line_items(&description, &registry);
        let fixtures = items
            .iter()
            .find(|item| item.name == "Lighting Fixtures - Office")
            .expect("fixture line");
        assert_eq!(fixtures.quantity, 11.0);
    }

    #[test]
    fn california_projects_add_title_24_controls() {
        let registry = registry();
        let california = project(BuildingType::Office, 20_000.0, "San Diego, CA", &[]);
        let texas = project(BuildingType::Office, 20_000.0, "Dallas, TX", &[]);

        let has_title_24 = |description: &ProjectDescription| {
            ElectricalCalculator
                .line_items(description, &registry)
                .iter()
                .any(|item| item.name == "Title 24 Lighting Controls")
        };
        assert!(has_title_24(&california));
        assert!(!has_title_24(&texas));
    }

    #[test]
    fn healthcare_always_carries_a_generator() {
        let registry = registry();
        let clinic = project(
            BuildingType::Healthcare,
            10_000.0,
            "Dallas",
            &[(SpaceType::MedicalExam, 1.0)],
        );
        let generator = ElectricalCalculator
            .line_items(&clinic, &registry)
            .into_iter()
            .find(|item| item.name.starts_with("Emergency Generator"))
            .expect("generator line");
        assert_eq!(generator.total_cost, 150_000.0);
    }
}
