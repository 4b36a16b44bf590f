use super::{device_count, weighted_range, TradeCalculator};
use crate::estimation::domain::{LineItem, ProjectDescription, QualityLevel, Trade, Unit};
use crate::estimation::pricing::{ExpectedRange, PricingRegistry};

const DIFFUSER_COST: f64 = 185.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct HvacSystem {
    label: &'static str,
    cost_per_ton: f64,
    unit_tons: f64,
    unit_label: &'static str,
}

/// Primary system selection by gross square footage.
fn system_for(square_footage: f64) -> HvacSystem {
    if square_footage < 25_000.0 {
        HvacSystem {
            label: "Packaged Rooftop Units",
            cost_per_ton: 2_400.0,
            unit_tons: 25.0,
            unit_label: "RTU",
        }
    } else if square_footage <= 100_000.0 {
        HvacSystem {
            label: "VAV Air Handling System",
            cost_per_ton: 3_100.0,
            unit_tons: 60.0,
            unit_label: "AHU",
        }
    } else {
        HvacSystem {
            label: "Central Plant (Chillers & Boilers)",
            cost_per_ton: 3_800.0,
            unit_tons: 400.0,
            unit_label: "chiller",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HvacCalculator;

impl TradeCalculator for HvacCalculator {
    fn trade(&self) -> Trade {
        Trade::Mechanical
    }

    fn line_items(
        &self,
        project: &ProjectDescription,
        registry: &PricingRegistry,
    ) -> Vec<LineItem> {
        let square_footage = project.square_footage.max(0.0);
        let allocations = project.space_allocations();

        let load_tons: f64 = allocations
            .iter()
            .map(|allocation| {
                allocation.area / registry.space_rates(allocation.space).mechanical.sf_per_ton
            })
            .sum();
        let tons = load_tons.ceil();
        let system = system_for(square_footage);
        let units = device_count(tons, system.unit_tons);

        let mut items = vec![LineItem::new(
            format!("{} ({units} {})", system.label, system.unit_label),
            tons,
            Unit::Ton,
            system.cost_per_ton,
            "Equipment",
        )];

        let mut diffusers = 0.0;
        for allocation in &allocations {
            let rates = registry.space_rates(allocation.space).mechanical;
            let label = allocation.space.label();
            items.push(LineItem::new(
                format!("Ductwork & Distribution - {label}"),
                allocation.area,
                Unit::SquareFoot,
                rates.ductwork_per_sf.at(project.quality),
                "Distribution",
            ));
            diffusers += device_count(allocation.area, rates.sf_per_diffuser);
            if rates.exhaust_per_sf > 0.0 {
                items.push(LineItem::new(
                    format!("Special Exhaust - {label}"),
                    allocation.area,
                    Unit::SquareFoot,
                    rates.exhaust_per_sf,
                    "Exhaust",
                ));
            }
        }

        items.push(LineItem::new(
            "Supply & Return Diffusers",
            diffusers,
            Unit::Each,
            DIFFUSER_COST,
            "Distribution",
        ));

        let controls_rate = match project.quality {
            QualityLevel::Premium => 4.50,
            QualityLevel::Economy | QualityLevel::Standard => 3.25,
        };
        items.push(LineItem::new(
            "Controls & Building Automation",
            square_footage,
            Unit::SquareFoot,
            controls_rate,
            "Controls",
        ));
        items.push(LineItem::new(
            "Testing, Adjusting & Balancing",
            square_footage,
            Unit::SquareFoot,
            0.65,
            "Controls",
        ));

        if project.is_california() {
            items.push(LineItem::new(
                "Title 24 Economizers & Energy Compliance",
                square_footage,
                Unit::SquareFoot,
                1.35,
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
        weighted_range(project, registry, |rates| rates.mechanical.expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::domain::{BuildingType, SpaceType};
    use crate::estimation::trades::test_support::{project, registry};

    #[test]
    fn system_type_tracks_building_size() {
        assert_eq!(system_for(24_999.0).unit_label, "RTU");
        assert_eq!(system_for(25_000.0).unit_label, "AHU");
        assert_eq!(system_for(100_000.0).unit_label, "AHU");
        assert_eq!(system_for(100_001.0).unit_label, "chiller");
    }

    #[test]
    fn tonnage_rounds_up_from_space_loads() {
        let registry = registry();
        let description = project(
            BuildingType::Office,
            10_100.0,
            "Austin, TX",
            &[(SpaceType::Office, 1.0)],
        );
        let items = HvacCalculator.line_items(&description, &registry);
        // 10,100 SF at 350 SF/ton is 28.86 tons.
        assert_eq!(items[0].quantity, 29.0);
        assert_eq!(items[0].unit, Unit::Ton);
        assert!(items[0].name.contains("2 RTU"));
    }

    #[test]
    fn kitchens_carry_special_exhaust() {
        let registry = registry();
        let description = project(
            BuildingType::Restaurant,
            4_000.0,
            "Austin, TX",
            &[(SpaceType::Restaurant, 0.6), (SpaceType::Kitchen, 0.4)],
        );
        let items = HvacCalculator.line_items(&description, &registry);
        let kitchen = items
            .iter()
            .find(|item| item.name == "Special Exhaust - Commercial Kitchen")
            .expect("kitchen exhaust");
        assert!((kitchen.total_cost - 1_600.0 * 18.0).abs() < 1e-6);
    }
}
