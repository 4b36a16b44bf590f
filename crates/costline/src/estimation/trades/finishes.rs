use super::{device_count, weighted_range, TradeCalculator};
use crate::estimation::domain::{LineItem, ProjectClassification, ProjectDescription, Trade, Unit};
use crate::estimation::pricing::space_rates::{DOOR_COST, PARTITION_COST_PER_LF};
use crate::estimation::pricing::{ExpectedRange, PricingRegistry, TieredRate};

const SELECTIVE_DEMOLITION_PER_SF: f64 = 6.5;

#[derive(Debug, Clone, Copy, Default)]
pub struct FinishesCalculator;

impl TradeCalculator for FinishesCalculator {
    fn trade(&self) -> Trade {
        Trade::Finishes
    }

    fn line_items(
        &self,
        project: &ProjectDescription,
        registry: &PricingRegistry,
    ) -> Vec<LineItem> {
        let partition_rate = TieredRate::spread(PARTITION_COST_PER_LF).at(project.quality);
        let door_rate = TieredRate::spread(DOOR_COST).at(project.quality);
        let mut items = Vec::new();
        let mut partition_lf = 0.0;
        let mut doors = 0.0;
        let mut ceiling_cost = 0.0;
        let mut ceiling_area = 0.0;

        for allocation in project.space_allocations() {
            let rates = registry.space_rates(allocation.space).finishes;
            items.push(LineItem::new(
                format!("Interior Finishes - {}", allocation.space.label()),
                allocation.area,
                Unit::SquareFoot,
                rates.per_sf.at(project.quality),
                "Finishes",
            ));
            partition_lf += allocation.area * rates.partition_lf_per_sf;
            doors += device_count(allocation.area, rates.sf_per_door);
            if rates.ceiling_per_sf > 0.0 {
                ceiling_area += allocation.area;
                ceiling_cost += allocation.area * rates.ceiling_per_sf;
            }
        }

        items.push(LineItem::new(
            "Interior Partitions",
            partition_lf.ceil(),
            Unit::LinearFoot,
            partition_rate,
            "Partitions",
        ));
        items.push(LineItem::new(
            "Doors, Frames & Hardware",
            doors,
            Unit::Each,
            door_rate,
            "Doors",
        ));
        if ceiling_area > 0.0 {
            items.push(LineItem::new(
                "Ceilings",
                ceiling_area,
                Unit::SquareFoot,
                ceiling_cost / ceiling_area,
                "Ceilings",
            ));
        }

        if project.classification == ProjectClassification::Renovation {
            items.push(LineItem::new(
                "Selective Demolition",
                project.square_footage,
                Unit::SquareFoot,
                SELECTIVE_DEMOLITION_PER_SF,
                "Demolition",
            ));
        }

        items
    }

    fn expected_range(
        &self,
        project: &ProjectDescription,
        registry: &PricingRegistry,
    ) -> Option<ExpectedRange> {
        weighted_range(project, registry, |rates| rates.finishes.expected)
    }
}
