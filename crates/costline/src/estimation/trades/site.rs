use super::{device_count, TradeCalculator};
use crate::estimation::domain::{LineItem, ProjectDescription, Trade, Unit};
use crate::estimation::pricing::building_types::PARKING_STALL_COST;
use crate::estimation::pricing::{ExpectedRange, PricingRegistry};

const LANDSCAPED_SHARE: f64 = 0.15;

/// Paving, parking, utilities and stormwater for stand-alone sites.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiteCalculator;

impl TradeCalculator for SiteCalculator {
    fn trade(&self) -> Trade {
        Trade::Site
    }

    fn line_items(
        &self,
        project: &ProjectDescription,
        registry: &PricingRegistry,
    ) -> Vec<LineItem> {
        let Some(rates) = registry.building_type(project.building_type).site else {
            return Vec::new();
        };
        let square_footage = project.square_footage.max(0.0);
        let site_area = project.footprint() * rates.site_ratio;

        vec![
            LineItem::new(
                "Parking Stalls & Paving",
                device_count(square_footage, rates.sf_per_stall),
                Unit::Each,
                PARKING_STALL_COST,
                "Paving",
            ),
            LineItem::lump_sum(
                "Site Utilities (Water, Sewer, Power)",
                85_000.0 + 0.9 * square_footage,
                "Utilities",
            ),
            LineItem::new(
                "Landscaping & Irrigation",
                site_area * LANDSCAPED_SHARE,
                Unit::SquareFoot,
                4.5,
                "Landscaping",
            ),
            LineItem::new(
                "Stormwater Management",
                site_area,
                Unit::SquareFoot,
                1.2,
                "Stormwater",
            ),
            LineItem::new(
                "Earthwork & Grading",
                site_area,
                Unit::SquareFoot,
                2.1,
                "Earthwork",
            ),
        ]
    }

    fn expected_range(
        &self,
        project: &ProjectDescription,
        registry: &PricingRegistry,
    ) -> Option<ExpectedRange> {
        registry
            .building_type(project.building_type)
            .site
            .map(|rates| rates.expected)
    }
}
