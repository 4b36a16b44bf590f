//! Tile profiles: the stress levers and derived scenario rows for each subtype family.

use serde::Serialize;

use super::StressBand;
use crate::estimation::domain::{BuildingType, Trade};
use crate::estimation::pricing::RegistryError;

pub const BASE_SCENARIO: &str = "base";
pub const CONSERVATIVE_ROW: &str = "conservative";
pub const UGLY_ROW: &str = "ugly";

pub const COST_TILE: &str = "cost_plus";
pub const REVENUE_TILE: &str = "revenue_minus";
pub const OPEX_TILE: &str = "opex_plus";

/// The snapshot metric a tile perturbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "trade", rename_all = "snake_case")]
pub enum TileTarget {
    TotalCost,
    Revenue,
    Trade(Trade),
    OperatingExpenses,
}

impl TileTarget {
    pub fn metric_ref(self) -> String {
        match self {
            Self::TotalCost => "totals.total_project_cost".to_string(),
            Self::Revenue => "revenue_analysis.annual_revenue".to_string(),
            Self::Trade(trade) => format!("trades.{}.subtotal", trade.key()),
            Self::OperatingExpenses => "revenue_analysis.operating_expenses".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StressDirection {
    Increase,
    Decrease,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tile {
    pub id: &'static str,
    pub label: &'static str,
    pub target: TileTarget,
    pub direction: StressDirection,
    /// Multiple of the stress band this tile moves its target by.
    pub band_scale: f64,
}

impl Tile {
    /// Scalar applied to the target metric, e.g. 1.10 for "cost +10%" at the 10% band.
    pub fn factor(&self, band: StressBand) -> f64 {
        let delta = band.fraction() * self.band_scale;
        match self.direction {
            StressDirection::Increase => 1.0 + delta,
            StressDirection::Decrease => (1.0 - delta).max(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedRow {
    pub row_id: &'static str,
    pub label: &'static str,
    pub tile_ids: Vec<&'static str>,
}

/// Static "what we are most likely wrong about" content, tied to the tile that measures it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LikelyWrongEntry {
    pub id: &'static str,
    pub text: &'static str,
    pub driver_tile_id: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileProfile {
    pub id: &'static str,
    pub building_type: BuildingType,
    pub label: &'static str,
    pub tiles: Vec<Tile>,
    pub derived_rows: Vec<DerivedRow>,
    /// The subtype-unique driver tile.
    pub driver_tile_id: &'static str,
    pub most_likely_wrong: Vec<LikelyWrongEntry>,
}

impl TileProfile {
    pub fn tile(&self, tile_id: &str) -> Option<&Tile> {
        self.tiles.iter().find(|tile| tile.id == tile_id)
    }

    pub fn row(&self, row_id: &str) -> Option<&DerivedRow> {
        self.derived_rows.iter().find(|row| row.row_id == row_id)
    }

    /// The row that applies the driver tile on its own.
    pub fn driver_row(&self) -> Option<&DerivedRow> {
        self.derived_rows
            .iter()
            .find(|row| row.tile_ids == [self.driver_tile_id])
    }

    /// `base` followed by every derived row id, in declaration order.
    pub fn scenario_ids(&self) -> Vec<&'static str> {
        std::iter::once(BASE_SCENARIO)
            .chain(self.derived_rows.iter().map(|row| row.row_id))
            .collect()
    }

    pub fn validate(&self) -> Result<(), RegistryError> {
        let unknown = |tile_id: &str| RegistryError::UnknownTile {
            profile_id: self.id.to_string(),
            tile_id: tile_id.to_string(),
        };

        if self.tile(self.driver_tile_id).is_none() {
            return Err(unknown(self.driver_tile_id));
        }
        for row in &self.derived_rows {
            if let Some(missing) = row.tile_ids.iter().find(|id| self.tile(id).is_none()) {
                return Err(unknown(missing));
            }
        }
        for entry in &self.most_likely_wrong {
            if let Some(missing) = entry.driver_tile_id.filter(|id| self.tile(id).is_none()) {
                return Err(unknown(missing));
            }
        }
        for tile in &self.tiles {
            if tile.target == TileTarget::Trade(Trade::Site) {
                return Err(RegistryError::InvalidPolicy {
                    profile_id: self.id.to_string(),
                    reason: format!(
                        "tile '{}' targets site work, which is not always priced",
                        tile.id
                    ),
                });
            }
        }

        let ids = self.scenario_ids();
        for (index, id) in ids.iter().enumerate() {
            if ids[..index].contains(id) {
                return Err(RegistryError::InvalidPolicy {
                    profile_id: self.id.to_string(),
                    reason: format!("scenario id '{id}' is declared twice"),
                });
            }
        }
        Ok(())
    }
}

struct Driver {
    tile_id: &'static str,
    label: &'static str,
    trade: Trade,
    band_scale: f64,
    row_id: &'static str,
    row_label: &'static str,
}

fn common_tiles() -> Vec<Tile> {
    vec![
        Tile {
            id: COST_TILE,
            label: "Hard cost overrun",
            target: TileTarget::TotalCost,
            direction: StressDirection::Increase,
            band_scale: 1.0,
        },
        Tile {
            id: REVENUE_TILE,
            label: "Revenue shortfall",
            target: TileTarget::Revenue,
            direction: StressDirection::Decrease,
            band_scale: 1.0,
        },
        Tile {
            id: OPEX_TILE,
            label: "Operating expense creep",
            target: TileTarget::OperatingExpenses,
            direction: StressDirection::Increase,
            band_scale: 0.5,
        },
    ]
}

fn profile(
    id: &'static str,
    building_type: BuildingType,
    label: &'static str,
    driver: Driver,
    likely_wrong: [(&'static str, &'static str); 2],
) -> TileProfile {
    let mut tiles = common_tiles();
    tiles.push(Tile {
        id: driver.tile_id,
        label: driver.label,
        target: TileTarget::Trade(driver.trade),
        direction: StressDirection::Increase,
        band_scale: driver.band_scale,
    });

    let [(first_id, first_text), (second_id, second_text)] = likely_wrong;
    TileProfile {
        id,
        building_type,
        label,
        tiles,
        derived_rows: vec![
            DerivedRow {
                row_id: CONSERVATIVE_ROW,
                label: "Conservative",
                tile_ids: vec![COST_TILE, REVENUE_TILE],
            },
            DerivedRow {
                row_id: driver.row_id,
                label: driver.row_label,
                tile_ids: vec![driver.tile_id],
            },
            DerivedRow {
                row_id: UGLY_ROW,
                label: "Ugly",
                tile_ids: vec![COST_TILE, REVENUE_TILE, OPEX_TILE, driver.tile_id],
            },
        ],
        driver_tile_id: driver.tile_id,
        most_likely_wrong: vec![
            LikelyWrongEntry {
                id: first_id,
                text: first_text,
                driver_tile_id: Some(driver.tile_id),
            },
            LikelyWrongEntry {
                id: second_id,
                text: second_text,
                driver_tile_id: Some(REVENUE_TILE),
            },
            LikelyWrongEntry {
                id: "hard_cost_basis",
                text: "Unit costs use current-quarter pricing without escalation to bid day.",
                driver_tile_id: Some(COST_TILE),
            },
            LikelyWrongEntry {
                id: "operating_costs",
                text: "Operating expense ratio is a market average, not this operator's budget.",
                driver_tile_id: Some(OPEX_TILE),
            },
            LikelyWrongEntry {
                id: "site_conditions",
                text: "Geotechnical and utility availability are unverified.",
                driver_tile_id: None,
            },
        ],
    }
}

pub fn tile_profiles() -> Vec<TileProfile> {
    use BuildingType as B;

    vec![
        profile(
            "multifamily_default_v1",
            B::Multifamily,
            "Multifamily",
            Driver {
                tile_id: "finish_escalation",
                label: "Unit finish escalation",
                trade: Trade::Finishes,
                band_scale: 2.0,
                row_id: "finish_upgrade",
                row_label: "Finish upgrade",
            },
            [
                (
                    "unit_finish_spec",
                    "Unit finish packages tend to be upgraded during leasing.",
                ),
                (
                    "achievable_rents",
                    "Achievable rents rely on comparables that may not hold at delivery.",
                ),
            ],
        ),
        profile(
            "office_default_v1",
            B::Office,
            "Office",
            Driver {
                tile_id: "tenant_improvement_overrun",
                label: "Tenant improvement overrun",
                trade: Trade::Finishes,
                band_scale: 2.0,
                row_id: "tenant_fitout",
                row_label: "Tenant fit-out pressure",
            },
            [
                (
                    "tenant_improvements",
                    "Tenant improvement allowances are set before tenants are signed.",
                ),
                ("lease_up", "Lease-up pace and concessions are not modeled."),
            ],
        ),
        profile(
            "retail_default_v1",
            B::Retail,
            "Retail",
            Driver {
                tile_id: "shell_overrun",
                label: "Shell and storefront overrun",
                trade: Trade::Structural,
                band_scale: 1.5,
                row_id: "shell_pressure",
                row_label: "Shell pressure",
            },
            [
                (
                    "storefront_scope",
                    "Storefront and canopy scope is carried at allowance level.",
                ),
                (
                    "anchor_tenancy",
                    "Inline rents depend on an anchor tenant that is not committed.",
                ),
            ],
        ),
        profile(
            "restaurant_default_v1",
            B::Restaurant,
            "Restaurant",
            Driver {
                tile_id: "kitchen_exhaust_overrun",
                label: "Kitchen hood and exhaust overrun",
                trade: Trade::Mechanical,
                band_scale: 2.0,
                row_id: "kitchen_mep",
                row_label: "Kitchen MEP pressure",
            },
            [
                (
                    "kitchen_ventilation",
                    "Hood, make-up air and exhaust are sized before the menu is final.",
                ),
                (
                    "seat_turnover",
                    "Seat turnover assumes a mature concept, not an opening year.",
                ),
            ],
        ),
        profile(
            "restaurant_quick_service_v1",
            B::Restaurant,
            "Quick Service Restaurant",
            Driver {
                tile_id: "grease_plumbing_overrun",
                label: "Grease waste and plumbing overrun",
                trade: Trade::Plumbing,
                band_scale: 2.0,
                row_id: "drive_thru_utilities",
                row_label: "Drive-thru utilities",
            },
            [
                (
                    "grease_interceptor",
                    "Grease interceptor sizing follows the local authority, not the prototype.",
                ),
                (
                    "drive_thru_volume",
                    "Drive-thru volume is benchmarked on mature stores.",
                ),
            ],
        ),
        profile(
            "hospitality_default_v1",
            B::Hospitality,
            "Hospitality",
            Driver {
                tile_id: "guestroom_finish_overrun",
                label: "Guestroom finish and FF&E overrun",
                trade: Trade::Finishes,
                band_scale: 2.0,
                row_id: "brand_standards",
                row_label: "Brand standards",
            },
            [
                (
                    "brand_standards",
                    "Brand property improvement standards change between design and opening.",
                ),
                (
                    "average_daily_rate",
                    "Average daily rate assumes stabilized occupancy in year one.",
                ),
            ],
        ),
        profile(
            "hospitality_limited_service_hotel_v1",
            B::Hospitality,
            "Limited Service Hotel",
            Driver {
                tile_id: "guestroom_hvac_overrun",
                label: "Guestroom HVAC overrun",
                trade: Trade::Mechanical,
                band_scale: 1.5,
                row_id: "guestroom_mep",
                row_label: "Guestroom MEP pressure",
            },
            [
                (
                    "ptac_vs_vrf",
                    "Guestroom HVAC system type is assumed, not selected.",
                ),
                (
                    "weekday_demand",
                    "Weekday business demand is assumed to match the comp set.",
                ),
            ],
        ),
        profile(
            "healthcare_default_v1",
            B::Healthcare,
            "Healthcare",
            Driver {
                tile_id: "medical_hvac_overrun",
                label: "Medical HVAC overrun",
                trade: Trade::Mechanical,
                band_scale: 2.0,
                row_id: "clinical_mep",
                row_label: "Clinical MEP pressure",
            },
            [
                (
                    "clinical_air_changes",
                    "Air change and pressurization rates are set by later clinical programming.",
                ),
                ("payer_mix", "Revenue assumes a commercial payer mix."),
            ],
        ),
        profile(
            "healthcare_surgical_center_v1",
            B::Healthcare,
            "Ambulatory Surgical Center",
            Driver {
                tile_id: "or_air_handling_overrun",
                label: "Operating room air handling overrun",
                trade: Trade::Mechanical,
                band_scale: 2.5,
                row_id: "or_mep_escalation",
                row_label: "OR MEP escalation",
            },
            [
                (
                    "or_air_handling",
                    "OR air handling and humidity control are priced before equipment selection.",
                ),
                (
                    "case_volume",
                    "Case volume per room assumes full surgeon recruitment at opening.",
                ),
            ],
        ),
        profile(
            "educational_default_v1",
            B::Educational,
            "Educational",
            Driver {
                tile_id: "structure_overrun",
                label: "Gym and assembly structure overrun",
                trade: Trade::Structural,
                band_scale: 1.5,
                row_id: "long_span_structure",
                row_label: "Long-span structure",
            },
            [
                (
                    "assembly_spaces",
                    "Gymnasium and auditorium spans are carried at typical bay sizes.",
                ),
                (
                    "enrollment",
                    "Enrollment-driven funding assumes projected enrollment is met.",
                ),
            ],
        ),
        profile(
            "industrial_default_v1",
            B::Industrial,
            "Industrial",
            Driver {
                tile_id: "slab_shell_overrun",
                label: "Slab and shell overrun",
                trade: Trade::Structural,
                band_scale: 1.5,
                row_id: "shell_escalation",
                row_label: "Shell escalation",
            },
            [
                (
                    "slab_thickness",
                    "Slab design assumes standard racking loads.",
                ),
                (
                    "market_rent",
                    "Industrial rents assume the current vacancy cycle continues.",
                ),
            ],
        ),
        profile(
            "industrial_warehouse_v1",
            B::Industrial,
            "Warehouse",
            Driver {
                tile_id: "tilt_wall_overrun",
                label: "Tilt wall and slab overrun",
                trade: Trade::Structural,
                band_scale: 2.0,
                row_id: "tilt_wall_escalation",
                row_label: "Tilt wall escalation",
            },
            [
                (
                    "tilt_wall_panels",
                    "Tilt wall panel and slab pricing is exposed to concrete escalation.",
                ),
                (
                    "spec_lease_up",
                    "Speculative lease-up assumes a single tenant signs before delivery.",
                ),
            ],
        ),
        profile(
            "mixed_use_default_v1",
            B::MixedUse,
            "Mixed Use",
            Driver {
                tile_id: "podium_overrun",
                label: "Podium transfer structure overrun",
                trade: Trade::Structural,
                band_scale: 1.5,
                row_id: "podium_pressure",
                row_label: "Podium pressure",
            },
            [
                (
                    "transfer_structure",
                    "Podium transfer structure is estimated without a structural design.",
                ),
                (
                    "commercial_lease_up",
                    "Ground floor commercial rents are assumed fully leased.",
                ),
            ],
        ),
        profile(
            "civic_default_v1",
            B::Civic,
            "Civic",
            Driver {
                tile_id: "public_finish_overrun",
                label: "Public realm finish overrun",
                trade: Trade::Finishes,
                band_scale: 1.5,
                row_id: "public_finishes",
                row_label: "Public finishes",
            },
            [
                (
                    "public_finishes",
                    "Public-facing finishes are often upgraded through community review.",
                ),
                (
                    "program_revenue",
                    "Program revenue depends on appropriations that are not committed.",
                ),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_profile_validates() {
        for profile in tile_profiles() {
            profile.validate().unwrap_or_else(|error| panic!("{}: {error}", profile.id));
        }
    }

    #[test]
    fn profile_ids_are_unique() {
        let profiles = tile_profiles();
        for (index, profile) in profiles.iter().enumerate() {
            assert!(
                profiles[..index].iter().all(|other| other.id != profile.id),
                "duplicate {}",
                profile.id
            );
        }
    }

    #[test]
    fn tile_factors_follow_the_band() {
        let profiles = tile_profiles();
        let surgical = profiles
            .iter()
            .find(|profile| profile.id == "healthcare_surgical_center_v1")
            .expect("surgical profile");
        let cost = surgical.tile(COST_TILE).expect("cost tile");
        let revenue = surgical.tile(REVENUE_TILE).expect("revenue tile");
        let driver = surgical.tile(surgical.driver_tile_id).expect("driver tile");

        assert!((cost.factor(StressBand::Ten) - 1.10).abs() < 1e-12);
        assert!((revenue.factor(StressBand::Ten) - 0.90).abs() < 1e-12);
        assert!((driver.factor(StressBand::Five) - 1.125).abs() < 1e-12);
        assert_eq!(driver.target.metric_ref(), "trades.mechanical.subtotal");
    }

    #[test]
    fn driver_row_applies_only_the_driver_tile() {
        for profile in tile_profiles() {
            let row = profile.driver_row().expect("driver row");
            assert_eq!(row.tile_ids, vec![profile.driver_tile_id]);
            assert_eq!(profile.scenario_ids().len(), 4);
        }
    }

    #[test]
    fn unknown_row_tiles_are_rejected() {
        let mut profile = tile_profiles().remove(0);
        profile.derived_rows[0].tile_ids.push("missing_tile");
        assert!(matches!(
            profile.validate(),
            Err(RegistryError::UnknownTile { tile_id, .. }) if tile_id == "missing_tile"
        ));
    }
}
