use crate::estimation::domain::{BuildingType, FinancingAssumptions, QualityLevel, SpaceType};
use serde::Serialize;

use super::space_rates::ExpectedRange;

/// Shell and structure rates for a building type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StructuralRates {
    /// Per square foot of building footprint.
    pub foundation_per_sf: f64,
    /// Per gross square foot.
    pub frame_per_sf: f64,
    pub roof_per_sf: f64,
    /// Per square foot of exterior wall.
    pub envelope_per_sf: f64,
    pub floor_to_floor_ft: f64,
    pub expected: ExpectedRange,
}

/// Site-work assumptions for building types that price a site trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SiteRates {
    /// Site area as a multiple of the building footprint.
    pub site_ratio: f64,
    pub sf_per_stall: f64,
    pub expected: ExpectedRange,
}

pub const PARKING_STALL_COST: f64 = 4_200.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InvestmentThresholds {
    pub min_roi: f64,
    pub max_payback_years: f64,
    pub min_dscr: f64,
    pub min_npv: f64,
}

/// Everything keyed by building type alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingTypeProfile {
    pub building_type: BuildingType,
    pub default_subtype: &'static str,
    pub structural: StructuralRates,
    pub site: Option<SiteRates>,
    pub financing: FinancingAssumptions,
    pub thresholds: InvestmentThresholds,
    pub horizon_years: u32,
    pub discount_rate: f64,
    pub noi_growth: f64,
    pub exit_cap_rate: f64,
    /// Added to the classification contingency.
    pub contingency_premium: f64,
    pub default_tile_profile: &'static str,
}

/// How a subtype earns revenue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum RevenueBasis {
    Units { sf_per_unit: f64, monthly_rent: f64 },
    Keys { sf_per_key: f64, average_daily_rate: f64 },
    Seats { sf_per_seat: f64, revenue_per_seat: f64 },
    Beds { sf_per_bed: f64, revenue_per_bed: f64 },
    Students { sf_per_student: f64, revenue_per_student: f64 },
    ProcedureRooms { sf_per_room: f64, revenue_per_room: f64 },
    RentPerSf { rent_per_sf: f64, efficiency: f64 },
    MixedUse {
        sf_per_unit: f64,
        monthly_rent: f64,
        commercial_rent_per_sf: f64,
        efficiency: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketProfile {
    pub basis: RevenueBasis,
    pub occupancy: f64,
    pub opex_ratio: f64,
}

/// Subtype-level configuration: defaults plus the ids of its scope and tile profiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtypeConfig {
    pub building_type: BuildingType,
    pub key: &'static str,
    pub label: &'static str,
    pub quality: QualityLevel,
    pub default_mix: Vec<(SpaceType, f64)>,
    pub scope_profile: Option<&'static str>,
    pub tile_profile: Option<&'static str>,
    pub market: MarketProfile,
}

const STANDARD_RATE: f64 = 0.068;

fn financing(loan_to_cost: f64, amortization_years: u32) -> FinancingAssumptions {
    FinancingAssumptions {
        loan_to_cost,
        interest_rate: STANDARD_RATE,
        amortization_years,
    }
}

fn structural(
    foundation_per_sf: f64,
    frame_per_sf: f64,
    roof_per_sf: f64,
    envelope_per_sf: f64,
    floor_to_floor_ft: f64,
    expected: (f64, f64),
) -> StructuralRates {
    StructuralRates {
        foundation_per_sf,
        frame_per_sf,
        roof_per_sf,
        envelope_per_sf,
        floor_to_floor_ft,
        expected: ExpectedRange::new(expected.0, expected.1),
    }
}

fn thresholds(min_roi: f64, max_payback_years: f64, min_dscr: f64) -> InvestmentThresholds {
    InvestmentThresholds {
        min_roi,
        max_payback_years,
        min_dscr,
        min_npv: 0.0,
    }
}

pub fn profile_for(building_type: BuildingType) -> BuildingTypeProfile {
    match building_type {
        BuildingType::Multifamily => BuildingTypeProfile {
            building_type,
            default_subtype: "market_rate_apartments",
            structural: structural(14.0, 30.0, 16.0, 48.0, 10.5, (45.0, 90.0)),
            site: None,
            financing: financing(0.75, 30),
            thresholds: thresholds(0.07, 16.0, 1.20),
            horizon_years: 15,
            discount_rate: 0.07,
            noi_growth: 0.025,
            exit_cap_rate: 0.055,
            contingency_premium: 0.0,
            default_tile_profile: "multifamily_default_v1",
        },
        BuildingType::Office => BuildingTypeProfile {
            building_type,
            default_subtype: "class_a",
            structural: structural(16.0, 38.0, 18.0, 62.0, 13.0, (55.0, 110.0)),
            site: None,
            financing: financing(0.65, 25),
            thresholds: thresholds(0.08, 14.0, 1.25),
            horizon_years: 10,
            discount_rate: 0.08,
            noi_growth: 0.025,
            exit_cap_rate: 0.07,
            contingency_premium: 0.0,
            default_tile_profile: "office_default_v1",
        },
        BuildingType::Retail => BuildingTypeProfile {
            building_type,
            default_subtype: "shopping_center",
            structural: structural(14.0, 24.0, 15.0, 42.0, 18.0, (40.0, 85.0)),
            site: Some(SiteRates {
                site_ratio: 3.0,
                sf_per_stall: 250.0,
                expected: ExpectedRange::new(20.0, 45.0),
            }),
            financing: financing(0.65, 25),
            thresholds: thresholds(0.08, 13.0, 1.30),
            horizon_years: 10,
            discount_rate: 0.08,
            noi_growth: 0.025,
            exit_cap_rate: 0.068,
            contingency_premium: 0.0,
            default_tile_profile: "retail_default_v1",
        },
        BuildingType::Restaurant => BuildingTypeProfile {
            building_type,
            default_subtype: "quick_service",
            structural: structural(16.0, 28.0, 18.0, 55.0, 16.0, (50.0, 100.0)),
            site: Some(SiteRates {
                site_ratio: 4.0,
                sf_per_stall: 100.0,
                expected: ExpectedRange::new(45.0, 110.0),
            }),
            financing: financing(0.65, 25),
            thresholds: thresholds(0.12, 8.0, 1.35),
            horizon_years: 10,
            discount_rate: 0.10,
            noi_growth: 0.025,
            exit_cap_rate: 0.08,
            contingency_premium: 0.0,
            default_tile_profile: "restaurant_default_v1",
        },
        BuildingType::Hospitality => BuildingTypeProfile {
            building_type,
            default_subtype: "limited_service_hotel",
            structural: structural(15.0, 36.0, 17.0, 58.0, 11.0, (50.0, 105.0)),
            site: None,
            financing: financing(0.55, 25),
            thresholds: thresholds(0.10, 11.0, 1.40),
            horizon_years: 12,
            discount_rate: 0.09,
            noi_growth: 0.03,
            exit_cap_rate: 0.085,
            contingency_premium: 0.0,
            default_tile_profile: "hospitality_default_v1",
        },
        BuildingType::Healthcare => BuildingTypeProfile {
            building_type,
            default_subtype: "medical_office",
            structural: structural(20.0, 52.0, 22.0, 75.0, 15.0, (75.0, 150.0)),
            site: None,
            financing: financing(0.60, 25),
            thresholds: thresholds(0.09, 12.0, 1.30),
            horizon_years: 15,
            discount_rate: 0.08,
            noi_growth: 0.025,
            exit_cap_rate: 0.07,
            contingency_premium: 0.02,
            default_tile_profile: "healthcare_default_v1",
        },
        BuildingType::Educational => BuildingTypeProfile {
            building_type,
            default_subtype: "elementary_school",
            structural: structural(16.0, 36.0, 18.0, 55.0, 14.0, (55.0, 110.0)),
            site: None,
            financing: financing(0.65, 25),
            thresholds: thresholds(0.05, 20.0, 1.15),
            horizon_years: 20,
            discount_rate: 0.05,
            noi_growth: 0.025,
            exit_cap_rate: 0.06,
            contingency_premium: 0.0,
            default_tile_profile: "educational_default_v1",
        },
        BuildingType::Industrial => BuildingTypeProfile {
            building_type,
            default_subtype: "warehouse",
            structural: structural(11.0, 16.0, 12.0, 28.0, 32.0, (25.0, 60.0)),
            site: Some(SiteRates {
                site_ratio: 2.2,
                sf_per_stall: 2_000.0,
                expected: ExpectedRange::new(8.0, 20.0),
            }),
            financing: financing(0.70, 25),
            thresholds: thresholds(0.075, 14.0, 1.25),
            horizon_years: 15,
            discount_rate: 0.075,
            noi_growth: 0.025,
            exit_cap_rate: 0.058,
            contingency_premium: 0.0,
            default_tile_profile: "industrial_default_v1",
        },
        BuildingType::MixedUse => BuildingTypeProfile {
            building_type,
            default_subtype: "office_residential",
            structural: structural(16.0, 36.0, 17.0, 58.0, 12.0, (55.0, 110.0)),
            site: None,
            financing: financing(0.65, 25),
            thresholds: thresholds(0.075, 15.0, 1.25),
            horizon_years: 12,
            discount_rate: 0.075,
            noi_growth: 0.025,
            exit_cap_rate: 0.062,
            contingency_premium: 0.0,
            default_tile_profile: "mixed_use_default_v1",
        },
        BuildingType::Civic => BuildingTypeProfile {
            building_type,
            default_subtype: "library",
            structural: structural(17.0, 40.0, 20.0, 68.0, 15.0, (60.0, 120.0)),
            site: None,
            financing: financing(0.65, 25),
            thresholds: thresholds(0.05, 20.0, 1.15),
            horizon_years: 20,
            discount_rate: 0.05,
            noi_growth: 0.02,
            exit_cap_rate: 0.065,
            contingency_premium: 0.0,
            default_tile_profile: "civic_default_v1",
        },
    }
}

fn rent_per_sf(
    rent_per_sf: f64,
    efficiency: f64,
    occupancy: f64,
    opex_ratio: f64,
) -> MarketProfile {
    MarketProfile {
        basis: RevenueBasis::RentPerSf {
            rent_per_sf,
            efficiency,
        },
        occupancy,
        opex_ratio,
    }
}

fn market(basis: RevenueBasis, occupancy: f64, opex_ratio: f64) -> MarketProfile {
    MarketProfile {
        basis,
        occupancy,
        opex_ratio,
    }
}

pub fn subtype_configs() -> Vec<SubtypeConfig> {
    use BuildingType as B;
    use SpaceType as S;

    vec![
        SubtypeConfig {
            building_type: B::Multifamily,
            key: "market_rate_apartments",
            label: "Market Rate Apartments",
            quality: QualityLevel::Standard,
            default_mix: vec![(S::ResidentialUnit, 0.82)],
            scope_profile: Some("multifamily_residential_v1"),
            tile_profile: None,
            market: market(
                RevenueBasis::Units {
                    sf_per_unit: 1_050.0,
                    monthly_rent: 1_850.0,
                },
                0.94,
                0.38,
            ),
        },
        SubtypeConfig {
            building_type: B::Multifamily,
            key: "luxury_apartments",
            label: "Luxury Apartments",
            quality: QualityLevel::Premium,
            default_mix: vec![(S::ResidentialUnit, 0.78)],
            scope_profile: Some("multifamily_residential_v1"),
            tile_profile: None,
            market: market(
                RevenueBasis::Units {
                    sf_per_unit: 1_250.0,
                    monthly_rent: 3_100.0,
                },
                0.94,
                0.38,
            ),
        },
        SubtypeConfig {
            building_type: B::Multifamily,
            key: "affordable_housing",
            label: "Affordable Housing",
            quality: QualityLevel::Economy,
            default_mix: vec![(S::ResidentialUnit, 0.85)],
            scope_profile: Some("multifamily_residential_v1"),
            tile_profile: None,
            market: market(
                RevenueBasis::Units {
                    sf_per_unit: 1_000.0,
                    monthly_rent: 1_150.0,
                },
                0.95,
                0.40,
            ),
        },
        SubtypeConfig {
            building_type: B::Office,
            key: "class_a",
            label: "Class A Office",
            quality: QualityLevel::Standard,
            default_mix: vec![(S::Office, 0.80)],
            scope_profile: Some("office_commercial_v1"),
            tile_profile: None,
            market: rent_per_sf(42.0, 0.87, 0.90, 0.40),
        },
        SubtypeConfig {
            building_type: B::Office,
            key: "class_b",
            label: "Class B Office",
            quality: QualityLevel::Economy,
            default_mix: vec![(S::Office, 0.82)],
            scope_profile: Some("office_commercial_v1"),
            tile_profile: None,
            market: rent_per_sf(28.0, 0.87, 0.90, 0.40),
        },
        SubtypeConfig {
            building_type: B::Retail,
            key: "shopping_center",
            label: "Shopping Center",
            quality: QualityLevel::Standard,
            default_mix: vec![(S::Retail, 0.85)],
            scope_profile: None,
            tile_profile: None,
            market: rent_per_sf(26.0, 0.92, 0.92, 0.25),
        },
        SubtypeConfig {
            building_type: B::Retail,
            key: "big_box",
            label: "Big Box Retail",
            quality: QualityLevel::Economy,
            default_mix: vec![(S::Retail, 0.90), (S::Warehouse, 0.05)],
            scope_profile: None,
            tile_profile: None,
            market: rent_per_sf(14.0, 0.92, 0.92, 0.15),
        },
        SubtypeConfig {
            building_type: B::Restaurant,
            key: "quick_service",
            label: "Quick Service Restaurant",
            quality: QualityLevel::Standard,
            default_mix: vec![(S::Restaurant, 0.55), (S::Kitchen, 0.35)],
            scope_profile: Some("restaurant_v1"),
            tile_profile: Some("restaurant_quick_service_v1"),
            market: market(
                RevenueBasis::Seats {
                    sf_per_seat: 30.0,
                    revenue_per_seat: 18_000.0,
                },
                0.90,
                0.90,
            ),
        },
        SubtypeConfig {
            building_type: B::Restaurant,
            key: "full_service",
            label: "Full Service Restaurant",
            quality: QualityLevel::Standard,
            default_mix: vec![(S::Restaurant, 0.60), (S::Kitchen, 0.30)],
            scope_profile: Some("restaurant_v1"),
            tile_profile: None,
            market: market(
                RevenueBasis::Seats {
                    sf_per_seat: 40.0,
                    revenue_per_seat: 16_000.0,
                },
                0.90,
                0.90,
            ),
        },
        SubtypeConfig {
            building_type: B::Hospitality,
            key: "limited_service_hotel",
            label: "Limited Service Hotel",
            quality: QualityLevel::Standard,
            default_mix: vec![(S::HotelRoom, 0.75), (S::Restaurant, 0.05)],
            scope_profile: None,
            tile_profile: Some("hospitality_limited_service_hotel_v1"),
            market: market(
                RevenueBasis::Keys {
                    sf_per_key: 600.0,
                    average_daily_rate: 135.0,
                },
                0.70,
                0.68,
            ),
        },
        SubtypeConfig {
            building_type: B::Hospitality,
            key: "full_service_hotel",
            label: "Full Service Hotel",
            quality: QualityLevel::Premium,
            default_mix: vec![
                (S::HotelRoom, 0.65),
                (S::Restaurant, 0.08),
                (S::Kitchen, 0.04),
                (S::Office, 0.03),
            ],
            scope_profile: None,
            tile_profile: None,
            market: market(
                RevenueBasis::Keys {
                    sf_per_key: 900.0,
                    average_daily_rate: 245.0,
                },
                0.72,
                0.74,
            ),
        },
        SubtypeConfig {
            building_type: B::Healthcare,
            key: "surgical_center",
            label: "Ambulatory Surgical Center",
            quality: QualityLevel::Premium,
            default_mix: vec![
                (S::SurgicalSuite, 0.35),
                (S::PatientRoom, 0.20),
                (S::MedicalExam, 0.15),
                (S::Office, 0.10),
            ],
            scope_profile: Some("healthcare_surgical_center_v1"),
            tile_profile: Some("healthcare_surgical_center_v1"),
            market: market(
                RevenueBasis::ProcedureRooms {
                    sf_per_room: 6_500.0,
                    revenue_per_room: 1_150_000.0,
                },
                0.90,
                0.72,
            ),
        },
        SubtypeConfig {
            building_type: B::Healthcare,
            key: "medical_office",
            label: "Medical Office Building",
            quality: QualityLevel::Standard,
            default_mix: vec![(S::MedicalExam, 0.60), (S::Office, 0.20)],
            scope_profile: Some("healthcare_outpatient_v1"),
            tile_profile: None,
            market: rent_per_sf(34.0, 0.88, 0.92, 0.38),
        },
        SubtypeConfig {
            building_type: B::Healthcare,
            key: "hospital",
            label: "Acute Care Hospital",
            quality: QualityLevel::Premium,
            default_mix: vec![
                (S::PatientRoom, 0.45),
                (S::SurgicalSuite, 0.12),
                (S::Laboratory, 0.08),
                (S::MedicalExam, 0.10),
            ],
            scope_profile: None,
            tile_profile: None,
            market: market(
                RevenueBasis::Beds {
                    sf_per_bed: 2_200.0,
                    revenue_per_bed: 900_000.0,
                },
                0.75,
                0.88,
            ),
        },
        SubtypeConfig {
            building_type: B::Healthcare,
            key: "urgent_care",
            label: "Urgent Care Clinic",
            quality: QualityLevel::Standard,
            default_mix: vec![
                (S::MedicalExam, 0.65),
                (S::Office, 0.10),
                (S::Laboratory, 0.05),
            ],
            scope_profile: Some("healthcare_outpatient_v1"),
            tile_profile: None,
            market: market(
                RevenueBasis::ProcedureRooms {
                    sf_per_room: 700.0,
                    revenue_per_room: 260_000.0,
                },
                0.80,
                0.85,
            ),
        },
        SubtypeConfig {
            building_type: B::Educational,
            key: "elementary_school",
            label: "Elementary School",
            quality: QualityLevel::Standard,
            default_mix: vec![(S::Classroom, 0.65), (S::Office, 0.08), (S::Kitchen, 0.04)],
            scope_profile: None,
            tile_profile: None,
            market: market(
                RevenueBasis::Students {
                    sf_per_student: 150.0,
                    revenue_per_student: 13_500.0,
                },
                0.95,
                0.85,
            ),
        },
        SubtypeConfig {
            building_type: B::Educational,
            key: "high_school",
            label: "High School",
            quality: QualityLevel::Standard,
            default_mix: vec![
                (S::Classroom, 0.60),
                (S::Laboratory, 0.08),
                (S::Office, 0.07),
                (S::Kitchen, 0.04),
            ],
            scope_profile: None,
            tile_profile: None,
            market: market(
                RevenueBasis::Students {
                    sf_per_student: 170.0,
                    revenue_per_student: 14_500.0,
                },
                0.95,
                0.85,
            ),
        },
        SubtypeConfig {
            building_type: B::Educational,
            key: "university",
            label: "University Building",
            quality: QualityLevel::Premium,
            default_mix: vec![(S::Classroom, 0.50), (S::Laboratory, 0.18), (S::Office, 0.15)],
            scope_profile: None,
            tile_profile: None,
            market: market(
                RevenueBasis::Students {
                    sf_per_student: 220.0,
                    revenue_per_student: 28_000.0,
                },
                0.95,
                0.82,
            ),
        },
        SubtypeConfig {
            building_type: B::Industrial,
            key: "warehouse",
            label: "Warehouse",
            quality: QualityLevel::Economy,
            default_mix: vec![(S::Warehouse, 0.92), (S::Office, 0.05)],
            scope_profile: Some("industrial_warehouse_v1"),
            tile_profile: Some("industrial_warehouse_v1"),
            market: rent_per_sf(8.5, 0.98, 0.95, 0.12),
        },
        SubtypeConfig {
            building_type: B::Industrial,
            key: "distribution_center",
            label: "Distribution Center",
            quality: QualityLevel::Standard,
            default_mix: vec![(S::Warehouse, 0.90), (S::Office, 0.06)],
            scope_profile: Some("industrial_warehouse_v1"),
            tile_profile: None,
            market: rent_per_sf(9.25, 0.98, 0.95, 0.12),
        },
        SubtypeConfig {
            building_type: B::Industrial,
            key: "manufacturing",
            label: "Manufacturing Facility",
            quality: QualityLevel::Standard,
            default_mix: vec![
                (S::Manufacturing, 0.75),
                (S::Warehouse, 0.15),
                (S::Office, 0.06),
            ],
            scope_profile: Some("industrial_warehouse_v1"),
            tile_profile: None,
            market: rent_per_sf(11.0, 0.98, 0.95, 0.15),
        },
        SubtypeConfig {
            building_type: B::MixedUse,
            key: "office_residential",
            label: "Office over Residential",
            quality: QualityLevel::Standard,
            default_mix: vec![(S::ResidentialUnit, 0.55), (S::Office, 0.30)],
            scope_profile: None,
            tile_profile: None,
            market: market(
                RevenueBasis::MixedUse {
                    sf_per_unit: 1_050.0,
                    monthly_rent: 2_100.0,
                    commercial_rent_per_sf: 34.0,
                    efficiency: 0.88,
                },
                0.93,
                0.40,
            ),
        },
        SubtypeConfig {
            building_type: B::MixedUse,
            key: "retail_residential",
            label: "Retail with Residential Above",
            quality: QualityLevel::Standard,
            default_mix: vec![(S::ResidentialUnit, 0.60), (S::Retail, 0.25)],
            scope_profile: None,
            tile_profile: None,
            market: market(
                RevenueBasis::MixedUse {
                    sf_per_unit: 1_000.0,
                    monthly_rent: 1_950.0,
                    commercial_rent_per_sf: 28.0,
                    efficiency: 0.90,
                },
                0.93,
                0.40,
            ),
        },
        SubtypeConfig {
            building_type: B::Civic,
            key: "library",
            label: "Public Library",
            quality: QualityLevel::Standard,
            default_mix: vec![(S::Classroom, 0.50), (S::Office, 0.20)],
            scope_profile: None,
            tile_profile: None,
            market: rent_per_sf(18.0, 0.85, 0.95, 0.45),
        },
        SubtypeConfig {
            building_type: B::Civic,
            key: "community_center",
            label: "Community Center",
            quality: QualityLevel::Standard,
            default_mix: vec![(S::Classroom, 0.35), (S::Office, 0.15), (S::Kitchen, 0.05)],
            scope_profile: None,
            tile_profile: None,
            market: rent_per_sf(16.0, 0.85, 0.95, 0.45),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_subtypes_are_configured() {
        let subtypes = subtype_configs();
        for building_type in BuildingType::ordered() {
            let profile = profile_for(building_type);
            assert!(
                subtypes.iter().any(|config| config.building_type == building_type
                    && config.key == profile.default_subtype),
                "{building_type:?} default subtype missing"
            );
        }
    }

    #[test]
    fn default_mixes_never_exceed_the_whole_building() {
        for config in subtype_configs() {
            let total: f64 = config.default_mix.iter().map(|(_, fraction)| fraction).sum();
            assert!(total <= 1.0 + 1e-9, "{} mix sums to {total}", config.key);
        }
    }

    #[test]
    fn only_site_work_types_carry_site_rates() {
        for building_type in BuildingType::ordered() {
            assert_eq!(
                profile_for(building_type).site.is_some(),
                building_type.includes_site_work()
            );
        }
    }
}
