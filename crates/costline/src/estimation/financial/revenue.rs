use serde::Serialize;

use crate::estimation::domain::{BuildingType, ProjectDescription, SpaceType};
use crate::estimation::pricing::{MarketProfile, RevenueBasis};

/// Modeled stabilized revenue before scenario stresses.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RevenueModel {
    pub driver: &'static str,
    pub unit_count: f64,
    /// Annual revenue one driver unit earns at full occupancy.
    pub revenue_per_unit: f64,
    pub occupancy: f64,
    pub annual_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueAnalysis {
    pub revenue_driver: String,
    pub unit_count: f64,
    pub revenue_per_unit: f64,
    pub occupancy_rate: f64,
    /// Modeled revenue, or the caller's anchor, before the scenario revenue factor.
    pub base_annual_revenue: f64,
    pub annual_revenue: f64,
    pub operating_expense_ratio: f64,
    pub operating_expenses: f64,
    pub net_operating_income: f64,
    pub noi_margin: f64,
    pub revenue_per_sqft: f64,
}

fn count(area: f64, area_per_unit: f64) -> f64 {
    if area <= 0.0 || area_per_unit <= 0.0 {
        0.0
    } else {
        (area / area_per_unit).floor().max(1.0)
    }
}

fn per_unit(
    driver: &'static str,
    unit_count: f64,
    revenue_per_unit: f64,
    occupancy: f64,
) -> RevenueModel {
    RevenueModel {
        driver,
        unit_count,
        revenue_per_unit,
        occupancy,
        annual_revenue: unit_count * revenue_per_unit * occupancy,
    }
}

fn leased_area(
    project: &ProjectDescription,
    rent_per_sf: f64,
    efficiency: f64,
    occupancy: f64,
) -> RevenueModel {
    per_unit(
        "leasable_sf",
        (project.square_footage.max(0.0) * efficiency).round(),
        rent_per_sf,
        occupancy,
    )
}

fn apartments(area: f64, sf_per_unit: f64, monthly_rent: f64, occupancy: f64) -> RevenueModel {
    per_unit("units", count(area, sf_per_unit), monthly_rent * 12.0, occupancy)
}

fn hotel(
    project: &ProjectDescription,
    sf_per_key: f64,
    average_daily_rate: f64,
    occupancy: f64,
) -> RevenueModel {
    per_unit(
        "keys",
        count(project.square_footage, sf_per_key),
        average_daily_rate * 365.0,
        occupancy,
    )
}

fn mixed_use(
    project: &ProjectDescription,
    sf_per_unit: f64,
    monthly_rent: f64,
    commercial_rent_per_sf: f64,
    efficiency: f64,
    occupancy: f64,
) -> RevenueModel {
    let residential_area = match project.area_of(&[SpaceType::ResidentialUnit]) {
        area if area > 0.0 => area,
        _ => project.square_footage.max(0.0) / 2.0,
    };
    let commercial_area =
        (project.square_footage.max(0.0) - residential_area).max(0.0) * efficiency;
    let units = count(residential_area, sf_per_unit);
    let annual_revenue =
        (units * monthly_rent * 12.0 + commercial_area * commercial_rent_per_sf) * occupancy;
    RevenueModel {
        driver: "units",
        unit_count: units,
        revenue_per_unit: if units > 0.0 {
            annual_revenue / (units * occupancy.max(f64::EPSILON))
        } else {
            0.0
        },
        occupancy,
        annual_revenue,
    }
}

/// Type-specific revenue from the subtype's market profile.
pub(crate) fn model(project: &ProjectDescription, market: &MarketProfile) -> RevenueModel {
    let occupancy = market.occupancy;
    match (project.building_type, market.basis) {
        (BuildingType::Multifamily, RevenueBasis::Units { sf_per_unit, monthly_rent }) => {
            apartments(project.square_footage, sf_per_unit, monthly_rent, occupancy)
        }
        (BuildingType::Hospitality, RevenueBasis::Keys { sf_per_key, average_daily_rate }) => {
            hotel(project, sf_per_key, average_daily_rate, occupancy)
        }
        (BuildingType::Restaurant, RevenueBasis::Seats { sf_per_seat, revenue_per_seat }) => {
            // Only dining area seats guests.
            let dining = match project.area_of(&[SpaceType::Restaurant]) {
                area if area > 0.0 => area,
                _ => project.square_footage * 0.6,
            };
            per_unit("seats", count(dining, sf_per_seat), revenue_per_seat, occupancy)
        }
        (BuildingType::Healthcare, RevenueBasis::Beds { sf_per_bed, revenue_per_bed }) => per_unit(
            "beds",
            count(project.square_footage, sf_per_bed),
            revenue_per_bed,
            occupancy,
        ),
        (
            BuildingType::Healthcare,
            RevenueBasis::ProcedureRooms {
                sf_per_room,
                revenue_per_room,
            },
        ) => per_unit(
            "procedure_rooms",
            count(project.square_footage, sf_per_room),
            revenue_per_room,
            occupancy,
        ),
        (
            BuildingType::MixedUse,
            RevenueBasis::MixedUse {
                sf_per_unit,
                monthly_rent,
                commercial_rent_per_sf,
                efficiency,
            },
        ) => mixed_use(
            project,
            sf_per_unit,
            monthly_rent,
            commercial_rent_per_sf,
            efficiency,
            occupancy,
        ),
        (_, RevenueBasis::RentPerSf { rent_per_sf, efficiency }) => {
            leased_area(project, rent_per_sf, efficiency, occupancy)
        }
        (_, basis) => generic(project, basis, occupancy),
    }
}

/// Any pairing without a type-specific model.
fn generic(project: &ProjectDescription, basis: RevenueBasis, occupancy: f64) -> RevenueModel {
    match basis {
        RevenueBasis::Units { sf_per_unit, monthly_rent } => {
            apartments(project.square_footage, sf_per_unit, monthly_rent, occupancy)
        }
        RevenueBasis::Keys { sf_per_key, average_daily_rate } => {
            hotel(project, sf_per_key, average_daily_rate, occupancy)
        }
        RevenueBasis::Seats { sf_per_seat, revenue_per_seat } => per_unit(
            "seats",
            count(project.square_footage, sf_per_seat),
            revenue_per_seat,
            occupancy,
        ),
        RevenueBasis::Beds { sf_per_bed, revenue_per_bed } => per_unit(
            "beds",
            count(project.square_footage, sf_per_bed),
            revenue_per_bed,
            occupancy,
        ),
        RevenueBasis::Students { sf_per_student, revenue_per_student } => per_unit(
            "students",
            count(project.square_footage, sf_per_student),
            revenue_per_student,
            occupancy,
        ),
        RevenueBasis::ProcedureRooms { sf_per_room, revenue_per_room } => per_unit(
            "procedure_rooms",
            count(project.square_footage, sf_per_room),
            revenue_per_room,
            occupancy,
        ),
        RevenueBasis::RentPerSf { rent_per_sf, efficiency } => {
            leased_area(project, rent_per_sf, efficiency, occupancy)
        }
        RevenueBasis::MixedUse {
            sf_per_unit,
            monthly_rent,
            commercial_rent_per_sf,
            efficiency,
        } => mixed_use(
            project,
            sf_per_unit,
            monthly_rent,
            commercial_rent_per_sf,
            efficiency,
            occupancy,
        ),
    }
}
