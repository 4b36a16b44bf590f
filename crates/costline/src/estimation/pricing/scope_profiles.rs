use crate::estimation::domain::{SpaceType, Trade, Unit};
use serde::Serialize;

/// Named formula turning a project description into a scope-item quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum QuantityRule {
    PerSquareFoot {
        multiplier: f64,
    },
    PerFootprint {
        multiplier: f64,
    },
    PerFloor {
        per_floor: f64,
    },
    /// Dock positions sized on warehouse and manufacturing area (whole building if none).
    PerDock {
        sf_per_dock: f64,
        minimum: f64,
        override_key: Option<&'static str>,
    },
    PerRestroomGroup {
        sf_per_group: f64,
        minimum: f64,
        override_key: Option<&'static str>,
    },
    /// Counted devices over the listed spaces; an empty list means the whole building.
    PerSpace {
        spaces: &'static [SpaceType],
        sf_per_each: f64,
        minimum: f64,
        override_key: Option<&'static str>,
    },
    SpaceArea {
        spaces: &'static [SpaceType],
    },
    Constant(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeItemTemplate {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: Unit,
    /// Fraction of the trade subtotal carried by this item.
    pub share: f64,
    pub quantity: QuantityRule,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeScope {
    pub trade: Trade,
    pub items: Vec<ScopeItemTemplate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeProfile {
    pub id: &'static str,
    pub trades: Vec<TradeScope>,
}

impl ScopeProfile {
    pub fn items_for(&self, trade: Trade) -> Option<&[ScopeItemTemplate]> {
        self.trades
            .iter()
            .find(|scope| scope.trade == trade)
            .map(|scope| scope.items.as_slice())
    }
}

fn item(
    key: &'static str,
    label: &'static str,
    unit: Unit,
    share: f64,
    quantity: QuantityRule,
) -> ScopeItemTemplate {
    ScopeItemTemplate {
        key,
        label,
        unit,
        share,
        quantity,
    }
}

fn per_sf() -> QuantityRule {
    QuantityRule::PerSquareFoot { multiplier: 1.0 }
}

fn footprint(multiplier: f64) -> QuantityRule {
    QuantityRule::PerFootprint { multiplier }
}

fn lump_sum() -> QuantityRule {
    QuantityRule::Constant(1.0)
}

fn each(spaces: &'static [SpaceType], sf_per_each: f64) -> QuantityRule {
    QuantityRule::PerSpace {
        spaces,
        sf_per_each,
        minimum: 1.0,
        override_key: None,
    }
}

fn area(spaces: &'static [SpaceType]) -> QuantityRule {
    QuantityRule::SpaceArea { spaces }
}

fn trade(trade: Trade, items: Vec<ScopeItemTemplate>) -> TradeScope {
    TradeScope { trade, items }
}

const OR_SUITES: &[SpaceType] = &[SpaceType::SurgicalSuite];
const CLINICAL: &[SpaceType] = &[SpaceType::PatientRoom, SpaceType::MedicalExam];
const GAS_SERVED: &[SpaceType] = &[SpaceType::SurgicalSuite, SpaceType::PatientRoom];
const EXAM: &[SpaceType] = &[SpaceType::MedicalExam];
const WHOLE: &[SpaceType] = &[];
const STORAGE: &[SpaceType] = &[SpaceType::Warehouse, SpaceType::Manufacturing];
const WAREHOUSE: &[SpaceType] = &[SpaceType::Warehouse];
const OFFICE: &[SpaceType] = &[SpaceType::Office];
const UNITS: &[SpaceType] = &[SpaceType::ResidentialUnit];
const COMMON: &[SpaceType] = &[SpaceType::Common];
const KITCHEN: &[SpaceType] = &[SpaceType::Kitchen];
const DINING: &[SpaceType] = &[SpaceType::Restaurant];

fn surgical_center() -> ScopeProfile {
    use Unit::{Each, LumpSum, SquareFoot};
    ScopeProfile {
        id: "healthcare_surgical_center_v1",
        trades: vec![
            trade(
                Trade::Structural,
                vec![
                    item(
                        "foundations",
                        "Foundations & Slab",
                        SquareFoot,
                        0.22,
                        footprint(1.0),
                    ),
                    item(
                        "superstructure",
                        "Steel Superstructure",
                        SquareFoot,
                        0.38,
                        per_sf(),
                    ),
                    item(
                        "vibration_floors",
                        "Vibration-Controlled OR Floors",
                        SquareFoot,
                        0.12,
                        area(OR_SUITES),
                    ),
                    item(
                        "roof",
                        "Roof Assembly & Equipment Screens",
                        SquareFoot,
                        0.10,
                        footprint(1.0),
                    ),
                    item("envelope", "Exterior Envelope", LumpSum, 0.18, lump_sum()),
                ],
            ),
            trade(
                Trade::Mechanical,
                vec![
                    item(
                        "or_air_handlers",
                        "Operating Room Air Handling Units",
                        Each,
                        0.30,
                        each(OR_SUITES, 1_500.0),
                    ),
                    item(
                        "hepa_filtration",
                        "HEPA Filtration & Laminar Diffusers",
                        Each,
                        0.18,
                        each(OR_SUITES, 650.0),
                    ),
                    item(
                        "ductwork",
                        "Ductwork & Pressurization",
                        SquareFoot,
                        0.27,
                        per_sf(),
                    ),
                    item(
                        "wagd_exhaust",
                        "Exhaust & Anesthesia Gas Disposal",
                        Each,
                        0.08,
                        each(OR_SUITES, 650.0),
                    ),
                    item(
                        "building_automation",
                        "Building Automation System",
                        SquareFoot,
                        0.12,
                        per_sf(),
                    ),
                    item(
                        "test_and_balance",
                        "Testing, Adjusting & Balancing",
                        LumpSum,
                        0.05,
                        lump_sum(),
                    ),
                ],
            ),
            trade(
                Trade::Electrical,
                vec![
                    item(
                        "essential_power",
                        "Essential Power System & Generator",
                        LumpSum,
                        0.22,
                        lump_sum(),
                    ),
                    item(
                        "isolated_power",
                        "Isolated Power Panels",
                        Each,
                        0.16,
                        each(OR_SUITES, 650.0),
                    ),
                    item(
                        "distribution",
                        "Power Distribution",
                        SquareFoot,
                        0.24,
                        per_sf(),
                    ),
                    item(
                        "lighting",
                        "Surgical & General Lighting",
                        SquareFoot,
                        0.20,
                        per_sf(),
                    ),
                    item(
                        "nurse_call",
                        "Nurse Call & Low Voltage",
                        SquareFoot,
                        0.10,
                        per_sf(),
                    ),
                    item("fire_alarm", "Fire Alarm", SquareFoot, 0.08, per_sf()),
                ],
            ),
            trade(
                Trade::Plumbing,
                vec![
                    item(
                        "medical_gas_outlets",
                        "Medical Gas Outlets & Manifolds",
                        Each,
                        0.28,
                        each(GAS_SERVED, 120.0),
                    ),
                    item(
                        "clinical_fixtures",
                        "Scrub Sinks & Clinical Fixtures",
                        Each,
                        0.22,
                        each(WHOLE, 300.0),
                    ),
                    item(
                        "piping",
                        "Domestic Water & Waste Piping",
                        SquareFoot,
                        0.26,
                        per_sf(),
                    ),
                    item("sprinklers", "Fire Sprinklers", SquareFoot, 0.16, per_sf()),
                    item(
                        "water_heating",
                        "Water Heating Plant",
                        LumpSum,
                        0.08,
                        lump_sum(),
                    ),
                ],
            ),
            trade(
                Trade::Finishes,
                vec![
                    item(
                        "or_finishes",
                        "Operating Room Finishes",
                        SquareFoot,
                        0.30,
                        area(OR_SUITES),
                    ),
                    item(
                        "clinical_finishes",
                        "Pre-Op, Recovery & Exam Finishes",
                        SquareFoot,
                        0.28,
                        area(CLINICAL),
                    ),
                    item(
                        "partitions",
                        "Partitions & Shielding",
                        SquareFoot,
                        0.20,
                        per_sf(),
                    ),
                    item(
                        "doors",
                        "Doors, Frames & Hardware",
                        Each,
                        0.12,
                        each(WHOLE, 250.0),
                    ),
                    item("ceilings", "Cleanable Ceilings", SquareFoot, 0.10, per_sf()),
                ],
            ),
        ],
    }
}

fn outpatient() -> ScopeProfile {
    use Unit::{Each, LumpSum, SquareFoot};
    ScopeProfile {
        id: "healthcare_outpatient_v1",
        trades: vec![
            trade(
                Trade::Structural,
                vec![
                    item(
                        "foundations",
                        "Foundations & Slab",
                        SquareFoot,
                        0.24,
                        footprint(1.0),
                    ),
                    item(
                        "superstructure",
                        "Superstructure",
                        SquareFoot,
                        0.40,
                        per_sf(),
                    ),
                    item("roof", "Roof Assembly", SquareFoot, 0.12, footprint(1.0)),
                    item("envelope", "Exterior Envelope", SquareFoot, 0.24, per_sf()),
                ],
            ),
            trade(
                Trade::Mechanical,
                vec![
                    item(
                        "rooftop_units",
                        "Rooftop Units",
                        Each,
                        0.34,
                        each(WHOLE, 4_000.0),
                    ),
                    item(
                        "ductwork",
                        "Ductwork & Diffusers",
                        SquareFoot,
                        0.30,
                        per_sf(),
                    ),
                    item(
                        "exam_exhaust",
                        "Exam Room Exhaust",
                        Each,
                        0.10,
                        each(EXAM, 120.0),
                    ),
                    item("controls", "Controls", SquareFoot, 0.18, per_sf()),
                    item(
                        "test_and_balance",
                        "Testing, Adjusting & Balancing",
                        LumpSum,
                        0.08,
                        lump_sum(),
                    ),
                ],
            ),
            trade(
                Trade::Electrical,
                vec![
                    item("service", "Electrical Service", LumpSum, 0.15, lump_sum()),
                    item(
                        "distribution",
                        "Power Distribution",
                        SquareFoot,
                        0.30,
                        per_sf(),
                    ),
                    item(
                        "lighting",
                        "Lighting & Controls",
                        SquareFoot,
                        0.28,
                        per_sf(),
                    ),
                    item(
                        "low_voltage",
                        "Low Voltage & Nurse Call",
                        SquareFoot,
                        0.15,
                        per_sf(),
                    ),
                    item("fire_alarm", "Fire Alarm", SquareFoot, 0.12, per_sf()),
                ],
            ),
            trade(
                Trade::Plumbing,
                vec![
                    item(
                        "exam_sinks",
                        "Exam Room Sinks",
                        Each,
                        0.26,
                        each(EXAM, 120.0),
                    ),
                    item(
                        "restroom_groups",
                        "Restroom Groups",
                        Each,
                        0.22,
                        QuantityRule::PerRestroomGroup {
                            sf_per_group: 5_000.0,
                            minimum: 1.0,
                            override_key: Some("restroom_groups"),
                        },
                    ),
                    item(
                        "piping",
                        "Domestic Water & Waste Piping",
                        SquareFoot,
                        0.30,
                        per_sf(),
                    ),
                    item("sprinklers", "Fire Sprinklers", SquareFoot, 0.16, per_sf()),
                    item("water_heating", "Water Heating", LumpSum, 0.06, lump_sum()),
                ],
            ),
            trade(
                Trade::Finishes,
                vec![
                    item(
                        "exam_finishes",
                        "Exam Room Finishes",
                        SquareFoot,
                        0.35,
                        area(EXAM),
                    ),
                    item("partitions", "Partitions", SquareFoot, 0.25, per_sf()),
                    item(
                        "doors",
                        "Doors, Frames & Hardware",
                        Each,
                        0.20,
                        each(WHOLE, 200.0),
                    ),
                    item("ceilings", "Acoustic Ceilings", SquareFoot, 0.20, per_sf()),
                ],
            ),
        ],
    }
}

fn warehouse() -> ScopeProfile {
    use Unit::{Each, LumpSum, SquareFoot};
    let docks = || QuantityRule::PerDock {
        sf_per_dock: 10_000.0,
        minimum: 2.0,
        override_key: Some("dock_doors"),
    };
    ScopeProfile {
        id: "industrial_warehouse_v1",
        trades: vec![
            trade(
                Trade::Structural,
                vec![
                    item(
                        "slab_on_grade",
                        "Slab on Grade",
                        SquareFoot,
                        0.30,
                        footprint(1.0),
                    ),
                    item(
                        "tilt_up_panels",
                        "Tilt-Up Wall Panels",
                        SquareFoot,
                        0.30,
                        per_sf(),
                    ),
                    item(
                        "steel_and_joists",
                        "Structural Steel & Joists",
                        SquareFoot,
                        0.25,
                        per_sf(),
                    ),
                    item(
                        "roof",
                        "Roof Deck & Membrane",
                        SquareFoot,
                        0.15,
                        footprint(1.0),
                    ),
                ],
            ),
            trade(
                Trade::Mechanical,
                vec![
                    item(
                        "unit_heaters",
                        "Warehouse Unit Heaters",
                        Each,
                        0.30,
                        each(WAREHOUSE, 12_000.0),
                    ),
                    item(
                        "office_rtus",
                        "Office Rooftop Units",
                        Each,
                        0.20,
                        each(OFFICE, 1_200.0),
                    ),
                    item(
                        "exhaust_fans",
                        "Exhaust Fans",
                        Each,
                        0.15,
                        each(WAREHOUSE, 20_000.0),
                    ),
                    item("ductwork", "Ductwork", SquareFoot, 0.20, per_sf()),
                    item("controls", "Controls", LumpSum, 0.15, lump_sum()),
                ],
            ),
            trade(
                Trade::Electrical,
                vec![
                    item("service", "Electrical Service", LumpSum, 0.18, lump_sum()),
                    item(
                        "high_bay_lighting",
                        "High-Bay LED Lighting",
                        SquareFoot,
                        0.32,
                        area(STORAGE),
                    ),
                    item("dock_power", "Dock Equipment Power", Each, 0.12, docks()),
                    item(
                        "distribution",
                        "Power Distribution",
                        SquareFoot,
                        0.26,
                        per_sf(),
                    ),
                    item("fire_alarm", "Fire Alarm", SquareFoot, 0.12, per_sf()),
                ],
            ),
            trade(
                Trade::Plumbing,
                vec![
                    item(
                        "esfr_sprinklers",
                        "ESFR Sprinkler System",
                        SquareFoot,
                        0.48,
                        per_sf(),
                    ),
                    item("fire_pump", "Fire Pump", LumpSum, 0.14, lump_sum()),
                    item(
                        "restroom_groups",
                        "Restroom Groups",
                        Each,
                        0.20,
                        QuantityRule::PerRestroomGroup {
                            sf_per_group: 25_000.0,
                            minimum: 1.0,
                            override_key: Some("restroom_groups"),
                        },
                    ),
                    item(
                        "piping",
                        "Domestic Water & Waste Piping",
                        SquareFoot,
                        0.18,
                        per_sf(),
                    ),
                ],
            ),
            trade(
                Trade::Finishes,
                vec![
                    item(
                        "office_buildout",
                        "Office Buildout",
                        SquareFoot,
                        0.40,
                        area(OFFICE),
                    ),
                    item(
                        "sealed_concrete",
                        "Sealed Concrete Floors",
                        SquareFoot,
                        0.30,
                        area(STORAGE),
                    ),
                    item(
                        "dock_equipment",
                        "Dock Levelers & Seals",
                        Each,
                        0.20,
                        docks(),
                    ),
                    item(
                        "doors",
                        "Doors, Frames & Hardware",
                        Each,
                        0.10,
                        each(WHOLE, 10_000.0),
                    ),
                ],
            ),
            trade(
                Trade::Site,
                vec![
                    item(
                        "truck_court",
                        "Truck Court & Paving",
                        SquareFoot,
                        0.40,
                        footprint(1.2),
                    ),
                    item("utilities", "Site Utilities", LumpSum, 0.20, lump_sum()),
                    item(
                        "stormwater",
                        "Stormwater Management",
                        SquareFoot,
                        0.25,
                        footprint(2.2),
                    ),
                    item(
                        "landscaping",
                        "Landscaping",
                        SquareFoot,
                        0.15,
                        footprint(0.33),
                    ),
                ],
            ),
        ],
    }
}

fn multifamily() -> ScopeProfile {
    use Unit::{Each, LumpSum, SquareFoot};
    let dwelling = |sf_per_each: f64| QuantityRule::PerSpace {
        spaces: UNITS,
        sf_per_each,
        minimum: 1.0,
        override_key: Some("units"),
    };
    ScopeProfile {
        id: "multifamily_residential_v1",
        trades: vec![
            trade(
                Trade::Structural,
                vec![
                    item(
                        "foundations",
                        "Foundations & Podium Slab",
                        SquareFoot,
                        0.18,
                        footprint(1.0),
                    ),
                    item("framing", "Structural Framing", SquareFoot, 0.42, per_sf()),
                    item("roof", "Roof Assembly", SquareFoot, 0.12, footprint(1.0)),
                    item("envelope", "Exterior Envelope", SquareFoot, 0.28, per_sf()),
                ],
            ),
            trade(
                Trade::Mechanical,
                vec![
                    item(
                        "unit_hvac",
                        "Dwelling Unit HVAC",
                        Each,
                        0.45,
                        dwelling(1_050.0),
                    ),
                    item("ductwork", "Ductwork", SquareFoot, 0.22, per_sf()),
                    item(
                        "corridor_ventilation",
                        "Corridor Pressurization",
                        SquareFoot,
                        0.15,
                        area(COMMON),
                    ),
                    item(
                        "bath_exhaust",
                        "Bath & Kitchen Exhaust",
                        Each,
                        0.10,
                        dwelling(1_050.0),
                    ),
                    item("controls", "Controls", LumpSum, 0.08, lump_sum()),
                ],
            ),
            trade(
                Trade::Electrical,
                vec![
                    item(
                        "unit_panels",
                        "Dwelling Unit Panels & Metering",
                        Each,
                        0.30,
                        dwelling(1_050.0),
                    ),
                    item(
                        "distribution",
                        "Power Distribution",
                        SquareFoot,
                        0.25,
                        per_sf(),
                    ),
                    item("lighting", "Lighting", SquareFoot, 0.22, per_sf()),
                    item("fire_alarm", "Fire Alarm", SquareFoot, 0.13, per_sf()),
                    item(
                        "low_voltage",
                        "Low Voltage & Access Control",
                        SquareFoot,
                        0.10,
                        per_sf(),
                    ),
                ],
            ),
            trade(
                Trade::Plumbing,
                vec![
                    item(
                        "unit_fixtures",
                        "Dwelling Unit Fixtures",
                        Each,
                        0.40,
                        dwelling(1_050.0),
                    ),
                    item(
                        "piping",
                        "Domestic Water & Waste Piping",
                        SquareFoot,
                        0.30,
                        per_sf(),
                    ),
                    item(
                        "sprinklers",
                        "NFPA 13R Sprinklers",
                        SquareFoot,
                        0.20,
                        per_sf(),
                    ),
                    item(
                        "water_heating",
                        "Central Water Heating",
                        LumpSum,
                        0.10,
                        lump_sum(),
                    ),
                ],
            ),
            trade(
                Trade::Finishes,
                vec![
                    item(
                        "unit_finishes",
                        "Unit Finishes & Casework",
                        SquareFoot,
                        0.50,
                        area(UNITS),
                    ),
                    item(
                        "common_finishes",
                        "Lobby & Corridor Finishes",
                        SquareFoot,
                        0.15,
                        area(COMMON),
                    ),
                    item(
                        "partitions",
                        "Demising & Interior Partitions",
                        SquareFoot,
                        0.20,
                        per_sf(),
                    ),
                    item(
                        "doors",
                        "Doors, Frames & Hardware",
                        Each,
                        0.15,
                        each(WHOLE, 350.0),
                    ),
                ],
            ),
        ],
    }
}

fn office() -> ScopeProfile {
    use Unit::{Each, LumpSum, SquareFoot};
    ScopeProfile {
        id: "office_commercial_v1",
        trades: vec![
            trade(
                Trade::Structural,
                vec![
                    item(
                        "foundations",
                        "Foundations",
                        SquareFoot,
                        0.20,
                        footprint(1.0),
                    ),
                    item(
                        "frame",
                        "Structural Frame & Decks",
                        SquareFoot,
                        0.40,
                        per_sf(),
                    ),
                    item("roof", "Roof Assembly", SquareFoot, 0.10, footprint(1.0)),
                    item("curtain_wall", "Curtain Wall", SquareFoot, 0.30, per_sf()),
                ],
            ),
            trade(
                Trade::Mechanical,
                vec![
                    item(
                        "air_handlers",
                        "Floor Air Handling Units",
                        Each,
                        0.30,
                        QuantityRule::PerFloor { per_floor: 1.0 },
                    ),
                    item(
                        "vav_boxes",
                        "VAV Terminal Units",
                        Each,
                        0.20,
                        each(WHOLE, 1_000.0),
                    ),
                    item("ductwork", "Ductwork", SquareFoot, 0.25, per_sf()),
                    item(
                        "controls",
                        "Building Automation",
                        SquareFoot,
                        0.15,
                        per_sf(),
                    ),
                    item(
                        "test_and_balance",
                        "Testing, Adjusting & Balancing",
                        LumpSum,
                        0.10,
                        lump_sum(),
                    ),
                ],
            ),
            trade(
                Trade::Electrical,
                vec![
                    item("service", "Electrical Service", LumpSum, 0.15, lump_sum()),
                    item(
                        "floor_distribution",
                        "Floor Distribution Panels",
                        Each,
                        0.20,
                        QuantityRule::PerFloor { per_floor: 2.0 },
                    ),
                    item(
                        "lighting",
                        "Lighting & Controls",
                        SquareFoot,
                        0.35,
                        per_sf(),
                    ),
                    item("fire_alarm", "Fire Alarm", SquareFoot, 0.12, per_sf()),
                    item(
                        "low_voltage",
                        "Telecom & Security",
                        SquareFoot,
                        0.18,
                        per_sf(),
                    ),
                ],
            ),
            trade(
                Trade::Plumbing,
                vec![
                    item(
                        "restroom_groups",
                        "Restroom Groups",
                        Each,
                        0.35,
                        QuantityRule::PerRestroomGroup {
                            sf_per_group: 10_000.0,
                            minimum: 1.0,
                            override_key: Some("restroom_groups"),
                        },
                    ),
                    item(
                        "piping",
                        "Domestic Water & Waste Piping",
                        SquareFoot,
                        0.30,
                        per_sf(),
                    ),
                    item("sprinklers", "Fire Sprinklers", SquareFoot, 0.25, per_sf()),
                    item("water_heating", "Water Heating", LumpSum, 0.10, lump_sum()),
                ],
            ),
            trade(
                Trade::Finishes,
                vec![
                    item(
                        "tenant_finishes",
                        "Tenant Finishes",
                        SquareFoot,
                        0.45,
                        area(OFFICE),
                    ),
                    item(
                        "lobby_finishes",
                        "Lobby & Core Finishes",
                        SquareFoot,
                        0.15,
                        area(COMMON),
                    ),
                    item("partitions", "Partitions", SquareFoot, 0.20, per_sf()),
                    item(
                        "doors",
                        "Doors, Frames & Hardware",
                        Each,
                        0.10,
                        each(WHOLE, 300.0),
                    ),
                    item("ceilings", "Acoustic Ceilings", SquareFoot, 0.10, per_sf()),
                ],
            ),
        ],
    }
}

fn restaurant() -> ScopeProfile {
    use Unit::{Each, LumpSum, SquareFoot};
    ScopeProfile {
        id: "restaurant_v1",
        trades: vec![
            trade(
                Trade::Structural,
                vec![
                    item(
                        "foundations",
                        "Foundations & Slab",
                        SquareFoot,
                        0.25,
                        footprint(1.0),
                    ),
                    item("frame", "Structural Frame", SquareFoot, 0.35, per_sf()),
                    item(
                        "roof",
                        "Roof & Curb Framing",
                        SquareFoot,
                        0.20,
                        footprint(1.0),
                    ),
                    item(
                        "storefront",
                        "Storefront & Envelope",
                        LumpSum,
                        0.20,
                        lump_sum(),
                    ),
                ],
            ),
            trade(
                Trade::Mechanical,
                vec![
                    item(
                        "kitchen_hoods",
                        "Kitchen Hoods & Makeup Air",
                        Each,
                        0.35,
                        each(KITCHEN, 400.0),
                    ),
                    item(
                        "rooftop_units",
                        "Rooftop Units",
                        Each,
                        0.30,
                        each(WHOLE, 1_500.0),
                    ),
                    item("ductwork", "Ductwork", SquareFoot, 0.20, per_sf()),
                    item("controls", "Controls", LumpSum, 0.15, lump_sum()),
                ],
            ),
            trade(
                Trade::Electrical,
                vec![
                    item("service", "Electrical Service", LumpSum, 0.20, lump_sum()),
                    item(
                        "kitchen_circuits",
                        "Kitchen Equipment Circuits",
                        SquareFoot,
                        0.30,
                        area(KITCHEN),
                    ),
                    item(
                        "lighting",
                        "Lighting & Controls",
                        SquareFoot,
                        0.30,
                        per_sf(),
                    ),
                    item("fire_alarm", "Fire Alarm", SquareFoot, 0.10, per_sf()),
                    item(
                        "low_voltage",
                        "POS & Low Voltage",
                        LumpSum,
                        0.10,
                        lump_sum(),
                    ),
                ],
            ),
            trade(
                Trade::Plumbing,
                vec![
                    item(
                        "grease_interceptor",
                        "Grease Interceptor",
                        LumpSum,
                        0.15,
                        lump_sum(),
                    ),
                    item(
                        "fixtures",
                        "Plumbing Fixtures",
                        Each,
                        0.30,
                        each(WHOLE, 300.0),
                    ),
                    item(
                        "piping",
                        "Domestic Water, Waste & Gas Piping",
                        SquareFoot,
                        0.30,
                        per_sf(),
                    ),
                    item(
                        "fire_suppression",
                        "Sprinklers & Hood Suppression",
                        SquareFoot,
                        0.25,
                        per_sf(),
                    ),
                ],
            ),
            trade(
                Trade::Finishes,
                vec![
                    item(
                        "dining_finishes",
                        "Dining Room Finishes",
                        SquareFoot,
                        0.45,
                        area(DINING),
                    ),
                    item(
                        "kitchen_finishes",
                        "Quarry Tile & FRP Kitchen Finishes",
                        SquareFoot,
                        0.30,
                        area(KITCHEN),
                    ),
                    item(
                        "restrooms",
                        "Restroom Finishes",
                        Each,
                        0.10,
                        QuantityRule::PerRestroomGroup {
                            sf_per_group: 2_500.0,
                            minimum: 1.0,
                            override_key: Some("restroom_groups"),
                        },
                    ),
                    item(
                        "doors",
                        "Doors, Frames & Hardware",
                        Each,
                        0.15,
                        each(WHOLE, 400.0),
                    ),
                ],
            ),
            trade(
                Trade::Site,
                vec![
                    item(
                        "parking",
                        "Parking Stalls & Paving",
                        Each,
                        0.40,
                        QuantityRule::PerSpace {
                            spaces: WHOLE,
                            sf_per_each: 100.0,
                            minimum: 10.0,
                            override_key: Some("parking_stalls"),
                        },
                    ),
                    item("utilities", "Site Utilities", LumpSum, 0.25, lump_sum()),
                    item(
                        "landscaping",
                        "Landscaping",
                        SquareFoot,
                        0.15,
                        footprint(1.5),
                    ),
                    item(
                        "stormwater",
                        "Stormwater Management",
                        SquareFoot,
                        0.20,
                        footprint(4.0),
                    ),
                ],
            ),
        ],
    }
}

pub fn scope_profiles() -> Vec<ScopeProfile> {
    vec![
        surgical_center(),
        outpatient(),
        warehouse(),
        multifamily(),
        office(),
        restaurant(),
    ]
}
