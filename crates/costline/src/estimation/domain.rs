use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingType {
    Multifamily,
    Office,
    Retail,
    Restaurant,
    Hospitality,
    Healthcare,
    Educational,
    Industrial,
    MixedUse,
    Civic,
}

impl BuildingType {
    pub const fn ordered() -> [Self; 10] {
        [
            Self::Multifamily,
            Self::Office,
            Self::Retail,
            Self::Restaurant,
            Self::Hospitality,
            Self::Healthcare,
            Self::Educational,
            Self::Industrial,
            Self::MixedUse,
            Self::Civic,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Multifamily => "multifamily",
            Self::Office => "office",
            Self::Retail => "retail",
            Self::Restaurant => "restaurant",
            Self::Hospitality => "hospitality",
            Self::Healthcare => "healthcare",
            Self::Educational => "educational",
            Self::Industrial => "industrial",
            Self::MixedUse => "mixed_use",
            Self::Civic => "civic",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Multifamily => "Multifamily Residential",
            Self::Office => "Office",
            Self::Retail => "Retail",
            Self::Restaurant => "Restaurant",
            Self::Hospitality => "Hospitality",
            Self::Healthcare => "Healthcare",
            Self::Educational => "Educational",
            Self::Industrial => "Industrial",
            Self::MixedUse => "Mixed Use",
            Self::Civic => "Civic",
        }
    }

    /// Building types whose ground-up projects carry a separate site-work trade.
    pub const fn includes_site_work(self) -> bool {
        matches!(self, Self::Industrial | Self::Retail | Self::Restaurant)
    }
}

impl fmt::Display for BuildingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for BuildingType {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ordered()
            .into_iter()
            .find(|candidate| candidate.key() == normalized)
            .ok_or_else(|| format!("unknown building type '{raw}'"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectClassification {
    #[default]
    GroundUp,
    Addition,
    Renovation,
}

impl ProjectClassification {
    pub const fn label(self) -> &'static str {
        match self {
            Self::GroundUp => "Ground-Up",
            Self::Addition => "Addition",
            Self::Renovation => "Renovation",
        }
    }
}

impl FromStr for ProjectClassification {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "ground_up" | "new" | "new_construction" => Ok(Self::GroundUp),
            "addition" => Ok(Self::Addition),
            "renovation" | "remodel" => Ok(Self::Renovation),
            _ => Err(format!("unknown project classification '{raw}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    Economy,
    #[default]
    Standard,
    Premium,
}

impl QualityLevel {
    /// Keyword detection over free-text special requirements.
    pub fn detect(special_requirements: &str) -> Option<Self> {
        let text = special_requirements.to_ascii_lowercase();
        if ["luxury", "premium", "high-end", "high end"]
            .iter()
            .any(|keyword| text.contains(keyword))
        {
            Some(Self::Premium)
        } else if ["economy", "budget"].iter().any(|keyword| text.contains(keyword)) {
            Some(Self::Economy)
        } else {
            None
        }
    }
}

impl FromStr for QualityLevel {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "economy" => Ok(Self::Economy),
            "standard" => Ok(Self::Standard),
            "premium" => Ok(Self::Premium),
            _ => Err(format!("unknown quality level '{raw}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceType {
    Office,
    Retail,
    Restaurant,
    Kitchen,
    Warehouse,
    Manufacturing,
    Classroom,
    Laboratory,
    MedicalExam,
    SurgicalSuite,
    PatientRoom,
    ResidentialUnit,
    HotelRoom,
    Common,
}

impl SpaceType {
    pub const fn ordered() -> [Self; 14] {
        [
            Self::Office,
            Self::Retail,
            Self::Restaurant,
            Self::Kitchen,
            Self::Warehouse,
            Self::Manufacturing,
            Self::Classroom,
            Self::Laboratory,
            Self::MedicalExam,
            Self::SurgicalSuite,
            Self::PatientRoom,
            Self::ResidentialUnit,
            Self::HotelRoom,
            Self::Common,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Office => "office",
            Self::Retail => "retail",
            Self::Restaurant => "restaurant",
            Self::Kitchen => "kitchen",
            Self::Warehouse => "warehouse",
            Self::Manufacturing => "manufacturing",
            Self::Classroom => "classroom",
            Self::Laboratory => "laboratory",
            Self::MedicalExam => "medical_exam",
            Self::SurgicalSuite => "surgical_suite",
            Self::PatientRoom => "patient_room",
            Self::ResidentialUnit => "residential_unit",
            Self::HotelRoom => "hotel_room",
            Self::Common => "common",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Office => "Office",
            Self::Retail => "Retail Sales",
            Self::Restaurant => "Dining",
            Self::Kitchen => "Commercial Kitchen",
            Self::Warehouse => "Warehouse",
            Self::Manufacturing => "Manufacturing",
            Self::Classroom => "Classroom",
            Self::Laboratory => "Laboratory",
            Self::MedicalExam => "Exam / Treatment",
            Self::SurgicalSuite => "Surgical Suite",
            Self::PatientRoom => "Patient / Recovery",
            Self::ResidentialUnit => "Residential Unit",
            Self::HotelRoom => "Guest Room",
            Self::Common => "Common / Circulation",
        }
    }
}

impl FromStr for SpaceType {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ordered()
            .into_iter()
            .find(|candidate| candidate.key() == normalized)
            .ok_or_else(|| format!("unknown space type '{raw}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trade {
    Structural,
    Mechanical,
    Electrical,
    Plumbing,
    Finishes,
    Site,
}

impl Trade {
    /// Fixed calculation and reporting order.
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Structural,
            Self::Mechanical,
            Self::Electrical,
            Self::Plumbing,
            Self::Finishes,
            Self::Site,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Mechanical => "mechanical",
            Self::Electrical => "electrical",
            Self::Plumbing => "plumbing",
            Self::Finishes => "finishes",
            Self::Site => "site",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Structural => "Structural",
            Self::Mechanical => "Mechanical (HVAC)",
            Self::Electrical => "Electrical",
            Self::Plumbing => "Plumbing & Fire Protection",
            Self::Finishes => "Interior Finishes",
            Self::Site => "Site Work",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "EA")]
    Each,
    #[serde(rename = "SF")]
    SquareFoot,
    #[serde(rename = "LF")]
    LinearFoot,
    #[serde(rename = "LS")]
    LumpSum,
    #[serde(rename = "Ton")]
    Ton,
}

impl Unit {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Each => "EA",
            Self::SquareFoot => "SF",
            Self::LinearFoot => "LF",
            Self::LumpSum => "LS",
            Self::Ton => "Ton",
        }
    }
}

/// A single priced, quantified line. `total_cost` is always `quantity * unit_cost`
/// for calculator items; scope items carry their exact allocation instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub category: String,
}

impl LineItem {
    pub fn new(
        name: impl Into<String>,
        quantity: f64,
        unit: Unit,
        unit_cost: f64,
        category: impl Into<String>,
    ) -> Self {
        let quantity = quantity.max(0.0);
        let unit_cost = unit_cost.max(0.0);
        Self {
            name: name.into(),
            quantity,
            unit,
            unit_cost,
            total_cost: quantity * unit_cost,
            category: category.into(),
        }
    }

    pub fn lump_sum(name: impl Into<String>, amount: f64, category: impl Into<String>) -> Self {
        Self::new(name, 1.0, Unit::LumpSum, amount, category)
    }

    pub(crate) fn scaled(&self, factor: f64) -> Self {
        Self {
            unit_cost: self.unit_cost * factor,
            total_cost: self.total_cost * factor,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationMessage {
    pub level: ValidationLevel,
    pub message: String,
}

/// Output of one trade calculator for one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeResult {
    pub trade: Trade,
    pub line_items: Vec<LineItem>,
    pub pre_regional_subtotal: f64,
    pub regional_multiplier: f64,
    pub classification_factor: f64,
    /// Scenario stress applied on top of the calculated subtotal (1.0 outside DealShield).
    pub stress_factor: f64,
    pub subtotal: f64,
    pub cost_per_sqft: f64,
    pub validation: Vec<ValidationMessage>,
}

impl TradeResult {
    pub(crate) fn stressed(mut self, factor: f64) -> Self {
        if (factor - 1.0).abs() < f64::EPSILON {
            return self;
        }
        self.line_items = self.line_items.iter().map(|item| item.scaled(factor)).collect();
        self.subtotal = self.line_items.iter().map(|item| item.total_cost).sum();
        self.cost_per_sqft *= factor;
        self.stress_factor *= factor;
        self
    }
}

/// Financing inputs for debt sizing. Fractions throughout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancingAssumptions {
    pub loan_to_cost: f64,
    pub interest_rate: f64,
    pub amortization_years: u32,
}

/// Inbound estimate request, before registry defaults are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRequest {
    pub building_type: BuildingType,
    pub subtype: String,
    pub square_footage: f64,
    pub location: String,
    #[serde(default)]
    pub project_classification: ProjectClassification,
    #[serde(default)]
    pub building_mix: BTreeMap<SpaceType, f64>,
    #[serde(default)]
    pub special_requirements: String,
    #[serde(default = "default_floors")]
    pub num_floors: u32,
    #[serde(default)]
    pub quality: Option<QualityLevel>,
    /// Explicit quantity overrides such as `dock_doors` or `restroom_groups`.
    #[serde(default)]
    pub extras: BTreeMap<String, f64>,
    /// Replaces the building-type financing defaults.
    #[serde(default)]
    pub financing: Option<FinancingAssumptions>,
    /// `Some(false)` strips financing so debt metrics are reported as not modeled.
    #[serde(default)]
    pub include_financing: Option<bool>,
}

fn default_floors() -> u32 {
    1
}

impl ProjectRequest {
    pub fn new(
        building_type: BuildingType,
        subtype: impl Into<String>,
        square_footage: f64,
        location: impl Into<String>,
    ) -> Self {
        Self {
            building_type,
            subtype: subtype.into(),
            square_footage,
            location: location.into(),
            project_classification: ProjectClassification::GroundUp,
            building_mix: BTreeMap::new(),
            special_requirements: String::new(),
            num_floors: 1,
            quality: None,
            extras: BTreeMap::new(),
            financing: None,
            include_financing: None,
        }
    }
}

/// Area assigned to one space type after mix normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpaceAllocation {
    pub space: SpaceType,
    pub fraction: f64,
    pub area: f64,
}

/// Immutable description of the building being priced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectDescription {
    pub building_type: BuildingType,
    /// Normalized subtype key as requested; registry lookups apply the fallback chain.
    pub subtype: String,
    pub square_footage: f64,
    pub location: String,
    pub classification: ProjectClassification,
    pub building_mix: BTreeMap<SpaceType, f64>,
    pub special_requirements: String,
    pub num_floors: u32,
    pub quality: QualityLevel,
    pub extras: BTreeMap<String, f64>,
}

const MIX_EPSILON: f64 = 1e-9;

impl ProjectDescription {
    /// Partition square footage by the building mix.
    ///
    /// Fractions summing below 1.0 leave the remainder as common space, sums above 1.0
    /// are normalized, and an empty or unusable mix becomes 100% office.
    pub fn space_allocations(&self) -> Vec<SpaceAllocation> {
        let usable: Vec<(SpaceType, f64)> = self
            .building_mix
            .iter()
            .filter(|(_, fraction)| fraction.is_finite() && **fraction > 0.0)
            .map(|(space, fraction)| (*space, *fraction))
            .collect();
        let declared: f64 = usable.iter().map(|(_, fraction)| fraction).sum();

        let mut fractions: BTreeMap<SpaceType, f64> = BTreeMap::new();
        if declared <= MIX_EPSILON {
            fractions.insert(SpaceType::Office, 1.0);
        } else if declared > 1.0 + MIX_EPSILON {
            for (space, fraction) in usable {
                fractions.insert(space, fraction / declared);
            }
        } else {
            for (space, fraction) in usable {
                fractions.insert(space, fraction);
            }
            let remainder = 1.0 - declared;
            if remainder > MIX_EPSILON {
                *fractions.entry(SpaceType::Common).or_insert(0.0) += remainder;
            }
        }

        let square_footage = self.square_footage.max(0.0);
        fractions
            .into_iter()
            .map(|(space, fraction)| SpaceAllocation {
                space,
                fraction,
                area: square_footage * fraction,
            })
            .collect()
    }

    /// Combined area of the given spaces; an empty slice means the whole building.
    pub fn area_of(&self, spaces: &[SpaceType]) -> f64 {
        if spaces.is_empty() {
            return self.square_footage.max(0.0);
        }
        self.space_allocations()
            .iter()
            .filter(|allocation| spaces.contains(&allocation.space))
            .map(|allocation| allocation.area)
            .sum()
    }

    pub fn floors(&self) -> u32 {
        self.num_floors.max(1)
    }

    pub fn footprint(&self) -> f64 {
        self.square_footage.max(0.0) / f64::from(self.floors())
    }

    pub fn extra(&self, key: &str) -> Option<f64> {
        self.extras
            .get(key)
            .copied()
            .filter(|value| value.is_finite() && *value >= 0.0)
    }

    pub fn is_california(&self) -> bool {
        crate::estimation::regional::mentions_state(&self.location, "california", "ca")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn description(mix: &[(SpaceType, f64)]) -> ProjectDescription {
        ProjectDescription {
            building_type: BuildingType::Office,
            subtype: "class_a".to_string(),
            square_footage: 10_000.0,
            location: "Denver, CO".to_string(),
            classification: ProjectClassification::GroundUp,
            building_mix: mix.iter().copied().collect(),
            special_requirements: String::new(),
            num_floors: 2,
            quality: QualityLevel::Standard,
            extras: BTreeMap::new(),
        }
    }

    #[test]
    fn empty_mix_defaults_to_office() {
        let allocations = description(&[]).space_allocations();
        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].space, SpaceType::Office);
        assert_eq!(allocations[0].area, 10_000.0);
    }

    #[test]
    fn partial_mix_leaves_remainder_as_common_space() {
        let allocations = description(&[(SpaceType::Office, 0.7)]).space_allocations();
        let common = allocations
            .iter()
            .find(|allocation| allocation.space == SpaceType::Common)
            .expect("remainder allocated");
        assert!((common.area - 3_000.0).abs() < 1e-6);
    }

    #[test]
    fn oversubscribed_mix_is_normalized() {
        let allocations =
            description(&[(SpaceType::Office, 1.0), (SpaceType::Retail, 1.0)]).space_allocations();
        let total: f64 = allocations.iter().map(|allocation| allocation.area).sum();
        assert!((total - 10_000.0).abs() < 1e-6);
        assert!(allocations
            .iter()
            .all(|allocation| (allocation.fraction - 0.5).abs() < 1e-9));
    }

    #[test]
    fn footprint_divides_by_floor_count() {
        assert_eq!(description(&[]).footprint(), 5_000.0);
    }

    #[test]
    fn quality_is_detected_from_requirements() {
        assert_eq!(
            QualityLevel::detect("Luxury finishes throughout"),
            Some(QualityLevel::Premium)
        );
        assert_eq!(QualityLevel::detect("budget build"), Some(QualityLevel::Economy));
        assert_eq!(QualityLevel::detect("standard"), None);
    }

    #[test]
    fn building_type_parses_loose_keys() {
        assert_eq!("Mixed Use".parse::<BuildingType>(), Ok(BuildingType::MixedUse));
        assert!("spaceport".parse::<BuildingType>().is_err());
    }
}
