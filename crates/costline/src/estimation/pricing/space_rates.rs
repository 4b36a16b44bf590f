use crate::estimation::domain::{QualityLevel, SpaceType};
use serde::Serialize;

/// A unit rate that varies with finish quality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TieredRate {
    pub economy: f64,
    pub standard: f64,
    pub premium: f64,
}

impl TieredRate {
    pub fn new(economy: f64, standard: f64, premium: f64) -> Self {
        Self {
            economy,
            standard,
            premium,
        }
    }

    /// Standard rate with the house economy/premium spread.
    pub fn spread(standard: f64) -> Self {
        Self::new(standard * 0.82, standard, standard * 1.35)
    }

    pub fn at(&self, quality: QualityLevel) -> f64 {
        match quality {
            QualityLevel::Economy => self.economy,
            QualityLevel::Standard => self.standard,
            QualityLevel::Premium => self.premium,
        }
    }
}

/// Known-good cost per square foot band used by calculator validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExpectedRange {
    pub low: f64,
    pub high: f64,
}

impl ExpectedRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ElectricalRates {
    pub per_sf: TieredRate,
    pub sf_per_fixture: f64,
    pub fixture_cost: f64,
    pub sf_per_circuit: f64,
    /// Spaces with heavy equipment loads push service sizing up a step.
    pub high_load: bool,
    pub expected: ExpectedRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MechanicalRates {
    pub sf_per_ton: f64,
    pub ductwork_per_sf: TieredRate,
    pub sf_per_diffuser: f64,
    pub exhaust_per_sf: f64,
    pub expected: ExpectedRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlumbingRates {
    pub sf_per_fixture: f64,
    pub fixture_cost: TieredRate,
    pub piping_per_sf: f64,
    pub expected: ExpectedRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FinishRates {
    pub per_sf: TieredRate,
    pub sf_per_door: f64,
    pub partition_lf_per_sf: f64,
    pub ceiling_per_sf: f64,
    pub expected: ExpectedRange,
}

/// Installed cost per linear foot of interior partition.
pub const PARTITION_COST_PER_LF: f64 = 95.0;
/// Installed cost per interior door, frame and hardware.
pub const DOOR_COST: f64 = 1_450.0;

/// Everything the calculators know about one space type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpaceRates {
    pub space: SpaceType,
    pub electrical: ElectricalRates,
    pub mechanical: MechanicalRates,
    pub plumbing: PlumbingRates,
    pub finishes: FinishRates,
}

fn electrical(
    per_sf: f64,
    sf_per_fixture: f64,
    fixture_cost: f64,
    sf_per_circuit: f64,
    high_load: bool,
    expected: (f64, f64),
) -> ElectricalRates {
    ElectricalRates {
        per_sf: TieredRate::spread(per_sf),
        sf_per_fixture,
        fixture_cost,
        sf_per_circuit,
        high_load,
        expected: ExpectedRange::new(expected.0, expected.1),
    }
}

fn mechanical(
    sf_per_ton: f64,
    ductwork_per_sf: f64,
    sf_per_diffuser: f64,
    exhaust_per_sf: f64,
    expected: (f64, f64),
) -> MechanicalRates {
    MechanicalRates {
        sf_per_ton,
        ductwork_per_sf: TieredRate::spread(ductwork_per_sf),
        sf_per_diffuser,
        exhaust_per_sf,
        expected: ExpectedRange::new(expected.0, expected.1),
    }
}

fn plumbing(
    sf_per_fixture: f64,
    fixture_cost: f64,
    piping_per_sf: f64,
    expected: (f64, f64),
) -> PlumbingRates {
    PlumbingRates {
        sf_per_fixture,
        fixture_cost: TieredRate::spread(fixture_cost),
        piping_per_sf,
        expected: ExpectedRange::new(expected.0, expected.1),
    }
}

fn finishes(
    per_sf: f64,
    sf_per_door: f64,
    partition_lf_per_sf: f64,
    ceiling_per_sf: f64,
) -> FinishRates {
    let base = per_sf + ceiling_per_sf;
    let interior = partition_lf_per_sf * PARTITION_COST_PER_LF + DOOR_COST / sf_per_door;
    FinishRates {
        per_sf: TieredRate::spread(per_sf),
        sf_per_door,
        partition_lf_per_sf,
        ceiling_per_sf,
        expected: ExpectedRange::new(base * 0.8, (base + interior) * 1.5),
    }
}

/// Pricing table for a single space type.
pub fn rates_for(space: SpaceType) -> SpaceRates {
    let (electrical, mechanical, plumbing, finishes) = match space {
        SpaceType::Office => (
            electrical(14.0, 80.0, 325.0, 400.0, false, (18.0, 32.0)),
            mechanical(350.0, 9.0, 180.0, 0.0, (22.0, 40.0)),
            plumbing(1_500.0, 2_400.0, 4.5, (6.0, 12.0)),
            finishes(38.0, 300.0, 0.09, 6.5),
        ),
        SpaceType::Retail => (
            electrical(12.0, 70.0, 300.0, 500.0, false, (15.0, 28.0)),
            mechanical(300.0, 8.0, 200.0, 0.0, (20.0, 36.0)),
            plumbing(3_000.0, 2_200.0, 3.5, (4.0, 9.0)),
            finishes(32.0, 1_200.0, 0.04, 5.5),
        ),
        SpaceType::Restaurant => (
            electrical(20.0, 60.0, 350.0, 250.0, false, (25.0, 42.0)),
            mechanical(200.0, 12.0, 120.0, 6.0, (35.0, 60.0)),
            plumbing(300.0, 2_800.0, 9.0, (15.0, 30.0)),
            finishes(55.0, 400.0, 0.08, 8.0),
        ),
        SpaceType::Kitchen => (
            electrical(32.0, 50.0, 400.0, 120.0, true, (40.0, 65.0)),
            mechanical(150.0, 14.0, 100.0, 18.0, (55.0, 90.0)),
            plumbing(150.0, 3_200.0, 14.0, (25.0, 45.0)),
            finishes(40.0, 500.0, 0.05, 7.0),
        ),
        SpaceType::Warehouse => (
            electrical(6.0, 400.0, 450.0, 2_000.0, false, (6.0, 12.0)),
            mechanical(1_200.0, 2.0, 1_000.0, 0.0, (5.0, 12.0)),
            plumbing(8_000.0, 2_000.0, 1.5, (1.5, 4.0)),
            finishes(6.0, 5_000.0, 0.005, 0.0),
        ),
        SpaceType::Manufacturing => (
            electrical(18.0, 250.0, 500.0, 600.0, true, (18.0, 34.0)),
            mechanical(600.0, 5.0, 500.0, 4.0, (14.0, 28.0)),
            plumbing(4_000.0, 2_200.0, 3.0, (3.0, 8.0)),
            finishes(14.0, 3_000.0, 0.01, 2.0),
        ),
        SpaceType::Classroom => (
            electrical(15.0, 75.0, 325.0, 400.0, false, (18.0, 30.0)),
            mechanical(275.0, 10.0, 160.0, 0.0, (24.0, 42.0)),
            plumbing(900.0, 2_400.0, 5.0, (7.0, 13.0)),
            finishes(36.0, 700.0, 0.07, 6.5),
        ),
        SpaceType::Laboratory => (
            electrical(28.0, 65.0, 420.0, 150.0, true, (35.0, 60.0)),
            mechanical(175.0, 16.0, 110.0, 15.0, (50.0, 90.0)),
            plumbing(300.0, 3_200.0, 12.0, (18.0, 35.0)),
            finishes(48.0, 400.0, 0.08, 8.0),
        ),
        SpaceType::MedicalExam => (
            electrical(20.0, 60.0, 380.0, 200.0, false, (24.0, 40.0)),
            mechanical(250.0, 12.0, 130.0, 3.0, (32.0, 55.0)),
            plumbing(250.0, 2_900.0, 9.0, (14.0, 26.0)),
            finishes(50.0, 150.0, 0.12, 8.0),
        ),
        SpaceType::SurgicalSuite => (
            electrical(42.0, 40.0, 650.0, 80.0, true, (55.0, 95.0)),
            mechanical(120.0, 22.0, 80.0, 20.0, (75.0, 130.0)),
            plumbing(350.0, 3_800.0, 16.0, (25.0, 45.0)),
            finishes(80.0, 300.0, 0.10, 12.0),
        ),
        SpaceType::PatientRoom => (
            electrical(24.0, 55.0, 420.0, 150.0, false, (28.0, 48.0)),
            mechanical(250.0, 13.0, 140.0, 4.0, (35.0, 60.0)),
            plumbing(200.0, 3_400.0, 11.0, (18.0, 32.0)),
            finishes(55.0, 250.0, 0.10, 8.0),
        ),
        SpaceType::ResidentialUnit => (
            electrical(10.0, 120.0, 220.0, 350.0, false, (11.0, 20.0)),
            mechanical(500.0, 7.0, 250.0, 1.0, (14.0, 26.0)),
            plumbing(180.0, 2_100.0, 7.0, (10.0, 20.0)),
            finishes(42.0, 200.0, 0.10, 5.0),
        ),
        SpaceType::HotelRoom => (
            electrical(12.0, 100.0, 260.0, 300.0, false, (13.0, 24.0)),
            mechanical(450.0, 8.0, 250.0, 1.0, (16.0, 30.0)),
            plumbing(170.0, 2_300.0, 8.0, (12.0, 22.0)),
            finishes(48.0, 250.0, 0.10, 6.0),
        ),
        SpaceType::Common => (
            electrical(11.0, 90.0, 350.0, 500.0, false, (12.0, 24.0)),
            mechanical(350.0, 8.0, 200.0, 0.0, (18.0, 32.0)),
            plumbing(2_500.0, 2_400.0, 3.0, (3.0, 8.0)),
            finishes(40.0, 800.0, 0.04, 6.5),
        ),
    };

    SpaceRates {
        space,
        electrical,
        mechanical,
        plumbing,
        finishes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_space_type_has_positive_densities() {
        for space in SpaceType::ordered() {
            let rates = rates_for(space);
            assert_eq!(rates.space, space);
            assert!(rates.electrical.sf_per_fixture > 0.0, "{space:?}");
            assert!(rates.electrical.sf_per_circuit > 0.0, "{space:?}");
            assert!(rates.mechanical.sf_per_ton > 0.0, "{space:?}");
            assert!(rates.mechanical.sf_per_diffuser > 0.0, "{space:?}");
            assert!(rates.plumbing.sf_per_fixture > 0.0, "{space:?}");
            assert!(rates.finishes.sf_per_door > 0.0, "{space:?}");
        }
    }

    #[test]
    fn tiers_are_ordered_by_quality() {
        let rate = TieredRate::spread(20.0);
        assert!(rate.at(QualityLevel::Economy) < rate.at(QualityLevel::Standard));
        assert!(rate.at(QualityLevel::Standard) < rate.at(QualityLevel::Premium));
    }
}
