//! Decision-insurance policies: which metric collapses a deal, at what threshold, and in
//! which scenario order the break is searched for.

use serde::Serialize;

use super::profiles::{TileProfile, BASE_SCENARIO, CONSERVATIVE_ROW, UGLY_ROW};
use crate::estimation::domain::BuildingType;
use crate::estimation::pricing::{BuildingTypeProfile, RegistryError};

pub const DSCR_METRIC_REF: &str = "ownership_analysis.debt_metrics.calculated_dscr";
pub const NPV_METRIC_REF: &str = "ownership_analysis.return_metrics.npv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Comparator {
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessThanOrEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
}

impl Comparator {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
        }
    }

    pub fn holds(self, observed: f64, threshold: f64) -> bool {
        match self {
            Self::LessThan => observed < threshold,
            Self::LessThanOrEqual => observed <= threshold,
            Self::GreaterThan => observed > threshold,
            Self::GreaterThanOrEqual => observed >= threshold,
        }
    }

    /// Distance from `observed` to the break, positive while the trigger does not hold.
    pub fn headroom(self, observed: f64, threshold: f64) -> f64 {
        match self {
            Self::LessThan | Self::LessThanOrEqual => observed - threshold,
            Self::GreaterThan | Self::GreaterThanOrEqual => threshold - observed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollapseMetric {
    Dscr,
    Npv,
}

impl CollapseMetric {
    pub const fn metric_ref(self) -> &'static str {
        match self {
            Self::Dscr => DSCR_METRIC_REF,
            Self::Npv => NPV_METRIC_REF,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Dscr => "DSCR",
            Self::Npv => "NPV",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollapseTrigger {
    pub metric: CollapseMetric,
    pub metric_ref: &'static str,
    pub operator: Comparator,
    pub threshold: f64,
    pub scenario_priority: Vec<&'static str>,
}

/// Flex-before-break bands, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlexCalibration {
    pub tight_max_pct: f64,
    pub moderate_max_pct: f64,
}

impl Default for FlexCalibration {
    fn default() -> Self {
        Self {
            tight_max_pct: 2.0,
            moderate_max_pct: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionInsurancePolicy {
    pub profile_id: &'static str,
    pub primary_control_variable: &'static str,
    pub collapse_trigger: CollapseTrigger,
    pub flex_calibration: FlexCalibration,
}

/// Debt-funded building types collapse on coverage; publicly funded ones on value.
fn collapse_metric(building_type: BuildingType) -> CollapseMetric {
    match building_type {
        BuildingType::Educational | BuildingType::Civic => CollapseMetric::Npv,
        _ => CollapseMetric::Dscr,
    }
}

pub fn policy_for(
    profile: &TileProfile,
    building: &BuildingTypeProfile,
) -> DecisionInsurancePolicy {
    let metric = collapse_metric(profile.building_type);
    let threshold = match metric {
        CollapseMetric::Dscr => building.thresholds.min_dscr,
        CollapseMetric::Npv => building.thresholds.min_npv,
    };
    let driver_row = profile
        .driver_row()
        .map_or(profile.driver_tile_id, |row| row.row_id);

    DecisionInsurancePolicy {
        profile_id: profile.id,
        primary_control_variable: profile.driver_tile_id,
        collapse_trigger: CollapseTrigger {
            metric,
            metric_ref: metric.metric_ref(),
            operator: Comparator::LessThan,
            threshold,
            scenario_priority: vec![BASE_SCENARIO, CONSERVATIVE_ROW, driver_row, UGLY_ROW],
        },
        flex_calibration: FlexCalibration::default(),
    }
}

impl DecisionInsurancePolicy {
    pub fn validate(&self, profile: &TileProfile) -> Result<(), RegistryError> {
        let invalid = |reason: String| RegistryError::InvalidPolicy {
            profile_id: self.profile_id.to_string(),
            reason,
        };

        let priority = &self.collapse_trigger.scenario_priority;
        if priority.first() != Some(&BASE_SCENARIO) {
            return Err(invalid("scenario priority must start with base".to_string()));
        }
        if priority.len() != 4 {
            return Err(invalid(format!(
                "scenario priority lists {} scenarios, expected 4",
                priority.len()
            )));
        }
        let known = profile.scenario_ids();
        for (index, scenario) in priority.iter().enumerate() {
            if priority[..index].contains(scenario) {
                return Err(invalid(format!("scenario '{scenario}' is listed twice")));
            }
            if !known.contains(scenario) {
                return Err(invalid(format!("scenario '{scenario}' is not a derived row")));
            }
        }
        if profile.tile(self.primary_control_variable).is_none() {
            return Err(RegistryError::UnknownTile {
                profile_id: self.profile_id.to_string(),
                tile_id: self.primary_control_variable.to_string(),
            });
        }
        let flex = self.flex_calibration;
        if !(0.0 < flex.tight_max_pct && flex.tight_max_pct < flex.moderate_max_pct) {
            return Err(invalid("flex calibration bands must be increasing".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::dealshield::profiles::tile_profiles;
    use crate::estimation::pricing::building_types::profile_for;

    #[test]
    fn comparator_headroom_is_positive_until_the_break() {
        assert!(Comparator::LessThan.holds(1.1, 1.25));
        assert!(!Comparator::LessThan.holds(1.25, 1.25));
        assert!((Comparator::LessThan.headroom(1.5, 1.25) - 0.25).abs() < 1e-12);
        assert!(Comparator::GreaterThan.headroom(0.5, 0.4) < 0.0);
    }

    #[test]
    fn civic_and_educational_collapse_on_npv() {
        for profile in tile_profiles() {
            let policy = policy_for(&profile, &profile_for(profile.building_type));
            let expected = match profile.building_type {
                BuildingType::Educational | BuildingType::Civic => NPV_METRIC_REF,
                _ => DSCR_METRIC_REF,
            };
            assert_eq!(policy.collapse_trigger.metric_ref, expected, "{}", profile.id);
        }
    }

    #[test]
    fn priority_must_start_with_base() {
        let profile = tile_profiles().remove(0);
        let mut policy = policy_for(&profile, &profile_for(profile.building_type));
        policy.collapse_trigger.scenario_priority.swap(0, 1);
        assert!(matches!(
            policy.validate(&profile),
            Err(RegistryError::InvalidPolicy { .. })
        ));
    }

    #[test]
    fn duplicate_priority_entries_are_rejected() {
        let profile = tile_profiles().remove(0);
        let mut policy = policy_for(&profile, &profile_for(profile.building_type));
        policy.collapse_trigger.scenario_priority[3] = CONSERVATIVE_ROW;
        assert!(policy.validate(&profile).is_err());
    }
}
