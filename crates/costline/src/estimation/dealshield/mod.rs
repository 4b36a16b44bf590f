//! DealShield: stress-tests an estimate against its tile profile and reports where, if
//! anywhere, the deal collapses.

mod computed;
mod metrics;
pub mod policy;
pub mod profiles;
mod scenarios;
mod view;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::domain::{FinancingAssumptions, ProjectDescription};
use super::engine::CostEngine;
use super::financial::FinancialAnalyzer;
use super::pricing::{FallbackTier, RegistryError};

pub use computed::{Computed, Provenance, ProvenanceStatus};
pub use metrics::{
    resolve as resolve_metric, ScenarioSnapshot, ANNUAL_REVENUE_REF, HEADLINE_REFS, NOI_REF,
    OPERATING_EXPENSES_REF, ROI_REF, TOTAL_COST_REF,
};
pub use policy::{CollapseMetric, Comparator, DecisionInsurancePolicy};
pub use profiles::{TileProfile, BASE_SCENARIO};
pub use view::{
    BreakCondition, BreakRisk, ControlVariable, DealShieldView, DecisionStatus,
    DecisionTableRow, FlexBand, ImpactSeverity, RankedLikelyWrong,
};

/// Supported stress bands, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum StressBand {
    Three,
    Five,
    Seven,
    Ten,
}

impl StressBand {
    pub const fn pct(self) -> u8 {
        match self {
            Self::Three => 3,
            Self::Five => 5,
            Self::Seven => 7,
            Self::Ten => 10,
        }
    }

    pub fn fraction(self) -> f64 {
        f64::from(self.pct()) / 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedStressBand(pub u8);

impl fmt::Display for UnsupportedStressBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stress band {}% is not one of 3, 5, 7 or 10", self.0)
    }
}

impl std::error::Error for UnsupportedStressBand {}

impl TryFrom<u8> for StressBand {
    type Error = UnsupportedStressBand;

    fn try_from(pct: u8) -> Result<Self, Self::Error> {
        match pct {
            3 => Ok(Self::Three),
            5 => Ok(Self::Five),
            7 => Ok(Self::Seven),
            10 => Ok(Self::Ten),
            other => Err(UnsupportedStressBand(other)),
        }
    }
}

impl From<StressBand> for u8 {
    fn from(band: StressBand) -> Self {
        band.pct()
    }
}

/// Caller overrides for one DealShield evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DealShieldControls {
    pub stress_band: Option<StressBand>,
    /// Replaces the modeled total project cost before stressing.
    pub cost_anchor: Option<f64>,
    /// Replaces the modeled annual revenue before stressing.
    pub revenue_anchor: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum DealShieldError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("scenario '{scenario_id}' could not resolve metric '{metric_ref}'")]
    UnresolvedMetric {
        scenario_id: String,
        metric_ref: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileResolution {
    pub profile_id: String,
    pub tier: FallbackTier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSet {
    pub profile_id: String,
    pub stress_band_pct: u8,
    pub scenarios: BTreeMap<String, ScenarioSnapshot>,
    /// `base` first, then the derived rows in profile order.
    pub scenario_order: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealShieldReport {
    pub dealshield_tile_profile: String,
    pub profile_resolution: ProfileResolution,
    pub dealshield_scenarios: ScenarioSet,
    pub dealshield_view: DealShieldView,
}

impl DealShieldReport {
    pub fn decision_status(&self) -> Option<DecisionStatus> {
        self.dealshield_view.decision_status.value
    }
}

#[derive(Debug, Clone)]
pub struct DealShieldEngine {
    cost: CostEngine,
    financial: FinancialAnalyzer,
}

impl DealShieldEngine {
    pub fn new(cost: CostEngine, financial: FinancialAnalyzer) -> Self {
        Self { cost, financial }
    }

    pub fn evaluate(
        &self,
        project: &ProjectDescription,
        financing: Option<FinancingAssumptions>,
        controls: &DealShieldControls,
    ) -> Result<DealShieldReport, DealShieldError> {
        let registry = self.cost.registry();
        let profile = registry.tile_profile(project.building_type, &project.subtype)?;
        if profile.is_fallback() {
            warn!(
                building_type = project.building_type.key(),
                subtype = %project.subtype,
                profile = profile.value.id,
                "tile profile resolved by fallback"
            );
        }
        let tile_profile = profile.value;
        let policy = registry.policy(tile_profile.id)?;
        let band = controls
            .stress_band
            .unwrap_or(self.cost.settings().default_stress_band);

        let cost_anchor = controls.cost_anchor.filter(|anchor| *anchor > 0.0);
        let revenue_anchor = controls.revenue_anchor.filter(|anchor| *anchor >= 0.0);
        let cost_rebase = match cost_anchor {
            Some(anchor) => {
                let modeled = self.cost.calculate_project(project)?.totals.total_project_cost;
                if modeled > 0.0 {
                    anchor / modeled
                } else {
                    1.0
                }
            }
            None => 1.0,
        };

        let runner = scenarios::ScenarioRunner {
            cost: &self.cost,
            financial: &self.financial,
            project,
            financing,
            profile: tile_profile,
            band,
            cost_rebase,
            revenue_anchor,
        };

        let mut snapshots = BTreeMap::new();
        let mut scenario_order = Vec::with_capacity(tile_profile.derived_rows.len() + 1);
        let base = runner.run(BASE_SCENARIO, "Base", &[])?;
        scenario_order.push(base.scenario_id.clone());
        snapshots.insert(base.scenario_id.clone(), base);
        for row in &tile_profile.derived_rows {
            let snapshot = runner.run(row.row_id, row.label, &row.tile_ids)?;
            scenario_order.push(snapshot.scenario_id.clone());
            snapshots.insert(snapshot.scenario_id.clone(), snapshot);
        }

        let mut single_tile = BTreeMap::new();
        for tile_id in tile_profile
            .most_likely_wrong
            .iter()
            .filter_map(|entry| entry.driver_tile_id)
        {
            if single_tile.contains_key(tile_id) {
                continue;
            }
            let snapshot = runner.run(&format!("tile:{tile_id}"), tile_id, &[tile_id])?;
            single_tile.insert(tile_id.to_string(), snapshot);
        }
        debug!(
            profile = tile_profile.id,
            scenarios = snapshots.len(),
            single_tile_reruns = single_tile.len(),
            "dealshield scenarios priced"
        );

        let dealshield_view = view::build(&view::ViewInputs {
            profile: tile_profile,
            profile_tier: profile.tier,
            policy,
            scenarios: &snapshots,
            scenario_order: &scenario_order,
            single_tile: &single_tile,
            financing_modeled: financing.is_some(),
            band,
            cost_anchor,
            revenue_anchor,
        });

        info!(
            profile = tile_profile.id,
            stress_band_pct = band.pct(),
            decision = dealshield_view
                .decision_status
                .value
                .map_or("unavailable", DecisionStatus::label),
            "dealshield evaluated"
        );

        Ok(DealShieldReport {
            dealshield_tile_profile: tile_profile.id.to_string(),
            profile_resolution: ProfileResolution {
                profile_id: tile_profile.id.to_string(),
                tier: profile.tier,
            },
            dealshield_scenarios: ScenarioSet {
                profile_id: tile_profile.id.to_string(),
                stress_band_pct: band.pct(),
                scenarios: snapshots,
                scenario_order,
            },
            dealshield_view,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::estimation::domain::{BuildingType, ProjectRequest};
    use crate::estimation::pricing::PricingRegistry;
    use crate::estimation::EngineSettings;

    fn engine() -> DealShieldEngine {
        let registry = Arc::new(PricingRegistry::standard().expect("registry"));
        let settings = EngineSettings::default();
        DealShieldEngine::new(
            CostEngine::new(Arc::clone(&registry), settings),
            FinancialAnalyzer::new(registry, settings),
        )
    }

    fn describe(
        engine: &DealShieldEngine,
        building_type: BuildingType,
        subtype: &str,
    ) -> ProjectDescription {
        engine
            .cost
            .describe(&ProjectRequest::new(building_type, subtype, 60_000.0, "Charlotte, NC"))
            .expect("describe")
    }

    #[test]
    fn stress_band_accepts_only_supported_values() {
        assert_eq!(StressBand::try_from(7), Ok(StressBand::Seven));
        assert_eq!(StressBand::try_from(12), Err(UnsupportedStressBand(12)));
        let parsed: StressBand = serde_json::from_str("5").expect("band");
        assert_eq!(parsed, StressBand::Five);
        assert!(serde_json::from_str::<StressBand>("4").is_err());
    }

    #[test]
    fn scenario_keys_match_profile_rows() {
        let engine = engine();
        let project = describe(&engine, BuildingType::Industrial, "warehouse");
        let financing = engine.financial.financing_for(project.building_type, None, None);
        let report = engine
            .evaluate(&project, financing, &DealShieldControls::default())
            .expect("report");

        let profile = engine
            .cost
            .registry()
            .tile_profile_by_id(&report.dealshield_tile_profile)
            .expect("profile");
        let mut expected: Vec<String> =
            profile.scenario_ids().iter().map(|id| id.to_string()).collect();
        expected.sort();
        let keys: Vec<String> = report.dealshield_scenarios.scenarios.keys().cloned().collect();
        assert_eq!(keys, expected);
        assert_eq!(report.dealshield_scenarios.scenario_order[0], BASE_SCENARIO);
    }

    #[test]
    fn cost_anchor_rebases_the_base_scenario() {
        let engine = engine();
        let project = describe(&engine, BuildingType::Office, "class_a");
        let controls = DealShieldControls {
            cost_anchor: Some(20_000_000.0),
            ..DealShieldControls::default()
        };
        let report = engine.evaluate(&project, None, &controls).expect("report");
        let base = &report.dealshield_scenarios.scenarios[BASE_SCENARIO];
        let total = base.metric(metrics::TOTAL_COST_REF).expect("total cost");
        assert!((total - 20_000_000.0).abs() < 1e-3);
        assert!(report
            .dealshield_view
            .dealshield_disclosures
            .iter()
            .any(|line| line.contains("anchored")));
    }

    #[test]
    fn narrower_band_stresses_less() {
        let engine = engine();
        let project = describe(&engine, BuildingType::Multifamily, "market_rate_apartments");
        let total_in = |band: StressBand| {
            let report = engine
                .evaluate(
                    &project,
                    None,
                    &DealShieldControls {
                        stress_band: Some(band),
                        ..DealShieldControls::default()
                    },
                )
                .expect("report");
            report.dealshield_scenarios.scenarios["conservative"]
                .metric(metrics::TOTAL_COST_REF)
                .expect("total")
        };
        assert!(total_in(StressBand::Three) < total_in(StressBand::Ten));
    }
}
