//! Decision view-model: status, first break, flex, break risk, ranked likely-wrong list
//! and disclosures, every field wrapped in [`Computed`].

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use super::computed::{Computed, Provenance};
use super::metrics::{ScenarioSnapshot, ANNUAL_REVENUE_REF, NOI_REF, ROI_REF, TOTAL_COST_REF};
use super::policy::{CollapseMetric, Comparator, DecisionInsurancePolicy, DSCR_METRIC_REF};
use super::profiles::{TileProfile, BASE_SCENARIO};
use super::StressBand;
use crate::estimation::financial::DSCR_NOT_MODELED;
use crate::estimation::pricing::FallbackTier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DecisionStatus {
    #[serde(rename = "GO")]
    Go,
    #[serde(rename = "Needs Work")]
    NeedsWork,
    #[serde(rename = "NO-GO")]
    NoGo,
    #[serde(rename = "PENDING")]
    Pending,
}

impl DecisionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Go => "GO",
            Self::NeedsWork => "Needs Work",
            Self::NoGo => "NO-GO",
            Self::Pending => "PENDING",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakCondition {
    pub scenario_id: String,
    pub metric_ref: String,
    pub observed_value: f64,
    pub threshold: f64,
    pub operator: Comparator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlexBand {
    Tight,
    Moderate,
    Comfortable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum BreakRisk {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImpactSeverity {
    High,
    Med,
    Low,
    Unknown,
}

impl ImpactSeverity {
    fn from_impact(impact_pct: Option<f64>) -> Self {
        match impact_pct {
            Some(impact) if impact >= 10.0 => Self::High,
            Some(impact) if impact >= 5.0 => Self::Med,
            Some(_) => Self::Low,
            None => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlVariable {
    pub tile_id: String,
    pub label: String,
    pub metric_ref: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedLikelyWrong {
    pub id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_tile_id: Option<String>,
    pub impact_pct: Computed<f64>,
    pub severity: ImpactSeverity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionTableRow {
    pub scenario_id: String,
    pub label: String,
    pub total_cost: Computed<f64>,
    pub annual_revenue: Computed<f64>,
    pub noi: Computed<f64>,
    pub dscr: Computed<f64>,
    pub roi: Computed<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealShieldView {
    pub decision_status: Computed<DecisionStatus>,
    pub decision_reason_code: Computed<String>,
    pub primary_control_variable: Computed<ControlVariable>,
    pub first_break_condition: Computed<BreakCondition>,
    pub flex_before_break_pct: Computed<f64>,
    pub flex_band: Computed<FlexBand>,
    pub break_risk: Computed<BreakRisk>,
    pub decision_table: Vec<DecisionTableRow>,
    pub ranked_likely_wrong: Vec<RankedLikelyWrong>,
    pub dealshield_disclosures: Vec<String>,
    /// Provenance of every field above, keyed by its path in this view.
    pub provenance: BTreeMap<String, Provenance>,
}

pub(crate) struct ViewInputs<'a> {
    pub profile: &'a TileProfile,
    pub profile_tier: FallbackTier,
    pub policy: &'a DecisionInsurancePolicy,
    pub scenarios: &'a BTreeMap<String, ScenarioSnapshot>,
    pub scenario_order: &'a [String],
    /// Reruns applying one tile at a time, keyed by tile id.
    pub single_tile: &'a BTreeMap<String, ScenarioSnapshot>,
    pub financing_modeled: bool,
    pub band: StressBand,
    pub cost_anchor: Option<f64>,
    pub revenue_anchor: Option<f64>,
}

const FINANCING_MISSING: &str = "financing_assumptions_missing";
const METRIC_UNAVAILABLE: &str = "collapse_metric_unavailable";

struct Break<'a> {
    position: usize,
    scenario_id: &'a str,
    observed: f64,
}

pub(crate) fn build(inputs: &ViewInputs<'_>) -> DealShieldView {
    let policy = inputs.policy;
    let trigger = &policy.collapse_trigger;
    let policy_source = |field: &str| format!("policy.{}.{field}", policy.profile_id);
    let trigger_source = policy_source("collapse_trigger");

    let base = inputs.scenarios.get(BASE_SCENARIO);
    let base_metric = base.and_then(|snapshot| snapshot.metric(trigger.metric_ref));
    let (missing_code, missing_reason) =
        if trigger.metric == CollapseMetric::Dscr && !inputs.financing_modeled {
            (FINANCING_MISSING, DSCR_NOT_MODELED.to_string())
        } else {
            (
                METRIC_UNAVAILABLE,
                format!("{} could not be derived for the base scenario", trigger.metric.label()),
            )
        };

    let first_break = trigger
        .scenario_priority
        .iter()
        .enumerate()
        .find_map(|(position, scenario_id)| {
            let observed = inputs.scenarios.get(*scenario_id)?.metric(trigger.metric_ref)?;
            trigger
                .operator
                .holds(observed, trigger.threshold)
                .then_some(Break {
                    position,
                    scenario_id: *scenario_id,
                    observed,
                })
        });

    let (status, reason_code) = match (&first_break, base_metric) {
        (_, None) => (DecisionStatus::Pending, missing_code),
        (None, Some(_)) => (DecisionStatus::Go, "no_break_in_priority_scenarios"),
        (Some(found), Some(_)) => match found.position {
            0 => (DecisionStatus::NoGo, "base_case_breaks"),
            1 => (DecisionStatus::NeedsWork, "conservative_case_breaks"),
            2 => (DecisionStatus::NeedsWork, "driver_case_breaks"),
            _ => (DecisionStatus::Go, "ugly_case_breaks_only"),
        },
    };
    let decision_scenario = first_break
        .as_ref()
        .map_or(BASE_SCENARIO, |found| found.scenario_id);
    let decision_sources = [
        trigger.metric_ref.to_string(),
        policy_source("collapse_trigger.scenario_priority"),
    ];
    let mut decision_status = Computed::computed(status, decision_sources.clone())
        .in_scenario(decision_scenario);
    if status == DecisionStatus::Pending {
        decision_status = decision_status.with_reason(missing_reason.clone());
    }
    let decision_reason_code = Computed::computed(reason_code.to_string(), decision_sources)
        .in_scenario(decision_scenario);

    let primary_control_variable = match inputs.profile.tile(policy.primary_control_variable) {
        Some(tile) => Computed::configured(
            ControlVariable {
                tile_id: tile.id.to_string(),
                label: tile.label.to_string(),
                metric_ref: tile.target.metric_ref(),
            },
            [policy_source("primary_control_variable")],
        ),
        None => Computed::unavailable(
            "primary control variable is not a tile in this profile",
            [policy_source("primary_control_variable")],
        ),
    };

    let first_break_condition = match &first_break {
        Some(found) => Computed::computed(
            BreakCondition {
                scenario_id: found.scenario_id.to_string(),
                metric_ref: trigger.metric_ref.to_string(),
                observed_value: found.observed,
                threshold: trigger.threshold,
                operator: trigger.operator,
            },
            [trigger.metric_ref.to_string(), trigger_source.clone()],
        )
        .in_scenario(found.scenario_id),
        None if base_metric.is_none() => {
            Computed::unavailable(missing_reason.clone(), [trigger.metric_ref.to_string()])
        }
        None => Computed::unavailable(
            "no scenario in the collapse-trigger priority list breaches the threshold",
            [trigger.metric_ref.to_string(), trigger_source.clone()],
        ),
    };

    let flex_pct = base_metric.and_then(|observed| {
        let denominator = match trigger.metric {
            CollapseMetric::Dscr => observed.abs(),
            CollapseMetric::Npv => base.and_then(|snapshot| snapshot.metric(TOTAL_COST_REF))?,
        };
        let headroom = trigger.operator.headroom(observed, trigger.threshold);
        if headroom <= 0.0 {
            Some(0.0)
        } else if denominator > 0.0 {
            Some(headroom / denominator * 100.0)
        } else {
            None
        }
    });
    let flex_sources = match trigger.metric {
        CollapseMetric::Dscr => vec![trigger.metric_ref.to_string(), trigger_source.clone()],
        CollapseMetric::Npv => vec![
            trigger.metric_ref.to_string(),
            TOTAL_COST_REF.to_string(),
            trigger_source.clone(),
        ],
    };
    let flex_before_break_pct = match flex_pct {
        Some(pct) => Computed::computed(pct, flex_sources).in_scenario(BASE_SCENARIO),
        None => Computed::unavailable(missing_reason.clone(), flex_sources),
    };

    let calibration = policy.flex_calibration;
    let flex_band = match flex_pct {
        Some(pct) => Computed::computed(
            if pct <= calibration.tight_max_pct {
                FlexBand::Tight
            } else if pct <= calibration.moderate_max_pct {
                FlexBand::Moderate
            } else {
                FlexBand::Comfortable
            },
            [policy_source("flex_calibration")],
        ),
        None => Computed::unavailable(missing_reason.clone(), [policy_source("flex_calibration")]),
    };

    let break_risk = match &first_break {
        Some(found) => {
            let by_scenario = match found.position {
                0 => BreakRisk::High,
                1 | 2 => BreakRisk::Medium,
                _ => BreakRisk::Low,
            };
            let by_flex = flex_pct.map(|pct| {
                if pct < calibration.tight_max_pct {
                    BreakRisk::High
                } else if pct <= calibration.moderate_max_pct {
                    BreakRisk::Medium
                } else {
                    BreakRisk::Low
                }
            });
            Computed::computed(
                by_flex.map_or(by_scenario, |level| level.max(by_scenario)),
                [trigger_source.clone(), policy_source("flex_calibration")],
            )
            .in_scenario(found.scenario_id)
        }
        None => Computed::unavailable("no break condition available", [trigger_source.clone()]),
    };

    let decision_table = decision_table(inputs);
    let ranked_likely_wrong = ranked_likely_wrong(inputs, base_metric, trigger.metric_ref);
    let dealshield_disclosures = disclosures(inputs);

    let mut provenance = BTreeMap::new();
    provenance.insert("decision_status".to_string(), decision_status.provenance.clone());
    provenance.insert(
        "decision_reason_code".to_string(),
        decision_reason_code.provenance.clone(),
    );
    provenance.insert(
        "primary_control_variable".to_string(),
        primary_control_variable.provenance.clone(),
    );
    provenance.insert(
        "first_break_condition".to_string(),
        first_break_condition.provenance.clone(),
    );
    provenance.insert(
        "flex_before_break_pct".to_string(),
        flex_before_break_pct.provenance.clone(),
    );
    provenance.insert("flex_band".to_string(), flex_band.provenance.clone());
    provenance.insert("break_risk".to_string(), break_risk.provenance.clone());
    for row in &decision_table {
        for (column, cell) in [
            ("total_cost", &row.total_cost),
            ("annual_revenue", &row.annual_revenue),
            ("noi", &row.noi),
            ("dscr", &row.dscr),
            ("roi", &row.roi),
        ] {
            provenance.insert(
                format!("decision_table.{}.{column}", row.scenario_id),
                cell.provenance.clone(),
            );
        }
    }
    for entry in &ranked_likely_wrong {
        provenance.insert(
            format!("ranked_likely_wrong.{}.impact_pct", entry.id),
            entry.impact_pct.provenance.clone(),
        );
    }

    DealShieldView {
        decision_status,
        decision_reason_code,
        primary_control_variable,
        first_break_condition,
        flex_before_break_pct,
        flex_band,
        break_risk,
        decision_table,
        ranked_likely_wrong,
        dealshield_disclosures,
        provenance,
    }
}

fn cell(inputs: &ViewInputs<'_>, snapshot: &ScenarioSnapshot, metric_ref: &str) -> Computed<f64> {
    let cell = match snapshot.metric(metric_ref) {
        Some(value) => Computed::computed(value, [metric_ref]),
        None if metric_ref == DSCR_METRIC_REF && !inputs.financing_modeled => {
            Computed::unavailable(DSCR_NOT_MODELED, [metric_ref])
        }
        None => Computed::unavailable("not derivable for this scenario", [metric_ref]),
    };
    cell.in_scenario(snapshot.scenario_id.as_str())
}

fn decision_table(inputs: &ViewInputs<'_>) -> Vec<DecisionTableRow> {
    inputs
        .scenario_order
        .iter()
        .filter_map(|scenario_id| inputs.scenarios.get(scenario_id))
        .map(|snapshot| DecisionTableRow {
            scenario_id: snapshot.scenario_id.clone(),
            label: snapshot.label.clone(),
            total_cost: cell(inputs, snapshot, TOTAL_COST_REF),
            annual_revenue: cell(inputs, snapshot, ANNUAL_REVENUE_REF),
            noi: cell(inputs, snapshot, NOI_REF),
            dscr: cell(inputs, snapshot, DSCR_METRIC_REF),
            roi: cell(inputs, snapshot, ROI_REF),
        })
        .collect()
}

fn ranked_likely_wrong(
    inputs: &ViewInputs<'_>,
    base_metric: Option<f64>,
    metric_ref: &str,
) -> Vec<RankedLikelyWrong> {
    let mut entries: Vec<RankedLikelyWrong> = inputs
        .profile
        .most_likely_wrong
        .iter()
        .map(|entry| {
            let impact_pct = match entry.driver_tile_id {
                None => Computed::unavailable(
                    "no driver tile measures this assumption",
                    [format!("profile.{}.most_likely_wrong", inputs.profile.id)],
                ),
                Some(tile_id) => {
                    let sources = [metric_ref.to_string(), format!("tile.{tile_id}")];
                    let stressed = inputs
                        .single_tile
                        .get(tile_id)
                        .and_then(|snapshot| snapshot.metric(metric_ref));
                    match (base_metric, stressed) {
                        (Some(base), Some(stressed)) if base != 0.0 => Computed::computed(
                            ((stressed - base) / base).abs() * 100.0,
                            sources,
                        )
                        .in_scenario(format!("tile:{tile_id}")),
                        (Some(_), Some(_)) => {
                            Computed::unavailable("base decision metric is zero", sources)
                        }
                        _ => Computed::unavailable("decision metric unavailable", sources),
                    }
                }
            };
            RankedLikelyWrong {
                id: entry.id.to_string(),
                text: entry.text.to_string(),
                driver_tile_id: entry.driver_tile_id.map(str::to_string),
                severity: ImpactSeverity::from_impact(impact_pct.value),
                impact_pct,
            }
        })
        .collect();

    entries.sort_by(|left, right| {
        let left = left.impact_pct.value.unwrap_or(f64::NEG_INFINITY);
        let right = right.impact_pct.value.unwrap_or(f64::NEG_INFINITY);
        right.partial_cmp(&left).unwrap_or(Ordering::Equal)
    });
    entries
}

fn disclosures(inputs: &ViewInputs<'_>) -> Vec<String> {
    let mut disclosures = vec![format!(
        "Stress tiles move their target metric by {}% of base; driver tiles scale the band.",
        inputs.band.pct()
    )];
    if !inputs.financing_modeled {
        disclosures.push(DSCR_NOT_MODELED.to_string());
    }
    if inputs.profile_tier != FallbackTier::Exact {
        disclosures.push(format!(
            "No subtype-specific tile profile; using building type default '{}'.",
            inputs.profile.id
        ));
    }
    if inputs.policy.collapse_trigger.metric == CollapseMetric::Npv {
        disclosures.push(
            "Collapse trigger uses NPV because this building type is rarely debt financed."
                .to_string(),
        );
    }
    if let Some(anchor) = inputs.cost_anchor {
        disclosures.push(format!(
            "Base total project cost anchored to ${anchor:.0} supplied by the caller."
        ));
    }
    if let Some(anchor) = inputs.revenue_anchor {
        disclosures.push(format!(
            "Base annual revenue anchored to ${anchor:.0} supplied by the caller."
        ));
    }
    disclosures.push(
        "Scenarios reprice the full cost and financial pipeline as sensitivities, not forecasts."
            .to_string(),
    );
    disclosures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::dealshield::policy::policy_for;
    use crate::estimation::dealshield::profiles::tile_profiles;
    use crate::estimation::pricing::building_types::profile_for;

    fn snapshot(scenario_id: &str, dscr: Option<f64>) -> ScenarioSnapshot {
        let mut metrics = BTreeMap::new();
        metrics.insert(TOTAL_COST_REF.to_string(), Some(10_000_000.0));
        metrics.insert(ANNUAL_REVENUE_REF.to_string(), Some(2_000_000.0));
        metrics.insert(NOI_REF.to_string(), Some(900_000.0));
        metrics.insert(ROI_REF.to_string(), Some(0.09));
        metrics.insert(DSCR_METRIC_REF.to_string(), dscr);
        ScenarioSnapshot {
            scenario_id: scenario_id.to_string(),
            label: scenario_id.to_string(),
            applied_tiles: Vec::new(),
            tile_factors: BTreeMap::new(),
            metrics,
        }
    }

    fn render(dscrs: [Option<f64>; 4], financing_modeled: bool) -> DealShieldView {
        let profile = tile_profiles()
            .into_iter()
            .find(|profile| profile.id == "office_default_v1")
            .expect("office profile");
        let policy = policy_for(&profile, &profile_for(profile.building_type));
        let order: Vec<String> = profile.scenario_ids().iter().map(|id| id.to_string()).collect();
        let scenarios: BTreeMap<String, ScenarioSnapshot> = order
            .iter()
            .zip(dscrs)
            .map(|(id, dscr)| (id.clone(), snapshot(id, dscr)))
            .collect();
        let single_tile = BTreeMap::new();
        build(&ViewInputs {
            profile: &profile,
            profile_tier: FallbackTier::Exact,
            policy: &policy,
            scenarios: &scenarios,
            scenario_order: &order,
            single_tile: &single_tile,
            financing_modeled,
            band: StressBand::Ten,
            cost_anchor: None,
            revenue_anchor: None,
        })
    }

    #[test]
    fn base_breach_is_no_go_with_high_risk() {
        let view = render([Some(1.1), Some(0.9), Some(1.0), Some(0.8)], true);
        assert_eq!(view.decision_status.value, Some(DecisionStatus::NoGo));
        assert_eq!(view.decision_reason_code.value.as_deref(), Some("base_case_breaks"));
        assert_eq!(view.break_risk.value, Some(BreakRisk::High));
        assert_eq!(view.flex_before_break_pct.value, Some(0.0));
    }

    #[test]
    fn conservative_breach_needs_work() {
        let view = render([Some(1.6), Some(1.2), Some(1.5), Some(1.0)], true);
        assert_eq!(view.decision_status.value, Some(DecisionStatus::NeedsWork));
        let found = view.first_break_condition.value.expect("break");
        assert_eq!(found.scenario_id, "conservative");
        assert_eq!(found.operator, Comparator::LessThan);
        // (1.6 - 1.25) / 1.6 = 21.9% of flex: scenario position decides.
        assert_eq!(view.break_risk.value, Some(BreakRisk::Medium));
        assert_eq!(view.flex_band.value, Some(FlexBand::Comfortable));
    }

    #[test]
    fn thin_flex_escalates_break_risk() {
        let view = render([Some(1.26), Some(1.3), Some(1.3), Some(1.2)], true);
        assert_eq!(view.decision_status.value, Some(DecisionStatus::Go));
        assert_eq!(view.decision_reason_code.value.as_deref(), Some("ugly_case_breaks_only"));
        assert_eq!(view.break_risk.value, Some(BreakRisk::High));
        assert_eq!(view.flex_band.value, Some(FlexBand::Tight));
    }

    #[test]
    fn no_break_leaves_risk_unclassified() {
        let view = render([Some(2.0), Some(1.8), Some(1.9), Some(1.6)], true);
        assert_eq!(view.decision_status.value, Some(DecisionStatus::Go));
        assert!(view.first_break_condition.value.is_none());
        assert!(view.break_risk.value.is_none());
        assert!(view.provenance.contains_key("break_risk"));
    }

    #[test]
    fn missing_financing_is_pending_with_disclosure() {
        let view = render([None, None, None, None], false);
        assert_eq!(view.decision_status.value, Some(DecisionStatus::Pending));
        assert_eq!(
            view.decision_reason_code.value.as_deref(),
            Some(FINANCING_MISSING)
        );
        let base_row = &view.decision_table[0];
        assert_eq!(base_row.dscr.value, None);
        assert_eq!(base_row.dscr.provenance.reason.as_deref(), Some(DSCR_NOT_MODELED));
        assert!(view
            .dealshield_disclosures
            .iter()
            .any(|line| line == DSCR_NOT_MODELED));
    }

    #[test]
    fn every_table_cell_has_provenance() {
        let view = render([Some(1.5), Some(1.4), Some(1.45), Some(1.3)], true);
        assert_eq!(view.decision_table.len(), 4);
        for row in &view.decision_table {
            assert!(view
                .provenance
                .contains_key(&format!("decision_table.{}.dscr", row.scenario_id)));
        }
    }
}
