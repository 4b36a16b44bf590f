use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{
    LineItem, ProjectClassification, ProjectDescription, ProjectRequest, QualityLevel, Trade,
    TradeResult, Unit,
};
use super::pricing::{normalize_key, FallbackTier, PricingRegistry, RegistryError, ScheduleTemplate};
use super::regional::RegionalAdjustment;
use super::scope::{self, ScopeSystem};
use super::trades::{self, per_square_foot};
use super::EngineSettings;

/// Multiplicative stresses applied when re-pricing a DealShield scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioAdjustments {
    pub cost_factor: f64,
    pub trade_factors: BTreeMap<Trade, f64>,
    pub revenue_factor: f64,
    /// Replaces the modeled base revenue before `revenue_factor` applies.
    pub revenue_anchor: Option<f64>,
    pub opex_factor: f64,
}

impl Default for ScenarioAdjustments {
    fn default() -> Self {
        Self {
            cost_factor: 1.0,
            trade_factors: BTreeMap::new(),
            revenue_factor: 1.0,
            revenue_anchor: None,
            opex_factor: 1.0,
        }
    }
}

impl ScenarioAdjustments {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    pub fn trade_factor(&self, trade: Trade) -> f64 {
        self.cost_factor * self.trade_factors.get(&trade).copied().unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectTotals {
    pub subtotal: f64,
    /// Fraction of the subtotal.
    pub contingency_percentage: f64,
    pub contingency_amount: f64,
    pub total_project_cost: f64,
    pub cost_per_sqft: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledPhase {
    pub name: String,
    pub start_month: u32,
    pub duration_months: u32,
    pub end_month: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstructionSchedule {
    pub total_months: u32,
    pub phases: Vec<ScheduledPhase>,
    pub fallback_tier: FallbackTier,
}

impl ConstructionSchedule {
    fn from_template(template: &ScheduleTemplate, fallback_tier: FallbackTier) -> Self {
        let total = template.total_months;
        let phases = template
            .phases
            .iter()
            .map(|phase| {
                let start_month = phase.start_month.min(total.saturating_sub(1));
                let end_month = (start_month + phase.duration_months).min(total);
                ScheduledPhase {
                    name: phase.name.to_string(),
                    start_month,
                    duration_months: end_month - start_month,
                    end_month,
                }
            })
            .collect();
        Self {
            total_months: total,
            phases,
            fallback_tier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeTrade {
    pub trade: Trade,
    pub subtotal: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    /// False when no scope profile covers the trade and it is carried as one line.
    pub expanded: bool,
    pub systems: Vec<ScopeSystem>,
    pub unallocated_amount: f64,
}

/// Which configuration each lookup resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigResolution {
    pub subtype: String,
    pub subtype_tier: FallbackTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_profile_tier: Option<FallbackTier>,
    pub schedule_tier: FallbackTier,
}

/// Full cost estimate for one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectPayload {
    pub project: ProjectDescription,
    pub regional: RegionalAdjustment,
    pub resolution: ConfigResolution,
    pub trade_breakdowns: Vec<TradeResult>,
    pub scope_items: Vec<ScopeTrade>,
    pub totals: ProjectTotals,
    pub construction_schedule: ConstructionSchedule,
    pub calculation_date: DateTime<Utc>,
}

impl ProjectPayload {
    pub fn trade(&self, trade: Trade) -> Option<&TradeResult> {
        self.trade_breakdowns
            .iter()
            .find(|result| result.trade == trade)
    }

    /// Equality over everything except `calculation_date`.
    pub fn same_estimate(&self, other: &Self) -> bool {
        Self {
            calculation_date: other.calculation_date,
            ..self.clone()
        } == *other
    }
}

/// Orchestrates the trade calculators, scope expansion, contingency and schedule.
#[derive(Debug, Clone)]
pub struct CostEngine {
    registry: Arc<PricingRegistry>,
    settings: EngineSettings,
}

impl CostEngine {
    pub fn new(registry: Arc<PricingRegistry>, settings: EngineSettings) -> Self {
        Self { registry, settings }
    }

    pub fn registry(&self) -> &Arc<PricingRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Apply subtype defaults (mix, quality) to an inbound request.
    pub fn describe(&self, request: &ProjectRequest) -> Result<ProjectDescription, RegistryError> {
        let subtype = self
            .registry
            .subtype(request.building_type, &request.subtype)?;
        if subtype.is_fallback() {
            warn!(
                building_type = request.building_type.key(),
                requested = %request.subtype,
                resolved = subtype.value.key,
                "unknown subtype, using building type default"
            );
        }

        let quality = request
            .quality
            .or_else(|| QualityLevel::detect(&request.special_requirements))
            .unwrap_or(subtype.value.quality);

        let building_mix = if request.building_mix.is_empty() {
            subtype.value.default_mix.iter().copied().collect()
        } else {
            request.building_mix.clone()
        };

        Ok(ProjectDescription {
            building_type: request.building_type,
            subtype: normalize_key(&request.subtype),
            square_footage: request.square_footage,
            location: request.location.clone(),
            classification: request.project_classification,
            building_mix,
            special_requirements: request.special_requirements.clone(),
            num_floors: request.num_floors.max(1),
            quality,
            extras: request.extras.clone(),
        })
    }

    /// Contingency as a fraction of the construction subtotal.
    pub fn contingency_rate(&self, project: &ProjectDescription) -> f64 {
        if let Some(rate) = self.settings.contingency_override {
            return rate;
        }
        let base = match project.classification {
            ProjectClassification::GroundUp => 0.10,
            ProjectClassification::Addition => 0.12,
            ProjectClassification::Renovation => 0.15,
        };
        base + self
            .registry
            .building_type(project.building_type)
            .contingency_premium
    }

    pub fn calculate_project(
        &self,
        project: &ProjectDescription,
    ) -> Result<ProjectPayload, RegistryError> {
        self.calculate_with(project, &ScenarioAdjustments::default())
    }

    pub fn calculate_with(
        &self,
        project: &ProjectDescription,
        adjustments: &ScenarioAdjustments,
    ) -> Result<ProjectPayload, RegistryError> {
        let registry = self.registry.as_ref();
        let log_fallbacks = adjustments.is_identity();

        let subtype = registry.subtype(project.building_type, &project.subtype)?;
        let scope_profile = registry.scope_profile(project.building_type, &project.subtype)?;
        let schedule = registry.schedule(project.building_type, &project.subtype);
        if log_fallbacks {
            if let Some(profile) = scope_profile.filter(|profile| profile.is_fallback()) {
                warn!(
                    subtype = %project.subtype,
                    profile = profile.value.id,
                    tier = profile.tier.label(),
                    "scope profile resolved by fallback"
                );
            }
            if schedule.is_fallback() {
                warn!(
                    building_type = project.building_type.key(),
                    subtype = %project.subtype,
                    tier = schedule.tier.label(),
                    "construction schedule resolved by fallback"
                );
            }
        }

        let trade_breakdowns: Vec<TradeResult> = trades::trades_for(project)
            .into_iter()
            .map(|trade| {
                trades::calculator_for(trade)
                    .calculate(project, registry)
                    .stressed(adjustments.trade_factor(trade))
            })
            .collect();

        let scope_items = trade_breakdowns
            .iter()
            .map(|result| {
                let templates = scope_profile
                    .as_ref()
                    .and_then(|profile| profile.value.items_for(result.trade));
                match (scope_profile.as_ref(), templates) {
                    (Some(profile), Some(templates)) => {
                        let systems = scope::expand(
                            result.subtotal,
                            templates,
                            project,
                            result.trade.label(),
                        );
                        let allocated: f64 =
                            systems.iter().map(|system| system.item.total_cost).sum();
                        ScopeTrade {
                            trade: result.trade,
                            subtotal: result.subtotal,
                            profile_id: Some(profile.value.id.to_string()),
                            expanded: true,
                            systems,
                            unallocated_amount: result.subtotal - allocated,
                        }
                    }
                    _ => {
                        if log_fallbacks {
                            warn!(
                                trade = result.trade.key(),
                                subtype = %project.subtype,
                                "no scope profile for trade, emitting un-expanded subtotal"
                            );
                        }
                        unexpanded(result)
                    }
                }
            })
            .collect();

        let subtotal: f64 = trade_breakdowns.iter().map(|result| result.subtotal).sum();
        let contingency_percentage = self.contingency_rate(project);
        let contingency_amount = subtotal * contingency_percentage;
        let total_project_cost = subtotal + contingency_amount;
        let totals = ProjectTotals {
            subtotal,
            contingency_percentage,
            contingency_amount,
            total_project_cost,
            cost_per_sqft: per_square_foot(total_project_cost, project.square_footage),
        };

        if log_fallbacks {
            info!(
                building_type = project.building_type.key(),
                subtype = subtype.value.key,
                square_footage = project.square_footage,
                total_project_cost,
                cost_per_sqft = totals.cost_per_sqft,
                "estimate calculated"
            );
        } else {
            debug!(
                building_type = project.building_type.key(),
                total_project_cost,
                cost_factor = adjustments.cost_factor,
                "scenario re-priced"
            );
        }

        Ok(ProjectPayload {
            project: project.clone(),
            regional: registry.regional().resolve(&project.location),
            resolution: ConfigResolution {
                subtype: subtype.value.key.to_string(),
                subtype_tier: subtype.tier,
                scope_profile: scope_profile.map(|profile| profile.value.id.to_string()),
                scope_profile_tier: scope_profile.map(|profile| profile.tier),
                schedule_tier: schedule.tier,
            },
            trade_breakdowns,
            scope_items,
            totals,
            construction_schedule: ConstructionSchedule::from_template(
                schedule.value,
                schedule.tier,
            ),
            calculation_date: Utc::now(),
        })
    }
}

fn unexpanded(result: &TradeResult) -> ScopeTrade {
    ScopeTrade {
        trade: result.trade,
        subtotal: result.subtotal,
        profile_id: None,
        expanded: false,
        systems: vec![ScopeSystem {
            key: result.trade.key().to_string(),
            share: 1.0,
            item: LineItem::new(
                format!("{} (un-itemized)", result.trade.label()),
                1.0,
                Unit::LumpSum,
                result.subtotal,
                result.trade.label(),
            ),
        }],
        unallocated_amount: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::domain::{BuildingType, SpaceType};

    fn engine() -> CostEngine {
        CostEngine::new(
            Arc::new(PricingRegistry::standard().expect("registry")),
            EngineSettings::default(),
        )
    }

    fn request(building_type: BuildingType, subtype: &str, square_footage: f64) -> ProjectRequest {
        ProjectRequest::new(building_type, subtype, square_footage, "Nashville, TN")
    }

    #[test]
    fn totals_are_subtotal_plus_contingency() {
        let engine = engine();
        let description = engine
            .describe(&request(BuildingType::Office, "class_a", 50_000.0))
            .expect("describe");
        let payload = engine.calculate_project(&description).expect("payload");

        let trade_sum: f64 = payload.trade_breakdowns.iter().map(|trade| trade.subtotal).sum();
        assert!((payload.totals.subtotal - trade_sum).abs() < 1e-6);
        assert_eq!(payload.totals.contingency_percentage, 0.10);
        assert_eq!(
            payload.totals.total_project_cost,
            payload.totals.subtotal + payload.totals.contingency_amount
        );
    }

    #[test]
    fn describe_applies_subtype_defaults_and_keyword_quality() {
        let engine = engine();
        let mut inbound = request(BuildingType::Multifamily, "Market Rate Apartments", 80_000.0);
        inbound.special_requirements = "luxury amenity deck".to_string();
        let description = engine.describe(&inbound).expect("describe");
        assert_eq!(description.subtype, "market_rate_apartments");
        assert_eq!(description.quality, QualityLevel::Premium);
        assert_eq!(
            description.building_mix.get(&SpaceType::ResidentialUnit),
            Some(&0.82)
        );
    }

    #[test]
    fn renovation_and_healthcare_raise_contingency() {
        let engine = engine();
        let mut inbound = request(BuildingType::Healthcare, "medical_office", 30_000.0);
        inbound.project_classification = ProjectClassification::Renovation;
        let description = engine.describe(&inbound).expect("describe");
        assert!((engine.contingency_rate(&description) - 0.17).abs() < 1e-12);
    }

    #[test]
    fn contingency_override_replaces_table() {
        let engine = CostEngine::new(
            Arc::new(PricingRegistry::standard().expect("registry")),
            EngineSettings {
                contingency_override: Some(0.05),
                ..EngineSettings::default()
            },
        );
        let description = engine
            .describe(&request(BuildingType::Healthcare, "hospital", 100_000.0))
            .expect("describe");
        assert_eq!(engine.contingency_rate(&description), 0.05);
    }

    #[test]
    fn schedule_phases_are_clamped_to_total_duration() {
        let engine = engine();
        let description = engine
            .describe(&request(BuildingType::Healthcare, "medical_office", 40_000.0))
            .expect("describe");
        let payload = engine.calculate_project(&description).expect("payload");
        let schedule = &payload.construction_schedule;
        assert_eq!(schedule.total_months, 20);
        assert!(schedule.phases.iter().all(|phase| phase.end_month <= 20));
        let closeout = schedule.phases.last().expect("closeout");
        assert_eq!(closeout.duration_months, 1);
    }

    #[test]
    fn retail_trades_are_emitted_unexpanded() {
        let engine = engine();
        let description = engine
            .describe(&request(BuildingType::Retail, "shopping_center", 25_000.0))
            .expect("describe");
        let payload = engine.calculate_project(&description).expect("payload");
        assert_eq!(payload.scope_items.len(), 6);
        for scope in &payload.scope_items {
            assert!(!scope.expanded);
            assert_eq!(scope.systems.len(), 1);
            assert_eq!(scope.systems[0].item.total_cost, scope.subtotal);
        }
    }

    #[test]
    fn cost_factor_scales_every_trade() {
        let engine = engine();
        let description = engine
            .describe(&request(BuildingType::Industrial, "warehouse", 100_000.0))
            .expect("describe");
        let base = engine.calculate_project(&description).expect("base");
        let stressed = engine
            .calculate_with(
                &description,
                &ScenarioAdjustments {
                    cost_factor: 1.1,
                    ..ScenarioAdjustments::default()
                },
            )
            .expect("stressed");
        let ratio = stressed.totals.total_project_cost / base.totals.total_project_cost;
        assert!((ratio - 1.1).abs() < 1e-9);
    }
}
