//! Properties the cost engine must hold for every configured building type and subtype.

use std::sync::Arc;

use costline::estimation::domain::{ProjectClassification, SpaceType};
use costline::estimation::{
    BuildingType, CostEngine, EngineSettings, FallbackTier, PricingRegistry, ProjectRequest, Trade,
};

fn engine() -> CostEngine {
    let registry = Arc::new(PricingRegistry::standard().expect("standard registry validates"));
    CostEngine::new(registry, EngineSettings::default())
}

fn every_subtype(engine: &CostEngine) -> Vec<(BuildingType, &'static str)> {
    BuildingType::ordered()
        .into_iter()
        .flat_map(|building_type| {
            engine
                .registry()
                .subtypes(building_type)
                .iter()
                .map(move |config| (building_type, config.key))
        })
        .collect()
}

fn relative_gap(a: f64, b: f64) -> f64 {
    (a - b).abs() / a.abs().max(b.abs()).max(1.0)
}

#[test]
fn repeated_calculations_match_except_for_timestamp() {
    let engine = engine();
    let mut request = ProjectRequest::new(
        BuildingType::MixedUse,
        "office_residential",
        120_000.0,
        "Seattle, WA",
    );
    request.num_floors = 6;
    request.special_requirements = "luxury finishes".to_string();
    let project = engine.describe(&request).expect("describe");

    let first = engine.calculate_project(&project).expect("first");
    let second = engine.calculate_project(&project).expect("second");

    assert!(first.same_estimate(&second));
    assert_eq!(
        serde_json::to_value(&first.totals).expect("json"),
        serde_json::to_value(&second.totals).expect("json")
    );
}

#[test]
fn trade_subtotals_equal_their_line_items() {
    let engine = engine();
    for (building_type, subtype) in every_subtype(&engine) {
        for classification in [
            ProjectClassification::GroundUp,
            ProjectClassification::Addition,
            ProjectClassification::Renovation,
        ] {
            let mut request = ProjectRequest::new(building_type, subtype, 52_500.0, "Atlanta, GA");
            request.project_classification = classification;
            request.num_floors = 2;
            let project = engine.describe(&request).expect("describe");
            let payload = engine.calculate_project(&project).expect("payload");

            for result in &payload.trade_breakdowns {
                let items: f64 = result.line_items.iter().map(|item| item.total_cost).sum();
                assert!(
                    relative_gap(items, result.subtotal) < 1e-6,
                    "{building_type}/{subtype} {:?}: items {items} vs subtotal {}",
                    result.trade,
                    result.subtotal
                );
            }
            for scope in &payload.scope_items {
                let systems: f64 = scope.systems.iter().map(|system| system.item.total_cost).sum();
                assert!(
                    relative_gap(systems + scope.unallocated_amount, scope.subtotal) < 1e-6,
                    "{building_type}/{subtype} scope {:?} does not reconcile",
                    scope.trade
                );
            }
        }
    }
}

#[test]
fn scope_template_shares_sum_to_one() {
    let engine = engine();
    for profile in engine.registry().scope_profiles() {
        for scope in &profile.trades {
            let total: f64 = scope.items.iter().map(|item| item.share).sum();
            assert!(
                (total - 1.0).abs() < 1e-6,
                "{} {:?} shares sum to {total}",
                profile.id,
                scope.trade
            );
        }
    }
}

#[test]
fn unknown_subtype_falls_back_to_building_type_default() {
    let engine = engine();
    let request = ProjectRequest::new(
        BuildingType::Industrial,
        "cold_storage_mega",
        90_000.0,
        "Memphis, TN",
    );
    let project = engine.describe(&request).expect("describe");

    let payload = engine.calculate_project(&project).expect("payload");

    assert_eq!(payload.resolution.subtype_tier, FallbackTier::BuildingTypeDefault);
    assert_ne!(payload.construction_schedule.fallback_tier, FallbackTier::Exact);
    assert!(payload.construction_schedule.total_months > 0);
    assert!(payload.totals.total_project_cost > 0.0);
}

#[test]
fn degenerate_inputs_still_produce_well_formed_payloads() {
    let engine = engine();
    let mut request = ProjectRequest::new(BuildingType::Office, "class_b", 400.0, "Nowhere");
    request.building_mix.insert(SpaceType::Office, 0.0);
    let project = engine.describe(&request).expect("describe");

    let payload = engine.calculate_project(&project).expect("payload");

    assert!(payload.totals.total_project_cost.is_finite());
    assert!(payload.totals.cost_per_sqft > 0.0);
    assert_eq!(payload.regional.multiplier, 1.0);
}

#[test]
fn site_work_only_for_ground_up_site_heavy_types() {
    let engine = engine();
    let warehouse = engine
        .describe(&ProjectRequest::new(
            BuildingType::Industrial,
            "warehouse",
            100_000.0,
            "Dallas, TX",
        ))
        .expect("describe");
    let office = engine
        .describe(&ProjectRequest::new(BuildingType::Office, "class_a", 100_000.0, "Dallas, TX"))
        .expect("describe");

    let warehouse = engine.calculate_project(&warehouse).expect("payload");
    let office = engine.calculate_project(&office).expect("payload");

    assert!(warehouse.trade(Trade::Site).is_some());
    assert!(office.trade(Trade::Site).is_none());
}

#[test]
fn renovation_raises_contingency_and_lowers_structure() {
    let engine = engine();
    let ground_up = ProjectRequest::new(BuildingType::Office, "class_a", 60_000.0, "Chicago, IL");
    let mut renovation = ground_up.clone();
    renovation.project_classification = ProjectClassification::Renovation;

    let ground_up = engine
        .calculate_project(&engine.describe(&ground_up).expect("describe"))
        .expect("payload");
    let renovation = engine
        .calculate_project(&engine.describe(&renovation).expect("describe"))
        .expect("payload");

    assert!(renovation.totals.contingency_percentage > ground_up.totals.contingency_percentage);
    let structural = |payload: &costline::estimation::ProjectPayload| {
        payload.trade(Trade::Structural).map(|result| result.subtotal).unwrap_or_default()
    };
    assert!(structural(&renovation) < structural(&ground_up));
}
