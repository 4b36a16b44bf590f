use super::common::*;
use crate::estimation::dealshield::{DealShieldControls, StressBand, BASE_SCENARIO};
use crate::estimation::domain::{FinancingAssumptions, SpaceType};
use crate::estimation::repository::{EstimateId, EstimateRepository, RepositoryError};
use crate::estimation::{EngineSettings, EstimateServiceError, EstimationService};
use std::sync::Arc;

#[test]
fn submit_persists_record_with_sequenced_id() {
    let (service, repository) = build_service();

    let record = service.submit(office_request()).expect("estimate stored");

    assert!(record.estimate_id.as_str().starts_with("est-"));
    assert_eq!(record.estimate_id.as_str().len(), "est-000000".len());
    let stored = repository
        .fetch(&record.estimate_id)
        .expect("fetch succeeds")
        .expect("record present");
    assert!(stored.payload.same_estimate(&record.payload));
    assert_eq!(stored.request, office_request());
}

#[test]
fn submit_rejects_non_positive_square_footage() {
    let (service, repository) = build_service();

    match service.submit(zero_area_request()) {
        Err(EstimateServiceError::InvalidRequest(message)) => {
            assert!(message.contains("square_footage"));
        }
        other => panic!("expected invalid request, got {other:?}"),
    }
    assert!(repository.records.lock().expect("mutex").is_empty());
}

#[test]
fn submit_rejects_zero_floors_and_out_of_range_mix() {
    let (service, _) = build_service();

    let mut request = office_request();
    request.num_floors = 0;
    assert!(matches!(
        service.submit(request),
        Err(EstimateServiceError::InvalidRequest(_))
    ));

    let mut request = office_request();
    request.building_mix.insert(SpaceType::Retail, 1.4);
    match service.estimate(&request) {
        Err(EstimateServiceError::InvalidRequest(message)) => {
            assert!(message.contains("building_mix.retail"));
        }
        other => panic!("expected invalid mix, got {other:?}"),
    }
}

#[test]
fn estimate_rejects_amortization_terms_outside_range() {
    let (service, _) = build_service();

    for years in [0, 51, 400_000_000] {
        let mut request = surgical_center_request();
        request.financing = Some(FinancingAssumptions {
            loan_to_cost: 0.6,
            interest_rate: 0.07,
            amortization_years: years,
        });
        match service.estimate(&request) {
            Err(EstimateServiceError::InvalidRequest(message)) => {
                assert!(message.contains("financing.amortization_years"));
            }
            other => panic!("expected invalid amortization for {years}, got {other:?}"),
        }
    }
}

#[test]
fn estimate_rejects_square_footage_beyond_the_ceiling() {
    let (service, repository) = build_service();

    let mut request = surgical_center_request();
    request.square_footage = 1e306;
    match service.submit(request) {
        Err(EstimateServiceError::InvalidRequest(message)) => {
            assert!(message.contains("square_footage"));
        }
        other => panic!("expected invalid area, got {other:?}"),
    }
    assert!(repository.records.lock().expect("mutex").is_empty());
}

#[test]
fn dealshield_rejects_non_finite_anchors() {
    let (service, _) = build_service();

    let controls = DealShieldControls {
        revenue_anchor: Some(f64::INFINITY),
        ..DealShieldControls::default()
    };
    match service.dealshield(&surgical_center_request(), &controls) {
        Err(EstimateServiceError::InvalidRequest(message)) => {
            assert!(message.contains("controls.revenue_anchor"));
        }
        other => panic!("expected invalid anchor, got {other:?}"),
    }

    let controls = DealShieldControls {
        cost_anchor: Some(f64::NAN),
        ..DealShieldControls::default()
    };
    assert!(matches!(
        service.run(&office_request(), &controls),
        Err(EstimateServiceError::InvalidRequest(_))
    ));
}

#[test]
fn submit_propagates_repository_conflicts() {
    let service = EstimationService::new(
        registry(),
        EngineSettings::default(),
        Arc::new(ConflictRepository),
    );

    match service.submit(office_request()) {
        Err(EstimateServiceError::Repository(RepositoryError::Conflict)) => {}
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[test]
fn get_reports_missing_estimates_as_not_found() {
    let (service, _) = build_service();

    match service.get(&EstimateId("est-999999".to_string())) {
        Err(EstimateServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn recent_returns_summaries_newest_first() {
    let (service, _) = build_service();
    let first = service.submit(office_request()).expect("first");
    let second = service.submit(surgical_center_request()).expect("second");

    let summaries = service.recent(10).expect("summaries");

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].estimate_id, second.estimate_id);
    assert_eq!(summaries[1].estimate_id, first.estimate_id);
    assert_eq!(summaries[0].subtype, "surgical_center");
    assert!(summaries[0].total_project_cost > 0.0);
}

#[test]
fn estimate_does_not_persist() {
    let (service, repository) = build_service();

    let report = service.estimate(&office_request()).expect("report");

    assert!(report.payload.totals.total_project_cost > 0.0);
    assert!(repository.records.lock().expect("mutex").is_empty());
}

#[test]
fn dealshield_honors_caller_stress_band() {
    let (service, _) = build_service();
    let controls = DealShieldControls {
        stress_band: Some(StressBand::Three),
        ..DealShieldControls::default()
    };

    let report = service
        .dealshield(&surgical_center_request(), &controls)
        .expect("dealshield report");

    assert_eq!(report.dealshield_scenarios.stress_band_pct, 3);
    assert!(report
        .dealshield_scenarios
        .scenarios
        .contains_key(BASE_SCENARIO));
}

#[test]
fn include_financing_false_strips_debt_metrics() {
    let (service, _) = build_service();
    let mut request = surgical_center_request();
    request.include_financing = Some(false);

    let report = service.estimate(&request).expect("report");

    let debt = &report.financial.ownership_analysis.debt_metrics;
    assert!(debt.financing.is_none());
    assert!(debt.calculated_dscr.is_none());
    assert!(debt.dscr_unavailable_reason.is_some());
}

#[test]
fn export_csv_renders_stored_estimate() {
    let (service, _) = build_service();
    let record = service.submit(office_request()).expect("record");

    let csv = service.export_csv(&record.estimate_id).expect("csv");

    assert!(csv.starts_with("section,trade,item"));
    assert!(csv.contains("Total Project Cost"));
}

#[test]
fn repository_outages_surface_as_errors() {
    let service = EstimationService::new(
        registry(),
        EngineSettings::default(),
        Arc::new(UnavailableRepository),
    );

    assert!(matches!(
        service.recent(5),
        Err(EstimateServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
}
