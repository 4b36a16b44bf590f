use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::estimation::domain::{BuildingType, ProjectRequest, SpaceType};
use crate::estimation::pricing::PricingRegistry;
use crate::estimation::repository::{
    EstimateId, EstimateRecord, EstimateRepository, RepositoryError,
};
use crate::estimation::{estimate_router, EngineSettings, EstimationService};

pub(super) fn registry() -> Arc<PricingRegistry> {
    Arc::new(PricingRegistry::standard().expect("standard registry validates"))
}

pub(super) fn office_request() -> ProjectRequest {
    let mut request = ProjectRequest::new(BuildingType::Office, "class_a", 45_000.0, "Denver, CO");
    request.num_floors = 3;
    request.building_mix = BTreeMap::from([(SpaceType::Office, 0.85)]);
    request
}

pub(super) fn surgical_center_request() -> ProjectRequest {
    ProjectRequest::new(
        BuildingType::Healthcare,
        "surgical_center",
        65_000.0,
        "Nashville, TN",
    )
}

pub(super) fn zero_area_request() -> ProjectRequest {
    ProjectRequest::new(BuildingType::Retail, "big_box", 0.0, "Phoenix, AZ")
}

pub(super) fn build_service() -> (EstimationService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = EstimationService::new(registry(), EngineSettings::default(), repository.clone());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<EstimateId, EstimateRecord>>>,
}

impl EstimateRepository for MemoryRepository {
    fn insert(&self, record: EstimateRecord) -> Result<EstimateRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.estimate_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.estimate_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &EstimateId) -> Result<Option<EstimateRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<EstimateRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<EstimateRecord> = guard.values().cloned().collect();
        records.sort_by(|a, b| b.estimate_id.cmp(&a.estimate_id));
        records.truncate(limit);
        Ok(records)
    }
}

pub(super) struct ConflictRepository;

impl EstimateRepository for ConflictRepository {
    fn insert(&self, _record: EstimateRecord) -> Result<EstimateRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, _id: &EstimateId) -> Result<Option<EstimateRecord>, RepositoryError> {
        Ok(None)
    }

    fn recent(&self, _limit: usize) -> Result<Vec<EstimateRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl EstimateRepository for UnavailableRepository {
    fn insert(&self, _record: EstimateRecord) -> Result<EstimateRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &EstimateId) -> Result<Option<EstimateRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn recent(&self, _limit: usize) -> Result<Vec<EstimateRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn assert_conflict_response(response: Response) {
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = read_body(response).await;
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn estimate_router_with_service(
    service: EstimationService<MemoryRepository>,
) -> axum::Router {
    estimate_router(Arc::new(service))
}
