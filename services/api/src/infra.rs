use costline::estimation::repository::EstimateId;
use costline::estimation::{EstimateRecord, EstimateRepository, RepositoryError};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct EstimateStore {
    records: HashMap<EstimateId, EstimateRecord>,
    /// Insertion order, oldest first.
    order: Vec<EstimateId>,
}

/// Process-local estimate storage; contents are lost on restart.
#[derive(Default, Clone)]
pub(crate) struct InMemoryEstimateRepository {
    store: Arc<Mutex<EstimateStore>>,
}

impl InMemoryEstimateRepository {
    fn lock(&self) -> Result<MutexGuard<'_, EstimateStore>, RepositoryError> {
        self.store
            .lock()
            .map_err(|_| RepositoryError::Unavailable("estimate store mutex poisoned".to_string()))
    }
}

impl EstimateRepository for InMemoryEstimateRepository {
    fn insert(&self, record: EstimateRecord) -> Result<EstimateRecord, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.records.contains_key(&record.estimate_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.order.push(record.estimate_id.clone());
        guard
            .records
            .insert(record.estimate_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &EstimateId) -> Result<Option<EstimateRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard.records.get(id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<EstimateRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard
            .order
            .iter()
            .rev()
            .take(limit)
            .filter_map(|id| guard.records.get(id).cloned())
            .collect())
    }
}
