use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use super::dealshield::{DealShieldControls, DealShieldEngine, DealShieldError, DealShieldReport};
use super::domain::{FinancingAssumptions, ProjectDescription, ProjectRequest};
use super::engine::{CostEngine, ProjectPayload, ScenarioAdjustments};
use super::export::{self, ExportError};
use super::financial::{FinancialAnalysis, FinancialAnalyzer};
use super::pricing::{PricingRegistry, RegistryError};
use super::repository::{
    EstimateId, EstimateRecord, EstimateRepository, EstimateSummaryView, RepositoryError,
};
use super::EngineSettings;

/// Default page size for recent-estimate listings.
pub const RECENT_LIMIT: usize = 50;

/// Largest gross area accepted on a request.
pub const MAX_SQUARE_FOOTAGE: f64 = 10_000_000.0;

/// Accepted loan amortization terms in years.
pub const AMORTIZATION_YEARS: std::ops::RangeInclusive<u32> = 1..=50;

/// Service composing the cost engine, financial analyzer, DealShield and the repository.
pub struct EstimationService<R> {
    cost: CostEngine,
    financial: FinancialAnalyzer,
    dealshield: DealShieldEngine,
    repository: Arc<R>,
}

static ESTIMATE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_estimate_id() -> EstimateId {
    let id = ESTIMATE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EstimateId(format!("est-{id:06}"))
}

/// Unpersisted result of running the full pipeline once.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateReport {
    pub payload: ProjectPayload,
    pub financial: FinancialAnalysis,
    pub dealshield: DealShieldReport,
}

impl<R> EstimationService<R>
where
    R: EstimateRepository + 'static,
{
    pub fn new(
        registry: Arc<PricingRegistry>,
        settings: EngineSettings,
        repository: Arc<R>,
    ) -> Self {
        let cost = CostEngine::new(Arc::clone(&registry), settings);
        let financial = FinancialAnalyzer::new(registry, settings);
        let dealshield = DealShieldEngine::new(cost.clone(), financial.clone());
        Self {
            cost,
            financial,
            dealshield,
            repository,
        }
    }

    pub fn cost_engine(&self) -> &CostEngine {
        &self.cost
    }

    /// Price, underwrite and stress-test a request without persisting it.
    pub fn estimate(
        &self,
        request: &ProjectRequest,
    ) -> Result<EstimateReport, EstimateServiceError> {
        self.run(request, &DealShieldControls::default())
    }

    /// Run the full pipeline and store the result under a fresh estimate id.
    pub fn submit(&self, request: ProjectRequest) -> Result<EstimateRecord, EstimateServiceError> {
        let report = self.estimate(&request)?;
        let record = EstimateRecord {
            estimate_id: next_estimate_id(),
            request,
            payload: report.payload,
            financial: report.financial,
            dealshield: report.dealshield,
            created_at: Utc::now(),
        };

        let stored = self.repository.insert(record)?;
        info!(
            estimate_id = stored.estimate_id.as_str(),
            total_project_cost = stored.payload.totals.total_project_cost,
            "estimate stored"
        );
        Ok(stored)
    }

    pub fn get(&self, estimate_id: &EstimateId) -> Result<EstimateRecord, EstimateServiceError> {
        let record = self
            .repository
            .fetch(estimate_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn recent(&self, limit: usize) -> Result<Vec<EstimateSummaryView>, EstimateServiceError> {
        let records = self.repository.recent(limit.min(RECENT_LIMIT))?;
        Ok(records.iter().map(EstimateRecord::summary_view).collect())
    }

    /// Recompute DealShield for an ad-hoc request with caller controls.
    pub fn dealshield(
        &self,
        request: &ProjectRequest,
        controls: &DealShieldControls,
    ) -> Result<DealShieldReport, EstimateServiceError> {
        validate_controls(controls)?;
        let project = self.describe(request)?;
        let financing = self.financing(request, &project);
        Ok(self.dealshield.evaluate(&project, financing, controls)?)
    }

    /// Same pipeline as [`Self::estimate`] with explicit DealShield controls.
    pub fn run(
        &self,
        request: &ProjectRequest,
        controls: &DealShieldControls,
    ) -> Result<EstimateReport, EstimateServiceError> {
        validate_controls(controls)?;
        let project = self.describe(request)?;
        let financing = self.financing(request, &project);
        let payload = self.cost.calculate_project(&project)?;
        let financial = self.financial.analyze_investment(
            &payload,
            financing,
            &ScenarioAdjustments::default(),
        )?;
        let dealshield = self.dealshield.evaluate(&project, financing, controls)?;
        Ok(EstimateReport {
            payload,
            financial,
            dealshield,
        })
    }

    /// Stored estimate rendered as CSV line items.
    pub fn export_csv(&self, estimate_id: &EstimateId) -> Result<String, EstimateServiceError> {
        let record = self.get(estimate_id)?;
        Ok(export::to_csv(&record.payload)?)
    }

    fn describe(
        &self,
        request: &ProjectRequest,
    ) -> Result<ProjectDescription, EstimateServiceError> {
        validate(request)?;
        Ok(self.cost.describe(request)?)
    }

    fn financing(
        &self,
        request: &ProjectRequest,
        project: &ProjectDescription,
    ) -> Option<FinancingAssumptions> {
        self.financial
            .financing_for(project.building_type, request.financing, request.include_financing)
    }
}

fn validate(request: &ProjectRequest) -> Result<(), EstimateServiceError> {
    if !request.square_footage.is_finite() || request.square_footage <= 0.0 {
        return Err(EstimateServiceError::InvalidRequest(
            "square_footage must be a positive number".to_string(),
        ));
    }
    if request.square_footage > MAX_SQUARE_FOOTAGE {
        return Err(EstimateServiceError::InvalidRequest(format!(
            "square_footage must not exceed {MAX_SQUARE_FOOTAGE}"
        )));
    }
    if request.num_floors == 0 {
        return Err(EstimateServiceError::InvalidRequest(
            "num_floors must be at least 1".to_string(),
        ));
    }
    if request.location.trim().is_empty() {
        return Err(EstimateServiceError::InvalidRequest(
            "location is required".to_string(),
        ));
    }
    if let Some((space, fraction)) = request
        .building_mix
        .iter()
        .find(|(_, fraction)| !fraction.is_finite() || !(0.0..=1.0).contains(*fraction))
    {
        return Err(EstimateServiceError::InvalidRequest(format!(
            "building_mix.{} must be a fraction between 0 and 1 (found {fraction})",
            space.key()
        )));
    }
    if let Some((key, _)) = request
        .extras
        .iter()
        .find(|(_, value)| !value.is_finite() || **value < 0.0)
    {
        return Err(EstimateServiceError::InvalidRequest(format!(
            "extras.{key} must be a non-negative number"
        )));
    }
    if let Some(terms) = request.financing {
        if !(0.0..=1.0).contains(&terms.loan_to_cost) || !terms.interest_rate.is_finite() {
            return Err(EstimateServiceError::InvalidRequest(
                "financing.loan_to_cost must be a fraction and interest_rate finite".to_string(),
            ));
        }
        if !AMORTIZATION_YEARS.contains(&terms.amortization_years) {
            return Err(EstimateServiceError::InvalidRequest(format!(
                "financing.amortization_years must be between {} and {}",
                AMORTIZATION_YEARS.start(),
                AMORTIZATION_YEARS.end()
            )));
        }
    }
    Ok(())
}

fn validate_controls(controls: &DealShieldControls) -> Result<(), EstimateServiceError> {
    let anchors = [
        ("cost_anchor", controls.cost_anchor),
        ("revenue_anchor", controls.revenue_anchor),
    ];
    for (name, anchor) in anchors {
        if anchor.is_some_and(|value| !value.is_finite()) {
            return Err(EstimateServiceError::InvalidRequest(format!(
                "controls.{name} must be a finite amount"
            )));
        }
    }
    Ok(())
}

/// Error raised by the estimation service.
#[derive(Debug, thiserror::Error)]
pub enum EstimateServiceError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    DealShield(#[from] DealShieldError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
