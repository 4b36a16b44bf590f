use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::dealshield::DealShieldReport;
use super::domain::{BuildingType, ProjectRequest};
use super::engine::ProjectPayload;
use super::financial::FinancialAnalysis;

/// Identifier assigned to persisted estimates, e.g. `est-000042`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EstimateId(pub String);

impl EstimateId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Everything produced for one estimate request.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateRecord {
    pub estimate_id: EstimateId,
    pub request: ProjectRequest,
    pub payload: ProjectPayload,
    pub financial: FinancialAnalysis,
    pub dealshield: DealShieldReport,
    pub created_at: DateTime<Utc>,
}

impl EstimateRecord {
    pub fn summary_view(&self) -> EstimateSummaryView {
        let project = &self.payload.project;
        EstimateSummaryView {
            estimate_id: self.estimate_id.clone(),
            building_type: project.building_type,
            subtype: self.payload.resolution.subtype.clone(),
            square_footage: project.square_footage,
            location: project.location.clone(),
            total_project_cost: self.payload.totals.total_project_cost,
            cost_per_sqft: self.payload.totals.cost_per_sqft,
            recommendation: self
                .financial
                .ownership_analysis
                .investment_analysis
                .recommendation
                .label(),
            decision_status: self
                .dealshield
                .decision_status()
                .map_or("unavailable", |status| status.label()),
            created_at: self.created_at,
        }
    }
}

/// Headline numbers only, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateSummaryView {
    pub estimate_id: EstimateId,
    pub building_type: BuildingType,
    pub subtype: String,
    pub square_footage: f64,
    pub location: String,
    pub total_project_cost: f64,
    pub cost_per_sqft: f64,
    pub recommendation: &'static str,
    pub decision_status: &'static str,
    pub created_at: DateTime<Utc>,
}

/// Storage abstraction so the service can be exercised without a database.
pub trait EstimateRepository: Send + Sync {
    fn insert(&self, record: EstimateRecord) -> Result<EstimateRecord, RepositoryError>;
    fn fetch(&self, id: &EstimateId) -> Result<Option<EstimateRecord>, RepositoryError>;
    /// Most recent first.
    fn recent(&self, limit: usize) -> Result<Vec<EstimateRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("estimate already exists")]
    Conflict,
    #[error("estimate not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
