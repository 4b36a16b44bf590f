//! Construction cost estimation: pricing registry, trade calculators, scope expansion,
//! the unified cost engine, financial underwriting and DealShield stress testing.
//!
//! Every engine in this module is a pure function of its inputs plus the read-only
//! [`PricingRegistry`], so one registry can be shared across concurrent requests.

pub mod dealshield;
pub mod domain;
pub mod engine;
pub mod export;
pub mod financial;
pub mod pricing;
pub mod regional;
pub mod repository;
pub mod router;
pub mod scope;
pub mod service;
pub mod trades;

#[cfg(test)]
mod tests;

pub use dealshield::{
    Computed, DealShieldControls, DealShieldEngine, DealShieldError, DealShieldReport,
    DecisionStatus, Provenance, StressBand,
};
pub use domain::{
    BuildingType, FinancingAssumptions, LineItem, ProjectClassification, ProjectDescription,
    ProjectRequest, QualityLevel, SpaceType, Trade, TradeResult, Unit,
};
pub use engine::{CostEngine, ProjectPayload, ScenarioAdjustments};
pub use financial::{FinancialAnalysis, FinancialAnalyzer, Recommendation};
pub use pricing::{FallbackTier, PricingRegistry, RegistryError, Resolved};
pub use regional::{RegionalAdjustment, RegionalResolver};
pub use repository::{EstimateRecord, EstimateRepository, EstimateSummaryView, RepositoryError};
pub use router::estimate_router;
pub use service::{EstimateReport, EstimateServiceError, EstimationService};

/// Runtime knobs injected into the engines from [`crate::config::EstimatorConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// Replaces the contingency table when present (fraction).
    pub contingency_override: Option<f64>,
    pub default_stress_band: StressBand,
    pub include_financing: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            contingency_override: None,
            default_stress_band: StressBand::Ten,
            include_financing: true,
        }
    }
}
