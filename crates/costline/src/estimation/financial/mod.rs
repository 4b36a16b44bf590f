//! Ownership economics for a priced project: revenue, NOI, debt, returns and the
//! GO / NO-GO recommendation.

mod cashflow;
mod decision;
mod revenue;

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::domain::{BuildingType, FinancingAssumptions, ProjectDescription};
use super::engine::{ProjectPayload, ScenarioAdjustments};
use super::pricing::{PricingRegistry, RegistryError};
use super::EngineSettings;

pub use cashflow::{annual_debt_service, irr, npv, payback_years, remaining_balance, YearCashFlow};
pub use decision::{
    Comparison, Improvement, InvestmentDecision, MetricRow, Recommendation, Severity,
};
pub use revenue::RevenueAnalysis;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnMetrics {
    pub annual_cash_flow: f64,
    pub roi: f64,
    pub cash_on_cash_return: f64,
    /// First-year cash flow over total project cost.
    pub simplified_irr: f64,
    /// Levered equity IRR over the hold period, when the flows admit one.
    pub irr: Option<f64>,
    pub npv: f64,
    pub discount_rate: f64,
    pub payback_period: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebtMetrics {
    pub financing: Option<FinancingAssumptions>,
    pub loan_amount: f64,
    pub equity_investment: f64,
    pub annual_debt_service: f64,
    pub calculated_dscr: Option<f64>,
    pub target_dscr: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dscr_unavailable_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnershipAnalysis {
    pub total_project_cost: f64,
    pub return_metrics: ReturnMetrics,
    pub debt_metrics: DebtMetrics,
    pub investment_analysis: InvestmentDecision,
    pub hold_period_years: u32,
    pub cash_flows: Vec<YearCashFlow>,
}

/// What it would take to hit the return-on-cost target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueRequirements {
    pub target_roi: f64,
    pub required_noi: f64,
    pub required_annual_revenue: f64,
    pub current_annual_revenue: f64,
    pub revenue_gap: f64,
    pub required_revenue_per_sqft: f64,
    /// Occupancy at which revenue covers operating expenses and debt service.
    pub break_even_occupancy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialAnalysis {
    pub building_type: BuildingType,
    pub subtype: String,
    pub ownership_analysis: OwnershipAnalysis,
    pub revenue_analysis: RevenueAnalysis,
    pub revenue_requirements: RevenueRequirements,
}

pub const DSCR_NOT_MODELED: &str = "Not modeled: financing assumptions missing";

#[derive(Debug, Clone)]
pub struct FinancialAnalyzer {
    registry: Arc<PricingRegistry>,
    settings: EngineSettings,
}

impl FinancialAnalyzer {
    pub fn new(registry: Arc<PricingRegistry>, settings: EngineSettings) -> Self {
        Self { registry, settings }
    }

    /// Financing to model: the caller's terms, else the building type default, or none at all
    /// when financing is switched off.
    pub fn financing_for(
        &self,
        building_type: BuildingType,
        requested: Option<FinancingAssumptions>,
        include: Option<bool>,
    ) -> Option<FinancingAssumptions> {
        if !include.unwrap_or(self.settings.include_financing) {
            return None;
        }
        Some(requested.unwrap_or(self.registry.building_type(building_type).financing))
    }

    pub fn analyze_investment(
        &self,
        payload: &ProjectPayload,
        financing: Option<FinancingAssumptions>,
        adjustments: &ScenarioAdjustments,
    ) -> Result<FinancialAnalysis, RegistryError> {
        let project: &ProjectDescription = &payload.project;
        let profile = self.registry.building_type(project.building_type);
        let subtype = self
            .registry
            .subtype(project.building_type, &project.subtype)?
            .value;
        let market = &subtype.market;
        let total_project_cost = payload.totals.total_project_cost;

        let modeled = revenue::model(project, market);
        let base_annual_revenue = adjustments.revenue_anchor.unwrap_or(modeled.annual_revenue);
        let annual_revenue = base_annual_revenue * adjustments.revenue_factor;
        let operating_expenses = base_annual_revenue * market.opex_ratio * adjustments.opex_factor;
        let noi = annual_revenue - operating_expenses;

        let loan_amount = financing
            .map(|terms| total_project_cost * terms.loan_to_cost.clamp(0.0, 1.0))
            .unwrap_or(0.0);
        let equity = total_project_cost - loan_amount;
        let debt_service = financing
            .map(|terms| annual_debt_service(loan_amount, &terms))
            .unwrap_or(0.0);
        let dscr = match financing {
            Some(_) if debt_service > 0.0 => Some(noi / debt_service),
            _ => None,
        };
        let annual_cash_flow = noi - debt_service;

        let projection = cashflow::Projection {
            loan_amount,
            first_year_noi: noi,
            noi_growth: profile.noi_growth,
            debt_service,
            horizon_years: profile.horizon_years,
            exit_cap_rate: profile.exit_cap_rate,
        };
        let cash_flows = projection.years(financing.as_ref());
        let flows = cashflow::equity_flows(equity, &cash_flows);
        let net_present_value = npv(profile.discount_rate, &flows);
        let payback_period = payback_years(equity, annual_cash_flow);
        let roi = ratio(noi, total_project_cost);

        let investment_analysis = decision::evaluate(
            &decision::DecisionInputs {
                total_project_cost,
                equity,
                loan_to_cost: financing.map_or(0.0, |terms| terms.loan_to_cost),
                net_operating_income: noi,
                annual_debt_service: debt_service,
                annual_cash_flow,
                roi,
                npv: net_present_value,
                payback_years: payback_period,
                dscr,
            },
            &profile.thresholds,
        );

        debug!(
            building_type = project.building_type.key(),
            noi,
            roi,
            npv = net_present_value,
            recommendation = investment_analysis.recommendation.label(),
            "investment analyzed"
        );

        let required_noi = profile.thresholds.min_roi * total_project_cost;
        let required_annual_revenue = required_noi + operating_expenses;
        let full_occupancy_revenue = if modeled.occupancy > 0.0 {
            annual_revenue / modeled.occupancy
        } else {
            0.0
        };

        Ok(FinancialAnalysis {
            building_type: project.building_type,
            subtype: subtype.key.to_string(),
            ownership_analysis: OwnershipAnalysis {
                total_project_cost,
                return_metrics: ReturnMetrics {
                    annual_cash_flow,
                    roi,
                    cash_on_cash_return: ratio(annual_cash_flow, equity),
                    simplified_irr: ratio(annual_cash_flow, total_project_cost),
                    irr: irr(&flows),
                    npv: net_present_value,
                    discount_rate: profile.discount_rate,
                    payback_period,
                },
                debt_metrics: DebtMetrics {
                    financing,
                    loan_amount,
                    equity_investment: equity,
                    annual_debt_service: debt_service,
                    calculated_dscr: dscr,
                    target_dscr: profile.thresholds.min_dscr,
                    dscr_unavailable_reason: dscr
                        .is_none()
                        .then(|| DSCR_NOT_MODELED.to_string()),
                },
                investment_analysis,
                hold_period_years: profile.horizon_years,
                cash_flows,
            },
            revenue_analysis: RevenueAnalysis {
                revenue_driver: modeled.driver.to_string(),
                unit_count: modeled.unit_count,
                revenue_per_unit: modeled.revenue_per_unit,
                occupancy_rate: modeled.occupancy,
                base_annual_revenue,
                annual_revenue,
                operating_expense_ratio: market.opex_ratio,
                operating_expenses,
                net_operating_income: noi,
                noi_margin: ratio(noi, annual_revenue),
                revenue_per_sqft: ratio(annual_revenue, project.square_footage),
            },
            revenue_requirements: RevenueRequirements {
                target_roi: profile.thresholds.min_roi,
                required_noi,
                required_annual_revenue,
                current_annual_revenue: annual_revenue,
                revenue_gap: required_annual_revenue - annual_revenue,
                required_revenue_per_sqft: ratio(required_annual_revenue, project.square_footage),
                break_even_occupancy: (full_occupancy_revenue > 0.0)
                    .then(|| (operating_expenses + debt_service) / full_occupancy_revenue),
            },
        })
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::domain::ProjectRequest;
    use crate::estimation::engine::CostEngine;

    fn setup() -> (CostEngine, FinancialAnalyzer) {
        let registry = Arc::new(PricingRegistry::standard().expect("registry"));
        let settings = EngineSettings::default();
        (
            CostEngine::new(Arc::clone(&registry), settings),
            FinancialAnalyzer::new(registry, settings),
        )
    }

    fn priced(engine: &CostEngine, request: ProjectRequest) -> ProjectPayload {
        let description = engine.describe(&request).expect("describe");
        engine.calculate_project(&description).expect("payload")
    }

    #[test]
    fn noi_is_revenue_less_operating_expenses() {
        let (engine, analyzer) = setup();
        let payload = priced(
            &engine,
            ProjectRequest::new(
                BuildingType::Multifamily,
                "market_rate_apartments",
                120_000.0,
                "Austin, TX",
            ),
        );
        let financing = analyzer.financing_for(BuildingType::Multifamily, None, None);
        let analysis = analyzer
            .analyze_investment(&payload, financing, &ScenarioAdjustments::default())
            .expect("analysis");
        let revenue = &analysis.revenue_analysis;
        let expected_noi = revenue.annual_revenue - revenue.operating_expenses;
        assert!((revenue.net_operating_income - expected_noi).abs() < 1e-6);
        let debt = &analysis.ownership_analysis.debt_metrics;
        assert!(debt.calculated_dscr.is_some_and(|dscr| dscr.is_finite() && dscr > 0.0));
        assert!(debt.dscr_unavailable_reason.is_none());
    }

    #[test]
    fn dscr_is_absent_without_financing() {
        let (engine, analyzer) = setup();
        let payload = priced(
            &engine,
            ProjectRequest::new(BuildingType::Office, "class_a", 80_000.0, "Denver, CO"),
        );
        let financing = analyzer.financing_for(BuildingType::Office, None, Some(false));
        assert_eq!(financing, None);
        let analysis = analyzer
            .analyze_investment(&payload, financing, &ScenarioAdjustments::default())
            .expect("analysis");
        let debt = &analysis.ownership_analysis.debt_metrics;
        assert_eq!(debt.calculated_dscr, None);
        assert_eq!(debt.dscr_unavailable_reason.as_deref(), Some(DSCR_NOT_MODELED));
        assert_eq!(debt.equity_investment, payload.totals.total_project_cost);
    }

    #[test]
    fn revenue_anchor_and_factor_apply_in_order() {
        let (engine, analyzer) = setup();
        let payload = priced(
            &engine,
            ProjectRequest::new(BuildingType::Office, "class_b", 40_000.0, "Tulsa, OK"),
        );
        let adjustments = ScenarioAdjustments {
            revenue_anchor: Some(1_000_000.0),
            revenue_factor: 0.9,
            ..ScenarioAdjustments::default()
        };
        let analysis = analyzer
            .analyze_investment(&payload, None, &adjustments)
            .expect("analysis");
        assert_eq!(analysis.revenue_analysis.base_annual_revenue, 1_000_000.0);
        assert!((analysis.revenue_analysis.annual_revenue - 900_000.0).abs() < 1e-6);
    }

    #[test]
    fn simplified_irr_is_cash_flow_over_cost() {
        let (engine, analyzer) = setup();
        let payload = priced(
            &engine,
            ProjectRequest::new(BuildingType::Industrial, "warehouse", 150_000.0, "Dallas, TX"),
        );
        let analysis = analyzer
            .analyze_investment(&payload, None, &ScenarioAdjustments::default())
            .expect("analysis");
        let returns = &analysis.ownership_analysis.return_metrics;
        let expected = returns.annual_cash_flow / payload.totals.total_project_cost;
        assert!((returns.simplified_irr - expected).abs() < 1e-12);
        assert_eq!(
            analysis.ownership_analysis.cash_flows.len() as u32,
            analysis.ownership_analysis.hold_period_years
        );
    }
}
