//! Scenario snapshots and dotted metric-reference resolution.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Map, Value};

use super::policy::{DSCR_METRIC_REF, NPV_METRIC_REF};
use crate::estimation::engine::ProjectPayload;
use crate::estimation::financial::FinancialAnalysis;

pub const TOTAL_COST_REF: &str = "totals.total_project_cost";
pub const ANNUAL_REVENUE_REF: &str = "revenue_analysis.annual_revenue";
pub const OPERATING_EXPENSES_REF: &str = "revenue_analysis.operating_expenses";
pub const NOI_REF: &str = "revenue_analysis.net_operating_income";
pub const ROI_REF: &str = "ownership_analysis.return_metrics.roi";

/// Metrics every scenario reports regardless of its tiles.
pub const HEADLINE_REFS: [&str; 7] = [
    TOTAL_COST_REF,
    ANNUAL_REVENUE_REF,
    OPERATING_EXPENSES_REF,
    NOI_REF,
    DSCR_METRIC_REF,
    ROI_REF,
    NPV_METRIC_REF,
];

/// Nested document the dotted metric refs are resolved against.
pub(crate) fn snapshot_document(payload: &ProjectPayload, analysis: &FinancialAnalysis) -> Value {
    let trades: Map<String, Value> = payload
        .trade_breakdowns
        .iter()
        .map(|result| {
            (
                result.trade.key().to_string(),
                json!({
                    "subtotal": result.subtotal,
                    "cost_per_sqft": result.cost_per_sqft,
                }),
            )
        })
        .collect();

    json!({
        "totals": payload.totals,
        "trades": trades,
        "revenue_analysis": analysis.revenue_analysis,
        "ownership_analysis": {
            "return_metrics": analysis.ownership_analysis.return_metrics,
            "debt_metrics": analysis.ownership_analysis.debt_metrics,
        },
    })
}

/// Resolve `a.b.c` to a finite number; `None` for missing paths, nulls and non-numbers.
pub fn resolve(document: &Value, metric_ref: &str) -> Option<f64> {
    let pointer = format!("/{}", metric_ref.replace('.', "/"));
    document
        .pointer(&pointer)
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite())
}

/// One scenario's resolved metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSnapshot {
    pub scenario_id: String,
    pub label: String,
    pub applied_tiles: Vec<String>,
    /// Scalar applied per tile, keyed by tile id.
    pub tile_factors: BTreeMap<String, f64>,
    /// Resolved value per metric ref; `None` when the pipeline could not derive it.
    pub metrics: BTreeMap<String, Option<f64>>,
}

impl ScenarioSnapshot {
    pub fn metric(&self, metric_ref: &str) -> Option<f64> {
        self.metrics.get(metric_ref).copied().flatten()
    }
}
