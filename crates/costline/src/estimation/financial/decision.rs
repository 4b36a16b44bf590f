//! GO / NO-GO evaluation against the building type's investment thresholds.

use serde::Serialize;

use crate::estimation::pricing::InvestmentThresholds;

const ROI_WEIGHT: u8 = 30;
const NPV_WEIGHT: u8 = 25;
const PAYBACK_WEIGHT: u8 = 20;
const DSCR_WEIGHT: u8 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Recommendation {
    #[serde(rename = "GO")]
    Go,
    #[serde(rename = "NO-GO")]
    NoGo,
}

impl Recommendation {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Go => "GO",
            Self::NoGo => "NO-GO",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Green,
    Amber,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    AtLeast,
    AtMost,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub metric: &'static str,
    pub value: Option<f64>,
    pub threshold: f64,
    pub comparison: Comparison,
    /// `None` when the metric could not be computed and was not scored.
    pub passes: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Improvement {
    pub metric: &'static str,
    pub gap: f64,
    /// Dollar amount that would close the gap.
    pub amount: f64,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentDecision {
    pub recommendation: Recommendation,
    pub severity: Severity,
    pub feasibility_score: u8,
    pub metrics_table: Vec<MetricRow>,
    pub improvements: Vec<Improvement>,
}

/// Inputs the decision needs, all for the stabilized first year.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DecisionInputs {
    pub total_project_cost: f64,
    pub equity: f64,
    pub loan_to_cost: f64,
    pub net_operating_income: f64,
    pub annual_debt_service: f64,
    pub annual_cash_flow: f64,
    pub roi: f64,
    pub npv: f64,
    pub payback_years: Option<f64>,
    pub dscr: Option<f64>,
}

fn dollars(amount: f64) -> String {
    let whole = amount.abs().round() as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("${grouped}")
}

pub(crate) fn evaluate(
    inputs: &DecisionInputs,
    thresholds: &InvestmentThresholds,
) -> InvestmentDecision {
    let mut score: u8 = 100;
    let mut improvements = Vec::new();

    let roi_passes = inputs.roi >= thresholds.min_roi;
    if !roi_passes {
        score = score.saturating_sub(ROI_WEIGHT);
        let required_noi = thresholds.min_roi * inputs.total_project_cost;
        let amount = (required_noi - inputs.net_operating_income).max(0.0);
        improvements.push(Improvement {
            metric: "roi",
            gap: thresholds.min_roi - inputs.roi,
            amount,
            suggestion: format!(
                "Increase annual NOI by {} to reach a {:.1}% return on cost",
                dollars(amount),
                thresholds.min_roi * 100.0
            ),
        });
    }

    let npv_passes = inputs.npv >= thresholds.min_npv;
    if !npv_passes {
        score = score.saturating_sub(NPV_WEIGHT);
        let shortfall = thresholds.min_npv - inputs.npv;
        let equity_share = (1.0 - inputs.loan_to_cost).clamp(f64::EPSILON, 1.0);
        let amount = shortfall / equity_share;
        improvements.push(Improvement {
            metric: "npv",
            gap: shortfall,
            amount,
            suggestion: format!(
                "Reduce total project cost by {} to break even on a discounted basis",
                dollars(amount)
            ),
        });
    }

    let payback_passes = inputs
        .payback_years
        .is_some_and(|years| years <= thresholds.max_payback_years);
    if !payback_passes {
        score = score.saturating_sub(PAYBACK_WEIGHT);
        let required = inputs.equity / thresholds.max_payback_years.max(1.0);
        let amount = (required - inputs.annual_cash_flow).max(0.0);
        improvements.push(Improvement {
            metric: "payback_period",
            gap: inputs
                .payback_years
                .map_or(f64::INFINITY, |years| years - thresholds.max_payback_years),
            amount,
            suggestion: format!(
                "Increase annual cash flow by {} to recover equity within {:.0} years",
                dollars(amount),
                thresholds.max_payback_years
            ),
        });
    }

    let dscr_passes = inputs.dscr.map(|dscr| dscr >= thresholds.min_dscr);
    if dscr_passes == Some(false) {
        score = score.saturating_sub(DSCR_WEIGHT);
        let required_noi = thresholds.min_dscr * inputs.annual_debt_service;
        let amount = (required_noi - inputs.net_operating_income).max(0.0);
        improvements.push(Improvement {
            metric: "dscr",
            gap: thresholds.min_dscr - inputs.dscr.unwrap_or(0.0),
            amount,
            suggestion: format!(
                "Increase annual NOI by {} to cover debt service {:.2}x",
                dollars(amount),
                thresholds.min_dscr
            ),
        });
    }

    let metrics_table = vec![
        MetricRow {
            metric: "roi",
            value: Some(inputs.roi),
            threshold: thresholds.min_roi,
            comparison: Comparison::AtLeast,
            passes: Some(roi_passes),
        },
        MetricRow {
            metric: "npv",
            value: Some(inputs.npv),
            threshold: thresholds.min_npv,
            comparison: Comparison::AtLeast,
            passes: Some(npv_passes),
        },
        MetricRow {
            metric: "payback_period",
            value: inputs.payback_years,
            threshold: thresholds.max_payback_years,
            comparison: Comparison::AtMost,
            passes: Some(payback_passes),
        },
        MetricRow {
            metric: "dscr",
            value: inputs.dscr,
            threshold: thresholds.min_dscr,
            comparison: Comparison::AtLeast,
            passes: dscr_passes,
        },
    ];

    let (recommendation, severity) = if improvements.is_empty() {
        (Recommendation::Go, Severity::Green)
    } else if score < 50 {
        (Recommendation::NoGo, Severity::Red)
    } else {
        (Recommendation::NoGo, Severity::Amber)
    };

    InvestmentDecision {
        recommendation,
        severity,
        feasibility_score: score,
        metrics_table,
        improvements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> InvestmentThresholds {
        InvestmentThresholds {
            min_roi: 0.08,
            max_payback_years: 14.0,
            min_dscr: 1.25,
            min_npv: 0.0,
        }
    }

    fn healthy() -> DecisionInputs {
        DecisionInputs {
            total_project_cost: 10_000_000.0,
            equity: 3_500_000.0,
            loan_to_cost: 0.65,
            net_operating_income: 1_000_000.0,
            annual_debt_service: 500_000.0,
            annual_cash_flow: 500_000.0,
            roi: 0.10,
            npv: 1_000_000.0,
            payback_years: Some(7.0),
            dscr: Some(2.0),
        }
    }

    #[test]
    fn passing_every_metric_is_go() {
        let decision = evaluate(&healthy(), &thresholds());
        assert_eq!(decision.recommendation, Recommendation::Go);
        assert_eq!(decision.severity, Severity::Green);
        assert_eq!(decision.feasibility_score, 100);
        assert!(decision.improvements.is_empty());
    }

    #[test]
    fn failing_weights_are_subtracted() {
        let inputs = DecisionInputs {
            roi: 0.05,
            net_operating_income: 500_000.0,
            dscr: Some(1.0),
            ..healthy()
        };
        let decision = evaluate(&inputs, &thresholds());
        assert_eq!(decision.feasibility_score, 45);
        assert_eq!(decision.severity, Severity::Red);
        let roi = &decision.improvements[0];
        assert_eq!(roi.metric, "roi");
        assert!((roi.amount - 300_000.0).abs() < 1e-6);
        assert!(roi.suggestion.contains("$300,000"));
    }

    #[test]
    fn single_failure_is_amber() {
        let inputs = DecisionInputs {
            payback_years: Some(20.0),
            ..healthy()
        };
        let decision = evaluate(&inputs, &thresholds());
        assert_eq!(decision.recommendation, Recommendation::NoGo);
        assert_eq!(decision.severity, Severity::Amber);
        assert_eq!(decision.feasibility_score, 80);
    }

    #[test]
    fn missing_dscr_is_not_scored() {
        let inputs = DecisionInputs {
            dscr: None,
            ..healthy()
        };
        let decision = evaluate(&inputs, &thresholds());
        assert_eq!(decision.feasibility_score, 100);
        let dscr_row = decision
            .metrics_table
            .iter()
            .find(|row| row.metric == "dscr")
            .expect("dscr row");
        assert_eq!(dscr_row.value, None);
        assert_eq!(dscr_row.passes, None);
    }

    #[test]
    fn dollar_amounts_are_grouped() {
        assert_eq!(dollars(1_234_567.4), "$1,234,567");
        assert_eq!(dollars(999.0), "$999");
    }
}
