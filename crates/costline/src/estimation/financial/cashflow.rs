//! Debt and discounted-cashflow arithmetic.

use serde::Serialize;

use crate::estimation::domain::FinancingAssumptions;

const IRR_TOLERANCE: f64 = 1e-9;
const IRR_MAX_ITERATIONS: usize = 100;

/// Level annual payment on a fully amortizing monthly loan.
pub fn annual_debt_service(principal: f64, financing: &FinancingAssumptions) -> f64 {
    if principal <= 0.0 {
        return 0.0;
    }
    let months = f64::from(financing.amortization_years.max(1)) * 12.0;
    let monthly_rate = financing.interest_rate / 12.0;
    if monthly_rate <= 0.0 {
        return principal / months * 12.0;
    }
    let payment = principal * monthly_rate / (1.0 - (1.0 + monthly_rate).powf(-months));
    payment * 12.0
}

/// Principal outstanding after `years` of scheduled payments.
pub fn remaining_balance(principal: f64, financing: &FinancingAssumptions, years: u32) -> f64 {
    if principal <= 0.0 || years >= financing.amortization_years {
        return 0.0;
    }
    let elapsed = f64::from(years) * 12.0;
    let monthly_rate = financing.interest_rate / 12.0;
    if monthly_rate <= 0.0 {
        let months = f64::from(financing.amortization_years) * 12.0;
        return (principal * (1.0 - elapsed / months)).max(0.0);
    }
    let payment = annual_debt_service(principal, financing) / 12.0;
    let growth = (1.0 + monthly_rate).powf(elapsed);
    (principal * growth - payment * (growth - 1.0) / monthly_rate).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearCashFlow {
    pub year: u32,
    pub net_operating_income: f64,
    pub debt_service: f64,
    pub cash_flow: f64,
    /// Sale proceeds net of loan payoff, only in the final year.
    pub reversion: f64,
}

/// Levered hold-period projection.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    pub loan_amount: f64,
    pub first_year_noi: f64,
    pub noi_growth: f64,
    pub debt_service: f64,
    pub horizon_years: u32,
    pub exit_cap_rate: f64,
}

impl Projection {
    pub fn years(&self, financing: Option<&FinancingAssumptions>) -> Vec<YearCashFlow> {
        let horizon = self.horizon_years.max(1);
        (1..=horizon)
            .map(|year| {
                let noi = self.noi_in_year(year);
                let reversion = if year == horizon {
                    let sale = if self.exit_cap_rate > 0.0 {
                        self.noi_in_year(year + 1) / self.exit_cap_rate
                    } else {
                        0.0
                    };
                    let payoff = financing
                        .map(|financing| remaining_balance(self.loan_amount, financing, year))
                        .unwrap_or(0.0);
                    sale - payoff
                } else {
                    0.0
                };
                YearCashFlow {
                    year,
                    net_operating_income: noi,
                    debt_service: self.debt_service,
                    cash_flow: noi - self.debt_service,
                    reversion,
                }
            })
            .collect()
    }

    fn noi_in_year(&self, year: u32) -> f64 {
        self.first_year_noi * (1.0 + self.noi_growth).powi(year.saturating_sub(1) as i32)
    }
}

/// Equity flows: the initial outlay at t=0 followed by each year's cash flow plus reversion.
pub fn equity_flows(equity: f64, years: &[YearCashFlow]) -> Vec<f64> {
    std::iter::once(-equity)
        .chain(years.iter().map(|year| year.cash_flow + year.reversion))
        .collect()
}

pub fn npv(rate: f64, flows: &[f64]) -> f64 {
    flows
        .iter()
        .enumerate()
        .map(|(period, flow)| flow / (1.0 + rate).powi(period as i32))
        .sum()
}

fn npv_derivative(rate: f64, flows: &[f64]) -> f64 {
    flows
        .iter()
        .enumerate()
        .skip(1)
        .map(|(period, flow)| -(period as f64) * flow / (1.0 + rate).powi(period as i32 + 1))
        .sum()
}

/// Internal rate of return by Newton-Raphson, falling back to bisection on [-0.99, 10].
///
/// `None` when the flows never change sign or no root is bracketed.
pub fn irr(flows: &[f64]) -> Option<f64> {
    let has_outflow = flows.iter().any(|flow| *flow < 0.0);
    let has_inflow = flows.iter().any(|flow| *flow > 0.0);
    if !has_outflow || !has_inflow {
        return None;
    }

    let mut rate = 0.1;
    for _ in 0..IRR_MAX_ITERATIONS {
        let value = npv(rate, flows);
        if value.abs() < IRR_TOLERANCE {
            return Some(rate);
        }
        let slope = npv_derivative(rate, flows);
        if slope == 0.0 || !slope.is_finite() {
            break;
        }
        let next = rate - value / slope;
        if !next.is_finite() || next <= -0.99 {
            break;
        }
        if (next - rate).abs() < IRR_TOLERANCE {
            return Some(next);
        }
        rate = next;
    }

    bisect(flows, -0.99, 10.0)
}

fn bisect(flows: &[f64], mut low: f64, mut high: f64) -> Option<f64> {
    let mut low_value = npv(low, flows);
    if low_value.signum() == npv(high, flows).signum() {
        return None;
    }
    for _ in 0..200 {
        let mid = (low + high) / 2.0;
        let mid_value = npv(mid, flows);
        if mid_value.abs() < IRR_TOLERANCE || (high - low) / 2.0 < IRR_TOLERANCE {
            return Some(mid);
        }
        if mid_value.signum() == low_value.signum() {
            low = mid;
            low_value = mid_value;
        } else {
            high = mid;
        }
    }
    Some((low + high) / 2.0)
}

/// Years of first-year cash flow needed to recover the equity.
pub fn payback_years(equity: f64, annual_cash_flow: f64) -> Option<f64> {
    if annual_cash_flow <= 0.0 {
        return None;
    }
    Some(equity.max(0.0) / annual_cash_flow)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan() -> FinancingAssumptions {
        FinancingAssumptions {
            loan_to_cost: 0.7,
            interest_rate: 0.06,
            amortization_years: 30,
        }
    }

    #[test]
    fn amortizing_payment_matches_mortgage_tables() {
        // $1M at 6% over 30 years is $5,995.51 per month.
        let annual = annual_debt_service(1_000_000.0, &loan());
        assert!((annual / 12.0 - 5_995.51).abs() < 0.01);
    }

    #[test]
    fn balance_declines_to_zero_at_maturity() {
        let financing = loan();
        let after_ten = remaining_balance(1_000_000.0, &financing, 10);
        assert!(after_ten < 1_000_000.0 && after_ten > 800_000.0);
        assert_eq!(remaining_balance(1_000_000.0, &financing, 30), 0.0);
    }

    #[test]
    fn very_long_terms_do_not_overflow_month_counts() {
        let financing = FinancingAssumptions {
            amortization_years: u32::MAX,
            ..loan()
        };
        let annual = annual_debt_service(1_000_000.0, &financing);
        assert!((annual - 60_000.0).abs() < 1.0);
        assert!(remaining_balance(1_000_000.0, &financing, 10) > 999_000.0);
    }

    #[test]
    fn irr_recovers_known_rate() {
        let flows = [-1_000.0, 100.0, 100.0, 1_100.0];
        let rate = irr(&flows).expect("irr");
        assert!((rate - 0.10).abs() < 1e-6);
        assert!(npv(rate, &flows).abs() < 1e-6);
    }

    #[test]
    fn irr_is_absent_without_sign_change() {
        assert_eq!(irr(&[-100.0, -10.0, -5.0]), None);
        assert_eq!(irr(&[100.0, 10.0]), None);
    }

    #[test]
    fn payback_requires_positive_cash_flow() {
        assert_eq!(payback_years(1_000.0, 250.0), Some(4.0));
        assert_eq!(payback_years(1_000.0, 0.0), None);
        assert_eq!(payback_years(1_000.0, -50.0), None);
    }

    #[test]
    fn final_year_carries_reversion_net_of_payoff() {
        let projection = Projection {
            loan_amount: 700_000.0,
            first_year_noi: 80_000.0,
            noi_growth: 0.0,
            debt_service: annual_debt_service(700_000.0, &loan()),
            horizon_years: 10,
            exit_cap_rate: 0.08,
        };
        let years = projection.years(Some(&loan()));
        assert_eq!(years.len(), 10);
        assert!(years[..9].iter().all(|year| year.reversion == 0.0));
        let payoff = remaining_balance(700_000.0, &loan(), 10);
        assert!((years[9].reversion - (1_000_000.0 - payoff)).abs() < 1e-6);
    }
}
