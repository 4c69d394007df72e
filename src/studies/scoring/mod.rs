//! Pure scoring engine over a study's financial inputs.
//!
//! `compute` is deterministic and performs no I/O; resolution timestamps and
//! status transitions belong to the service layer.

pub(crate) mod formulas;

use super::domain::{FinancialInputs, ScoreFlag, ScoreResult};
use crate::parameters::IncomeStatementPeriod;
use formulas::NormalizedFinancials;

/// Compute the full score set for one study.
///
/// Running this twice over identical inputs yields identical results; the
/// engine carries no clock and no hidden state.
pub fn compute(inputs: &FinancialInputs, period: IncomeStatementPeriod) -> ScoreResult {
    let n = NormalizedFinancials::from_inputs(inputs);
    let mut flags = n.flags.clone();

    let z = formulas::discriminant(&n);
    let stability_factor = formulas::stability_factor(z);

    let ebitda = n.ordinary_activity_revenue
        - n.cost_of_sales
        - n.administrative_expenses
        - n.selling_expenses
        - n.depreciation_amortization;
    let adjusted_ebitda = ebitda * stability_factor;
    let current_debt_service = n.short_term_financial_liabilities + n.financial_expenses;
    let annual_payment_capacity = adjusted_ebitda - current_debt_service;
    let monthly_payment_capacity =
        formulas::round_i64(annual_payment_capacity / f64::from(period.months()));

    // The cycle base is deliberately not defaulted: a zero base makes the
    // supplier cycle undefined and the result carries the sentinel 0 plus a
    // flag instead of a non-finite number.
    let cycle_base = n.cost_of_sales + n.inventories_2 - n.inventories_1;
    let average_payment_time = if cycle_base == 0.0 {
        flags.push(ScoreFlag::UndefinedPaymentCycle);
        0
    } else {
        formulas::annualized_days((n.suppliers_1 + n.suppliers_2) / 2.0, cycle_base)
    };

    let accounts_receivable_turnover = formulas::annualized_days(
        (n.accounts_receivable_1 + n.accounts_receivable_2) / 2.0,
        n.revenue_divisor,
    );
    let inventory_turnover = formulas::annualized_days(
        (n.inventories_1 + n.inventories_2) / 2.0,
        n.cost_of_sales_divisor,
    );
    let suppliers_turnover = -average_payment_time;
    let maximum_payment_time = accounts_receivable_turnover + inventory_turnover + suppliers_turnover;

    ScoreResult {
        ebitda,
        adjusted_ebitda,
        stability_factor,
        current_debt_service,
        annual_payment_capacity,
        monthly_payment_capacity,
        average_payment_time,
        accounts_receivable_turnover,
        inventory_turnover,
        suppliers_turnover,
        maximum_payment_time,
        flags,
    }
}
