use super::super::domain::{FinancialInputs, ScoreFlag};

// Discriminant coefficients (Altman-style, private-company calibration kept
// from the scoring model in production).
const COEFF_X1: f64 = 1.2;
const COEFF_X2: f64 = 1.4;
const COEFF_X3: f64 = 3.3;
const COEFF_X4: f64 = 0.6;
const COEFF_X5: f64 = 1.0;

const HIGH_RISK_UPPER_BOUND: f64 = 1.8;
const MEDIUM_RISK_UPPER_BOUND: f64 = 3.0;

pub(crate) const HIGH_RISK_FACTOR: f64 = 0.33;
pub(crate) const MEDIUM_RISK_FACTOR: f64 = 0.66;
pub(crate) const LOW_RISK_FACTOR: f64 = 1.0;

const DAYS_PER_YEAR: f64 = 365.0;

/// Financial inputs with the absent-means-zero policy applied exactly once.
///
/// Divisor totals get a separate treatment: a zero or absent total divides
/// as 1 and records a flag, keeping every downstream formula total.
pub(crate) struct NormalizedFinancials {
    pub total_current_assets: f64,
    pub total_current_liabilities: f64,
    pub retained_earnings: f64,
    pub gross_profit: f64,
    pub administrative_expenses: f64,
    pub selling_expenses: f64,
    pub equity: f64,
    pub ordinary_activity_revenue: f64,
    pub cost_of_sales: f64,
    pub depreciation_amortization: f64,
    pub short_term_financial_liabilities: f64,
    pub financial_expenses: f64,
    pub suppliers_1: f64,
    pub suppliers_2: f64,
    pub inventories_1: f64,
    pub inventories_2: f64,
    pub accounts_receivable_1: f64,
    pub accounts_receivable_2: f64,

    pub total_assets_divisor: f64,
    pub total_liabilities_divisor: f64,
    pub revenue_divisor: f64,
    pub cost_of_sales_divisor: f64,
    pub flags: Vec<ScoreFlag>,
}

impl NormalizedFinancials {
    pub fn from_inputs(inputs: &FinancialInputs) -> Self {
        let mut flags = Vec::new();

        let total_assets = inputs.total_assets.unwrap_or(0.0);
        let total_assets_divisor =
            divisor_or_one(total_assets, ScoreFlag::DefaultedTotalAssets, &mut flags);

        let total_liabilities = inputs.total_liabilities.unwrap_or(0.0);
        let total_liabilities_divisor = divisor_or_one(
            total_liabilities,
            ScoreFlag::DefaultedTotalLiabilities,
            &mut flags,
        );

        let ordinary_activity_revenue = inputs.ordinary_activity_revenue.unwrap_or(0.0);
        let revenue_divisor = divisor_or_one(
            ordinary_activity_revenue,
            ScoreFlag::DefaultedRevenue,
            &mut flags,
        );

        let cost_of_sales = inputs.cost_of_sales.unwrap_or(0.0);
        let cost_of_sales_divisor =
            divisor_or_one(cost_of_sales, ScoreFlag::DefaultedCostOfSales, &mut flags);

        Self {
            total_current_assets: inputs.total_current_assets.unwrap_or(0.0),
            total_current_liabilities: inputs.total_current_liabilities.unwrap_or(0.0),
            retained_earnings: inputs.retained_earnings.unwrap_or(0.0),
            gross_profit: inputs.gross_profit.unwrap_or(0.0),
            administrative_expenses: inputs.administrative_expenses.unwrap_or(0.0),
            selling_expenses: inputs.selling_expenses.unwrap_or(0.0),
            equity: inputs.equity.unwrap_or(0.0),
            ordinary_activity_revenue,
            cost_of_sales,
            depreciation_amortization: inputs.depreciation_amortization.unwrap_or(0.0),
            short_term_financial_liabilities: inputs
                .short_term_financial_liabilities
                .unwrap_or(0.0),
            financial_expenses: inputs.financial_expenses.unwrap_or(0.0),
            suppliers_1: inputs.suppliers_1.unwrap_or(0.0),
            suppliers_2: inputs.suppliers_2.unwrap_or(0.0),
            inventories_1: inputs.inventories_1.unwrap_or(0.0),
            inventories_2: inputs.inventories_2.unwrap_or(0.0),
            accounts_receivable_1: inputs.accounts_receivable_1.unwrap_or(0.0),
            accounts_receivable_2: inputs.accounts_receivable_2.unwrap_or(0.0),
            total_assets_divisor,
            total_liabilities_divisor,
            revenue_divisor,
            cost_of_sales_divisor,
            flags,
        }
    }
}

fn divisor_or_one(value: f64, flag: ScoreFlag, flags: &mut Vec<ScoreFlag>) -> f64 {
    if value == 0.0 {
        flags.push(flag);
        1.0
    } else {
        value
    }
}

/// Weighted discriminant score over the five balance/income ratios.
pub(crate) fn discriminant(n: &NormalizedFinancials) -> f64 {
    let x1 = (n.total_current_assets - n.total_current_liabilities) / n.total_assets_divisor;
    let x2 = n.retained_earnings / n.total_assets_divisor;
    let x3 = (n.gross_profit + n.administrative_expenses + n.selling_expenses)
        / n.total_assets_divisor;
    let x4 = n.equity / n.total_liabilities_divisor;
    let x5 = n.ordinary_activity_revenue / n.total_assets_divisor;

    COEFF_X1 * x1 + COEFF_X2 * x2 + COEFF_X3 * x3 + COEFF_X4 * x4 + COEFF_X5 * x5
}

/// Stability tier from the discriminant score. Both band boundaries are
/// inclusive on the riskier side.
pub(crate) fn stability_factor(z: f64) -> f64 {
    if z <= HIGH_RISK_UPPER_BOUND {
        HIGH_RISK_FACTOR
    } else if z <= MEDIUM_RISK_UPPER_BOUND {
        MEDIUM_RISK_FACTOR
    } else {
        LOW_RISK_FACTOR
    }
}

pub(crate) fn round_i64(value: f64) -> i64 {
    value.round() as i64
}

pub(crate) fn annualized_days(average: f64, divisor: f64) -> i64 {
    round_i64(average / divisor * DAYS_PER_YEAR)
}
