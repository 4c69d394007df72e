use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CompanyId, CustomerId, ParameterId, StudyId};

/// Raw financial-statement lines captured for one credit study.
///
/// Every numeric field is optional: analysts fill these in over time and the
/// scoring engine applies the absent-means-zero policy in one place
/// (`scoring::formulas::NormalizedFinancials`), never here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialInputs {
    // Balance sheet
    pub total_current_assets: Option<f64>,
    pub total_non_current_assets: Option<f64>,
    pub total_assets: Option<f64>,
    pub fixed_assets_property: Option<f64>,
    pub cash_and_equivalents: Option<f64>,
    pub accounts_receivable_1: Option<f64>,
    pub accounts_receivable_2: Option<f64>,
    pub inventories_1: Option<f64>,
    pub inventories_2: Option<f64>,
    // Liabilities and equity
    pub total_current_liabilities: Option<f64>,
    pub total_non_current_liabilities: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub short_term_financial_liabilities: Option<f64>,
    pub long_term_financial_liabilities: Option<f64>,
    pub suppliers_1: Option<f64>,
    pub suppliers_2: Option<f64>,
    pub retained_earnings: Option<f64>,
    pub equity: Option<f64>,
    // Income statement
    pub ordinary_activity_revenue: Option<f64>,
    pub cost_of_sales: Option<f64>,
    pub gross_profit: Option<f64>,
    pub administrative_expenses: Option<f64>,
    pub selling_expenses: Option<f64>,
    pub depreciation_amortization: Option<f64>,
    pub financial_expenses: Option<f64>,
    pub taxes: Option<f64>,
    pub net_income: Option<f64>,
    // Request metadata
    pub requested_term: Option<u32>,
    pub requested_monthly_credit_line: Option<f64>,
}

/// A credit study as loaded from the study store, scoped to its tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyRecord {
    pub id: StudyId,
    pub company_id: CompanyId,
    pub customer_id: CustomerId,
    pub study_date: NaiveDate,
    /// Parameter id whose label names the income-statement period.
    pub income_statement_period: Option<ParameterId>,
    pub financials: FinancialInputs,
}

/// Marks an indicator that was computed against a defaulted or degenerate
/// divisor. Flagged values are available but not a reliable signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFlag {
    DefaultedTotalAssets,
    DefaultedTotalLiabilities,
    DefaultedRevenue,
    DefaultedCostOfSales,
    /// The payment-cycle base (cost of sales plus inventory delta) was zero;
    /// `average_payment_time` and `suppliers_turnover` carry the sentinel 0.
    UndefinedPaymentCycle,
}

/// Outcome of one scoring run over a study's financial inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub ebitda: f64,
    pub adjusted_ebitda: f64,
    /// Discount multiplier derived from the discriminant score: 0.33, 0.66, or 1.
    pub stability_factor: f64,
    pub current_debt_service: f64,
    pub annual_payment_capacity: f64,
    pub monthly_payment_capacity: i64,
    /// Days of supplier financing; negative when the cycle base is negative.
    pub average_payment_time: i64,
    pub accounts_receivable_turnover: i64,
    pub inventory_turnover: i64,
    /// Always the negation of `average_payment_time`.
    pub suppliers_turnover: i64,
    pub maximum_payment_time: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<ScoreFlag>,
}

impl ScoreResult {
    pub fn is_flagged(&self, flag: ScoreFlag) -> bool {
        self.flags.contains(&flag)
    }
}

/// What the service persists back onto the study after a scoring run.
/// Recomputation overwrites a previous record; writes are last-write-wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub result: ScoreResult,
    pub resolution_date: DateTime<Utc>,
    pub status_id: ParameterId,
}

/// Response view for a completed perform invocation.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredStudy {
    pub study_id: StudyId,
    pub company_id: CompanyId,
    pub customer_id: CustomerId,
    pub result: ScoreResult,
    pub resolution_date: DateTime<Utc>,
    pub status_id: ParameterId,
}
