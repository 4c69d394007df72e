//! Serializable dashboard view models. Computed fresh per request; no
//! persisted identity.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{CustomerId, ParameterId, StudyId, UserId};

use super::domain::StabilityBand;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_customers: u64,
    pub total_studies: u64,
    pub studies_this_month: u64,
    pub active_users: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreditSummary {
    pub total_requested_this_month: f64,
    pub avg_requested_this_month: f64,
    pub avg_requested_term: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusCountEntry {
    pub status_id: ParameterId,
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonTypeEntry {
    pub person_type_id: ParameterId,
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthCountEntry {
    pub month: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthValueEntry {
    pub month: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentStudyEntry {
    pub id: StudyId,
    pub customer_name: String,
    pub study_date: NaiveDate,
    pub status_label: String,
    pub requested_monthly_credit_line: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BasicDashboard {
    pub summary: DashboardSummary,
    pub credit_summary: CreditSummary,
    pub studies_by_status: Vec<StatusCountEntry>,
    pub studies_by_month: Vec<MonthCountEntry>,
    pub customers_by_person_type: Vec<PersonTypeEntry>,
    pub recent_studies: Vec<RecentStudyEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinancialIndicators {
    pub avg_ebitda: f64,
    pub avg_monthly_payment_capacity: f64,
    pub avg_stability_factor: f64,
    pub avg_max_payment_time: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StabilityBandEntry {
    pub band: StabilityBand,
    pub band_label: &'static str,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnoverIndicators {
    pub accounts_receivable_turnover: f64,
    pub inventory_turnover: f64,
    pub suppliers_turnover: f64,
    pub maximum_payment_time: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopCustomerEntry {
    pub customer_id: CustomerId,
    pub business_name: String,
    pub total_credit: f64,
    pub studies_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenueNetIncomeEntry {
    pub month: String,
    pub avg_revenue: f64,
    pub avg_net_income: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DebtStructure {
    pub avg_current_liabilities: f64,
    pub avg_non_current_liabilities: f64,
    pub avg_equity: f64,
    /// `None` when the average equity over the window is exactly zero.
    pub debt_to_equity_ratio: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalystCountEntry {
    pub analyst_id: UserId,
    pub analyst_name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EconomicActivityEntry {
    pub economic_activity_id: ParameterId,
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdvancedDashboard {
    #[serde(flatten)]
    pub basic: BasicDashboard,
    pub financial_indicators: FinancialIndicators,
    pub stability_distribution: Vec<StabilityBandEntry>,
    pub payment_capacity_trend: Vec<MonthValueEntry>,
    pub avg_turnover_indicators: TurnoverIndicators,
    pub top_customers_by_credit: Vec<TopCustomerEntry>,
    pub revenue_vs_net_income: Vec<RevenueNetIncomeEntry>,
    pub avg_debt_structure: DebtStructure,
    pub studies_by_analyst: Vec<AnalystCountEntry>,
    pub customers_by_economic_activity: Vec<EconomicActivityEntry>,
}
