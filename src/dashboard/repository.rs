//! Analytics collaborator boundary for the dashboard aggregator.
//!
//! Implementations run the actual count/sum/group-by queries; the core only
//! reduces their rows into view models. Averages come back as `Option` so an
//! empty window is distinguishable from a zero average.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{CompanyId, CustomerId, ParameterId, StoreError, StudyId, UserId};

use super::domain::{DateWindow, StabilityBand};

/// Aggregates over `requested_monthly_credit_line` / `requested_term`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CreditAggregates {
    pub total_requested: Option<f64>,
    pub avg_requested: Option<f64>,
    pub avg_term: Option<f64>,
}

/// Averages of the persisted score indicators, over studies that have one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FinancialIndicatorAverages {
    pub ebitda: Option<f64>,
    pub monthly_payment_capacity: Option<f64>,
    pub stability_factor: Option<f64>,
    pub maximum_payment_time: Option<f64>,
}

/// Averages of the four working-capital cycle indicators.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TurnoverAverages {
    pub accounts_receivable_turnover: Option<f64>,
    pub inventory_turnover: Option<f64>,
    pub suppliers_turnover: Option<f64>,
    pub maximum_payment_time: Option<f64>,
}

/// Averages over the liability/equity structure.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DebtStructureAverages {
    pub total_current_liabilities: Option<f64>,
    pub total_non_current_liabilities: Option<f64>,
    pub equity: Option<f64>,
    pub total_liabilities: Option<f64>,
}

/// One of the five most recent studies, already joined to its customer and
/// status label by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentStudyRow {
    pub id: StudyId,
    pub customer_name: String,
    pub study_date: NaiveDate,
    pub status_label: String,
    pub requested_monthly_credit_line: Option<f64>,
}

/// Customer ranked by total requested credit within a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCustomerRow {
    pub customer_id: CustomerId,
    pub business_name: String,
    pub total_credit: f64,
    pub studies_count: u64,
}

/// Month-bucketed dual averages of revenue and net income.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueNetIncomeRow {
    pub month: String,
    pub avg_revenue: f64,
    pub avg_net_income: f64,
}

/// Read queries over a tenant's credit studies.
pub trait StudyAnalytics: Send + Sync {
    fn count_studies(&self, company_id: &CompanyId) -> Result<u64, StoreError>;

    fn count_studies_created_in(
        &self,
        company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<u64, StoreError>;

    fn credit_summary(
        &self,
        company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<CreditAggregates, StoreError>;

    fn studies_by_status(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<(ParameterId, u64)>, StoreError>;

    /// Study counts per `YYYY-MM` month of `study_date`, within the window.
    fn studies_by_month(
        &self,
        company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<Vec<(String, u64)>, StoreError>;

    fn recent_studies(
        &self,
        company_id: &CompanyId,
        limit: usize,
    ) -> Result<Vec<RecentStudyRow>, StoreError>;

    fn financial_indicator_averages(
        &self,
        company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<FinancialIndicatorAverages, StoreError>;

    fn stability_distribution(
        &self,
        company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<Vec<(StabilityBand, u64)>, StoreError>;

    /// Average monthly payment capacity per `YYYY-MM` month.
    fn payment_capacity_by_month(
        &self,
        company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<Vec<(String, f64)>, StoreError>;

    fn turnover_averages(
        &self,
        company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<TurnoverAverages, StoreError>;

    /// Top customers by summed requested credit; ties resolve by the store's
    /// stable default ordering.
    fn top_customers_by_credit(
        &self,
        company_id: &CompanyId,
        limit: usize,
        window: DateWindow,
    ) -> Result<Vec<TopCustomerRow>, StoreError>;

    fn revenue_net_income_by_month(
        &self,
        company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<Vec<RevenueNetIncomeRow>, StoreError>;

    fn debt_structure_averages(
        &self,
        company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<DebtStructureAverages, StoreError>;

    /// Study counts grouped by the creating analyst.
    fn studies_by_analyst(
        &self,
        company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<Vec<(UserId, u64)>, StoreError>;
}

/// Read queries over a tenant's customers.
pub trait CustomerAnalytics: Send + Sync {
    fn count_customers(&self, company_id: &CompanyId) -> Result<u64, StoreError>;

    fn customers_by_person_type(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<(ParameterId, u64)>, StoreError>;

    /// Customers with no economic-activity code are excluded.
    fn customers_by_economic_activity(
        &self,
        company_id: &CompanyId,
    ) -> Result<Vec<(ParameterId, u64)>, StoreError>;
}

/// Profile lookups for analyst display names and active-member counts.
pub trait ProfileDirectory: Send + Sync {
    fn count_active_members(&self, company_id: &CompanyId) -> Result<u64, StoreError>;

    fn display_names_for(
        &self,
        user_ids: &[UserId],
    ) -> Result<BTreeMap<UserId, String>, StoreError>;
}
