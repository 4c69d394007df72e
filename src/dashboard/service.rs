use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{CompanyId, StoreError};
use crate::parameters::ParameterResolver;

use super::access::{AccessDenied, AccessGate, SubscriptionDirectory, SubscriptionTier};
use super::domain::{DashboardFilter, DateWindow};
use super::months;
use super::repository::{CustomerAnalytics, ProfileDirectory, StudyAnalytics};
use super::views::{
    AdvancedDashboard, AnalystCountEntry, BasicDashboard, CreditSummary, DashboardSummary,
    DebtStructure, EconomicActivityEntry, FinancialIndicators, MonthCountEntry, MonthValueEntry,
    PersonTypeEntry, RecentStudyEntry, RevenueNetIncomeEntry, StabilityBandEntry,
    StatusCountEntry, TopCustomerEntry, TurnoverIndicators,
};

/// Label rendered for any id the lookup collaborators cannot resolve.
/// Unresolved labels never fail a dashboard request.
pub const UNKNOWN_LABEL: &str = "Unknown";

const STUDIES_BY_MONTH_WINDOW: u32 = 6;
const TREND_WINDOW: u32 = 12;
const RECENT_STUDIES_LIMIT: usize = 5;
const TOP_CUSTOMERS_LIMIT: usize = 10;

/// Aggregator composing the analytics stores, the month filler, and the
/// subscription gate into the two dashboard view models.
///
/// The constituent read queries carry no ordering dependency among each
/// other; only the batch label/name lookups must run after the group-bys
/// that produce the ids they resolve.
pub struct DashboardService<S, C, P, U, B> {
    studies: Arc<S>,
    customers: Arc<C>,
    parameters: Arc<P>,
    profiles: Arc<U>,
    gate: AccessGate<B>,
}

impl<S, C, P, U, B> DashboardService<S, C, P, U, B>
where
    S: StudyAnalytics + 'static,
    C: CustomerAnalytics + 'static,
    P: ParameterResolver + 'static,
    U: ProfileDirectory + 'static,
    B: SubscriptionDirectory + 'static,
{
    pub fn new(
        studies: Arc<S>,
        customers: Arc<C>,
        parameters: Arc<P>,
        profiles: Arc<U>,
        subscriptions: Arc<B>,
    ) -> Self {
        Self {
            studies,
            customers,
            parameters,
            profiles,
            gate: AccessGate::new(subscriptions),
        }
    }

    /// Assemble the basic dashboard. `today` anchors the month axis and the
    /// current-month aggregates; callers inject it once per request.
    pub fn basic(
        &self,
        company_id: &CompanyId,
        today: NaiveDate,
    ) -> Result<BasicDashboard, DashboardError> {
        let this_month = DateWindow::current_month(today);

        let total_customers = self.customers.count_customers(company_id)?;
        let total_studies = self.studies.count_studies(company_id)?;
        let studies_this_month = self.studies.count_studies_created_in(company_id, this_month)?;
        let active_users = self.profiles.count_active_members(company_id)?;
        let credit = self.studies.credit_summary(company_id, this_month)?;
        let by_status = self.studies.studies_by_status(company_id)?;
        let by_month = self
            .studies
            .studies_by_month(company_id, DateWindow::trailing_months(STUDIES_BY_MONTH_WINDOW, today))?;
        let by_person_type = self.customers.customers_by_person_type(company_id)?;
        let recent = self.studies.recent_studies(company_id, RECENT_STUDIES_LIMIT)?;

        // Single batch lookup for every code surfaced by the group-bys.
        let mut label_ids: Vec<_> = by_status.iter().map(|(id, _)| *id).collect();
        label_ids.extend(by_person_type.iter().map(|(id, _)| *id));
        let labels = self.parameters.labels_for(&label_ids)?;

        let studies_by_status = by_status
            .into_iter()
            .map(|(status_id, count)| StatusCountEntry {
                status_id,
                label: resolve_label(&labels, status_id),
                count,
            })
            .collect();

        let customers_by_person_type = by_person_type
            .into_iter()
            .map(|(person_type_id, count)| PersonTypeEntry {
                person_type_id,
                label: resolve_label(&labels, person_type_id),
                count,
            })
            .collect();

        let sparse: BTreeMap<String, u64> = by_month.into_iter().collect();
        let studies_by_month = months::fill(&sparse, STUDIES_BY_MONTH_WINDOW, 0, today)
            .into_iter()
            .map(|bucket| MonthCountEntry {
                month: bucket.month,
                count: bucket.value,
            })
            .collect();

        let recent_studies = recent
            .into_iter()
            .map(|row| RecentStudyEntry {
                id: row.id,
                customer_name: row.customer_name,
                study_date: row.study_date,
                status_label: row.status_label,
                requested_monthly_credit_line: row.requested_monthly_credit_line,
            })
            .collect();

        Ok(BasicDashboard {
            summary: DashboardSummary {
                total_customers,
                total_studies,
                studies_this_month,
                active_users,
            },
            credit_summary: CreditSummary {
                total_requested_this_month: credit.total_requested.unwrap_or(0.0),
                avg_requested_this_month: credit.avg_requested.unwrap_or(0.0),
                avg_requested_term: credit.avg_term.unwrap_or(0.0),
            },
            studies_by_status,
            studies_by_month,
            customers_by_person_type,
            recent_studies,
        })
    }

    /// Assemble the advanced dashboard. The subscription gate runs first and
    /// a denial short-circuits before any aggregate query is issued.
    pub fn advanced(
        &self,
        company_id: &CompanyId,
        filter: &DashboardFilter,
        today: NaiveDate,
    ) -> Result<AdvancedDashboard, DashboardError> {
        let tier = self.gate.authorize(company_id)?;
        debug!(company = %company_id.0, tier = tier.code(), "advanced dashboard authorized");

        let basic = self.basic(company_id, today)?;

        // Point aggregates treat "no filter" as all time; the two month
        // trends default to the trailing twelve months instead.
        let point_window = filter.resolve(DateWindow::open());
        let trend_window = filter.resolve(DateWindow::trailing_months(TREND_WINDOW, today));

        let indicators = self
            .studies
            .financial_indicator_averages(company_id, point_window)?;
        let distribution = self.studies.stability_distribution(company_id, point_window)?;
        let capacity_by_month = self
            .studies
            .payment_capacity_by_month(company_id, trend_window)?;
        let turnover = self.studies.turnover_averages(company_id, point_window)?;
        let top_customers = self
            .studies
            .top_customers_by_credit(company_id, TOP_CUSTOMERS_LIMIT, point_window)?;
        let revenue_rows = self
            .studies
            .revenue_net_income_by_month(company_id, trend_window)?;
        let debt = self.studies.debt_structure_averages(company_id, point_window)?;
        let by_analyst = self.studies.studies_by_analyst(company_id, point_window)?;
        let by_activity = self.customers.customers_by_economic_activity(company_id)?;

        let analyst_ids: Vec<_> = by_analyst.iter().map(|(id, _)| id.clone()).collect();
        let names = self.profiles.display_names_for(&analyst_ids)?;
        let activity_ids: Vec<_> = by_activity.iter().map(|(id, _)| *id).collect();
        let labels = self.parameters.labels_for(&activity_ids)?;

        let stability_distribution = distribution
            .into_iter()
            .map(|(band, count)| StabilityBandEntry {
                band,
                band_label: band.label(),
                count,
            })
            .collect();

        let capacity_sparse: BTreeMap<String, f64> = capacity_by_month.into_iter().collect();
        let payment_capacity_trend = months::fill(&capacity_sparse, TREND_WINDOW, 0.0, today)
            .into_iter()
            .map(|bucket| MonthValueEntry {
                month: bucket.month,
                value: bucket.value,
            })
            .collect();

        let revenue_sparse: BTreeMap<String, (f64, f64)> = revenue_rows
            .into_iter()
            .map(|row| (row.month, (row.avg_revenue, row.avg_net_income)))
            .collect();
        let revenue_vs_net_income = months::fill(&revenue_sparse, TREND_WINDOW, (0.0, 0.0), today)
            .into_iter()
            .map(|bucket| RevenueNetIncomeEntry {
                month: bucket.month,
                avg_revenue: bucket.value.0,
                avg_net_income: bucket.value.1,
            })
            .collect();

        let avg_equity = debt.equity.unwrap_or(0.0);
        let avg_debt_structure = DebtStructure {
            avg_current_liabilities: debt.total_current_liabilities.unwrap_or(0.0),
            avg_non_current_liabilities: debt.total_non_current_liabilities.unwrap_or(0.0),
            avg_equity,
            debt_to_equity_ratio: if avg_equity == 0.0 {
                None
            } else {
                Some(debt.total_liabilities.unwrap_or(0.0) / avg_equity)
            },
        };

        let studies_by_analyst = by_analyst
            .into_iter()
            .map(|(analyst_id, count)| AnalystCountEntry {
                analyst_name: names
                    .get(&analyst_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
                analyst_id,
                count,
            })
            .collect();

        let customers_by_economic_activity = by_activity
            .into_iter()
            .map(|(economic_activity_id, count)| EconomicActivityEntry {
                economic_activity_id,
                label: resolve_label(&labels, economic_activity_id),
                count,
            })
            .collect();

        Ok(AdvancedDashboard {
            basic,
            financial_indicators: FinancialIndicators {
                avg_ebitda: indicators.ebitda.unwrap_or(0.0),
                avg_monthly_payment_capacity: indicators.monthly_payment_capacity.unwrap_or(0.0),
                avg_stability_factor: indicators.stability_factor.unwrap_or(0.0),
                avg_max_payment_time: indicators.maximum_payment_time.unwrap_or(0.0),
            },
            stability_distribution,
            payment_capacity_trend,
            avg_turnover_indicators: TurnoverIndicators {
                accounts_receivable_turnover: turnover
                    .accounts_receivable_turnover
                    .unwrap_or(0.0),
                inventory_turnover: turnover.inventory_turnover.unwrap_or(0.0),
                suppliers_turnover: turnover.suppliers_turnover.unwrap_or(0.0),
                maximum_payment_time: turnover.maximum_payment_time.unwrap_or(0.0),
            },
            top_customers_by_credit: top_customers
                .into_iter()
                .map(|row| TopCustomerEntry {
                    customer_id: row.customer_id,
                    business_name: row.business_name,
                    total_credit: row.total_credit,
                    studies_count: row.studies_count,
                })
                .collect(),
            revenue_vs_net_income,
            avg_debt_structure,
            studies_by_analyst,
            customers_by_economic_activity,
        })
    }
}

fn resolve_label(
    labels: &BTreeMap<crate::domain::ParameterId, String>,
    id: crate::domain::ParameterId,
) -> String {
    labels
        .get(&id)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
}

/// Error raised by the dashboard aggregator.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("company {} has no subscription on record", .0 .0)]
    SubscriptionNotFound(CompanyId),
    #[error(
        "the current '{}' plan does not include the advanced dashboard; \
         an advanced or premium plan is required",
        .0.code()
    )]
    AdvancedTierRequired(SubscriptionTier),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AccessDenied> for DashboardError {
    fn from(denied: AccessDenied) -> Self {
        match denied {
            AccessDenied::SubscriptionNotFound(company) => Self::SubscriptionNotFound(company),
            AccessDenied::AdvancedTierRequired(tier) => Self::AdvancedTierRequired(tier),
            AccessDenied::Store(error) => Self::Store(error),
        }
    }
}
