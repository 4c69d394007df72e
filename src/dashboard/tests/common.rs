use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::dashboard::access::{SubscriptionDirectory, SubscriptionTier};
use crate::dashboard::domain::{DateWindow, StabilityBand};
use crate::dashboard::repository::{
    CreditAggregates, CustomerAnalytics, DebtStructureAverages, FinancialIndicatorAverages,
    ProfileDirectory, RecentStudyRow, RevenueNetIncomeRow, StudyAnalytics, TopCustomerRow,
    TurnoverAverages,
};
use crate::dashboard::service::DashboardService;
use crate::domain::{CompanyId, CustomerId, ParameterId, StoreError, StudyId, UserId};
use crate::parameters::ParameterResolver;

pub(super) fn company() -> CompanyId {
    CompanyId("co-acme".to_string())
}

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 6).expect("valid date")
}

/// Canned analytics double. Every query returns the configured data and
/// bumps a call counter so gating tests can assert short-circuiting. The
/// windows handed to the two month-trend queries are captured for
/// assertions on filter resolution.
#[derive(Default)]
pub(super) struct CannedStudyAnalytics {
    pub total_studies: u64,
    pub studies_this_month: u64,
    pub credit: CreditAggregates,
    pub by_status: Vec<(ParameterId, u64)>,
    pub by_month: Vec<(String, u64)>,
    pub recent: Vec<RecentStudyRow>,
    pub indicators: FinancialIndicatorAverages,
    pub distribution: Vec<(StabilityBand, u64)>,
    pub capacity_by_month: Vec<(String, f64)>,
    pub turnover: TurnoverAverages,
    pub top_customers: Vec<TopCustomerRow>,
    pub revenue_rows: Vec<RevenueNetIncomeRow>,
    pub debt: DebtStructureAverages,
    pub by_analyst: Vec<(UserId, u64)>,
    calls: AtomicUsize,
    pub trend_windows: Mutex<Vec<DateWindow>>,
    pub point_windows: Mutex<Vec<DateWindow>>,
}

impl CannedStudyAnalytics {
    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    fn record_point(&self, window: DateWindow) {
        self.point_windows
            .lock()
            .expect("window mutex poisoned")
            .push(window);
    }
}

impl StudyAnalytics for CannedStudyAnalytics {
    fn count_studies(&self, _company_id: &CompanyId) -> Result<u64, StoreError> {
        self.tick();
        Ok(self.total_studies)
    }

    fn count_studies_created_in(
        &self,
        _company_id: &CompanyId,
        _window: DateWindow,
    ) -> Result<u64, StoreError> {
        self.tick();
        Ok(self.studies_this_month)
    }

    fn credit_summary(
        &self,
        _company_id: &CompanyId,
        _window: DateWindow,
    ) -> Result<CreditAggregates, StoreError> {
        self.tick();
        Ok(self.credit)
    }

    fn studies_by_status(
        &self,
        _company_id: &CompanyId,
    ) -> Result<Vec<(ParameterId, u64)>, StoreError> {
        self.tick();
        Ok(self.by_status.clone())
    }

    fn studies_by_month(
        &self,
        _company_id: &CompanyId,
        _window: DateWindow,
    ) -> Result<Vec<(String, u64)>, StoreError> {
        self.tick();
        Ok(self.by_month.clone())
    }

    fn recent_studies(
        &self,
        _company_id: &CompanyId,
        _limit: usize,
    ) -> Result<Vec<RecentStudyRow>, StoreError> {
        self.tick();
        Ok(self.recent.clone())
    }

    fn financial_indicator_averages(
        &self,
        _company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<FinancialIndicatorAverages, StoreError> {
        self.tick();
        self.record_point(window);
        Ok(self.indicators)
    }

    fn stability_distribution(
        &self,
        _company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<Vec<(StabilityBand, u64)>, StoreError> {
        self.tick();
        self.record_point(window);
        Ok(self.distribution.clone())
    }

    fn payment_capacity_by_month(
        &self,
        _company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<Vec<(String, f64)>, StoreError> {
        self.tick();
        self.trend_windows
            .lock()
            .expect("window mutex poisoned")
            .push(window);
        Ok(self.capacity_by_month.clone())
    }

    fn turnover_averages(
        &self,
        _company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<TurnoverAverages, StoreError> {
        self.tick();
        self.record_point(window);
        Ok(self.turnover)
    }

    fn top_customers_by_credit(
        &self,
        _company_id: &CompanyId,
        _limit: usize,
        window: DateWindow,
    ) -> Result<Vec<TopCustomerRow>, StoreError> {
        self.tick();
        self.record_point(window);
        Ok(self.top_customers.clone())
    }

    fn revenue_net_income_by_month(
        &self,
        _company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<Vec<RevenueNetIncomeRow>, StoreError> {
        self.tick();
        self.trend_windows
            .lock()
            .expect("window mutex poisoned")
            .push(window);
        Ok(self.revenue_rows.clone())
    }

    fn debt_structure_averages(
        &self,
        _company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<DebtStructureAverages, StoreError> {
        self.tick();
        self.record_point(window);
        Ok(self.debt)
    }

    fn studies_by_analyst(
        &self,
        _company_id: &CompanyId,
        window: DateWindow,
    ) -> Result<Vec<(UserId, u64)>, StoreError> {
        self.tick();
        self.record_point(window);
        Ok(self.by_analyst.clone())
    }
}

#[derive(Default)]
pub(super) struct CannedCustomerAnalytics {
    pub total_customers: u64,
    pub by_person_type: Vec<(ParameterId, u64)>,
    pub by_activity: Vec<(ParameterId, u64)>,
}

impl CustomerAnalytics for CannedCustomerAnalytics {
    fn count_customers(&self, _company_id: &CompanyId) -> Result<u64, StoreError> {
        Ok(self.total_customers)
    }

    fn customers_by_person_type(
        &self,
        _company_id: &CompanyId,
    ) -> Result<Vec<(ParameterId, u64)>, StoreError> {
        Ok(self.by_person_type.clone())
    }

    fn customers_by_economic_activity(
        &self,
        _company_id: &CompanyId,
    ) -> Result<Vec<(ParameterId, u64)>, StoreError> {
        Ok(self.by_activity.clone())
    }
}

#[derive(Default)]
pub(super) struct CannedParameters {
    pub labels: BTreeMap<ParameterId, String>,
}

impl CannedParameters {
    pub(super) fn with(labels: &[(i64, &str)]) -> Self {
        Self {
            labels: labels
                .iter()
                .map(|(id, label)| (ParameterId(*id), label.to_string()))
                .collect(),
        }
    }
}

impl ParameterResolver for CannedParameters {
    fn parameter_label(&self, id: ParameterId) -> Result<Option<String>, StoreError> {
        Ok(self.labels.get(&id).cloned())
    }

    fn status_id_by_code(&self, _code: &str) -> Result<Option<ParameterId>, StoreError> {
        Ok(None)
    }

    fn labels_for(&self, ids: &[ParameterId]) -> Result<BTreeMap<ParameterId, String>, StoreError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.labels.get(id).map(|label| (*id, label.clone())))
            .collect())
    }
}

#[derive(Default)]
pub(super) struct CannedProfiles {
    pub active_members: u64,
    pub names: BTreeMap<UserId, String>,
}

impl ProfileDirectory for CannedProfiles {
    fn count_active_members(&self, _company_id: &CompanyId) -> Result<u64, StoreError> {
        Ok(self.active_members)
    }

    fn display_names_for(
        &self,
        user_ids: &[UserId],
    ) -> Result<BTreeMap<UserId, String>, StoreError> {
        Ok(user_ids
            .iter()
            .filter_map(|id| self.names.get(id).map(|name| (id.clone(), name.clone())))
            .collect())
    }
}

pub(super) struct CannedSubscriptions {
    pub tier: Option<SubscriptionTier>,
}

impl SubscriptionDirectory for CannedSubscriptions {
    fn current_tier(
        &self,
        _company_id: &CompanyId,
    ) -> Result<Option<SubscriptionTier>, StoreError> {
        Ok(self.tier)
    }
}

pub(super) struct UnavailableSubscriptions;

impl SubscriptionDirectory for UnavailableSubscriptions {
    fn current_tier(
        &self,
        _company_id: &CompanyId,
    ) -> Result<Option<SubscriptionTier>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

pub(super) type TestService = DashboardService<
    CannedStudyAnalytics,
    CannedCustomerAnalytics,
    CannedParameters,
    CannedProfiles,
    CannedSubscriptions,
>;

pub(super) fn seeded_studies() -> CannedStudyAnalytics {
    CannedStudyAnalytics {
        total_studies: 42,
        studies_this_month: 7,
        credit: CreditAggregates {
            total_requested: Some(120_000_000.0),
            avg_requested: Some(17_142_857.14),
            avg_term: Some(18.0),
        },
        by_status: vec![(ParameterId(10), 30), (ParameterId(11), 12)],
        by_month: vec![("2026-07".to_string(), 4), ("2026-08".to_string(), 7)],
        recent: vec![RecentStudyRow {
            id: StudyId("study-9".to_string()),
            customer_name: "Comercial Andina".to_string(),
            study_date: NaiveDate::from_ymd_opt(2026, 8, 2).expect("valid date"),
            status_label: "En estudio".to_string(),
            requested_monthly_credit_line: Some(25_000_000.0),
        }],
        indicators: FinancialIndicatorAverages {
            ebitda: Some(3_000_000.0),
            monthly_payment_capacity: Some(-120_000.0),
            stability_factor: Some(0.58),
            maximum_payment_time: Some(44.0),
        },
        distribution: vec![
            (StabilityBand::HighRisk, 5),
            (StabilityBand::MediumRisk, 20),
            (StabilityBand::LowRisk, 17),
        ],
        capacity_by_month: vec![("2026-06".to_string(), 150_000.0)],
        turnover: TurnoverAverages {
            accounts_receivable_turnover: Some(73.0),
            inventory_turnover: Some(46.0),
            suppliers_turnover: Some(-70.0),
            maximum_payment_time: Some(49.0),
        },
        top_customers: vec![TopCustomerRow {
            customer_id: CustomerId("cust-001".to_string()),
            business_name: "Comercial Andina".to_string(),
            total_credit: 75_000_000.0,
            studies_count: 3,
        }],
        revenue_rows: vec![RevenueNetIncomeRow {
            month: "2026-05".to_string(),
            avg_revenue: 80_000_000.0,
            avg_net_income: 6_500_000.0,
        }],
        debt: DebtStructureAverages {
            total_current_liabilities: Some(25_000_000.0),
            total_non_current_liabilities: Some(20_000_000.0),
            equity: Some(40_000_000.0),
            total_liabilities: Some(45_000_000.0),
        },
        by_analyst: vec![
            (UserId("user-ana".to_string()), 28),
            (UserId("user-gone".to_string()), 14),
        ],
        ..CannedStudyAnalytics::default()
    }
}

pub(super) fn seeded_customers() -> CannedCustomerAnalytics {
    CannedCustomerAnalytics {
        total_customers: 12,
        by_person_type: vec![(ParameterId(20), 9), (ParameterId(21), 3)],
        by_activity: vec![(ParameterId(30), 8), (ParameterId(31), 4)],
    }
}

pub(super) fn seeded_parameters() -> CannedParameters {
    CannedParameters::with(&[
        (10, "En estudio"),
        (11, "Estudio realizado"),
        (20, "Persona Natural"),
        (30, "Comercio"),
        // 21 and 31 intentionally unresolved
    ])
}

pub(super) fn seeded_profiles() -> CannedProfiles {
    let mut names = BTreeMap::new();
    names.insert(UserId("user-ana".to_string()), "Ana Torres".to_string());
    CannedProfiles {
        active_members: 4,
        names,
    }
}

pub(super) fn build_service(tier: Option<SubscriptionTier>) -> (Arc<TestService>, Arc<CannedStudyAnalytics>) {
    build_service_with(seeded_studies(), tier)
}

pub(super) fn build_service_with(
    studies: CannedStudyAnalytics,
    tier: Option<SubscriptionTier>,
) -> (Arc<TestService>, Arc<CannedStudyAnalytics>) {
    let studies = Arc::new(studies);
    let service = Arc::new(DashboardService::new(
        studies.clone(),
        Arc::new(seeded_customers()),
        Arc::new(seeded_parameters()),
        Arc::new(seeded_profiles()),
        Arc::new(CannedSubscriptions { tier }),
    ));
    (service, studies)
}
