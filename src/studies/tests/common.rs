use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::domain::{CompanyId, CustomerId, ParameterId, StoreError, StudyId};
use crate::parameters::{ParameterResolver, STATUS_STUDY_COMPLETED};
use crate::studies::domain::{FinancialInputs, ScoreRecord, StudyRecord};
use crate::studies::repository::StudyStore;
use crate::studies::service::StudyScoringService;

pub(super) const COMPLETED_STATUS_ID: ParameterId = ParameterId(99);
pub(super) const QUARTERLY_PERIOD_ID: ParameterId = ParameterId(7);

pub(super) fn company() -> CompanyId {
    CompanyId("co-acme".to_string())
}

/// Boundary-adjacent regression inputs: the discriminant lands at ~2.985,
/// just inside the medium-risk band.
pub(super) fn fixture_inputs() -> FinancialInputs {
    FinancialInputs {
        total_current_assets: Some(50_000_000.0),
        total_current_liabilities: Some(25_000_000.0),
        total_assets: Some(85_000_000.0),
        retained_earnings: Some(20_000_000.0),
        gross_profit: Some(30_000_000.0),
        administrative_expenses: Some(5_000_000.0),
        selling_expenses: Some(3_000_000.0),
        equity: Some(40_000_000.0),
        total_liabilities: Some(45_000_000.0),
        ordinary_activity_revenue: Some(25_000_000.0),
        cost_of_sales: Some(12_000_000.0),
        depreciation_amortization: Some(2_000_000.0),
        short_term_financial_liabilities: Some(4_000_000.0),
        financial_expenses: Some(1_000_000.0),
        suppliers_1: Some(2_000_000.0),
        suppliers_2: Some(3_000_000.0),
        inventories_1: Some(1_000_000.0),
        inventories_2: Some(2_000_000.0),
        accounts_receivable_1: Some(4_000_000.0),
        accounts_receivable_2: Some(6_000_000.0),
        requested_term: Some(24),
        requested_monthly_credit_line: Some(10_000_000.0),
        ..FinancialInputs::default()
    }
}

pub(super) fn study_record(id: &str) -> StudyRecord {
    StudyRecord {
        id: StudyId(id.to_string()),
        company_id: company(),
        customer_id: CustomerId("cust-001".to_string()),
        study_date: NaiveDate::from_ymd_opt(2026, 6, 15).expect("valid date"),
        income_statement_period: None,
        financials: fixture_inputs(),
    }
}

#[derive(Default)]
pub(super) struct MemoryStudyStore {
    records: Mutex<HashMap<StudyId, StudyRecord>>,
    saved: Mutex<HashMap<StudyId, ScoreRecord>>,
}

impl MemoryStudyStore {
    pub(super) fn with_record(record: StudyRecord) -> Self {
        let store = Self::default();
        store
            .records
            .lock()
            .expect("store mutex poisoned")
            .insert(record.id.clone(), record);
        store
    }

    pub(super) fn saved_score(&self, id: &StudyId) -> Option<ScoreRecord> {
        self.saved.lock().expect("store mutex poisoned").get(id).cloned()
    }

    pub(super) fn saved_count(&self) -> usize {
        self.saved.lock().expect("store mutex poisoned").len()
    }
}

impl StudyStore for MemoryStudyStore {
    fn fetch(
        &self,
        id: &StudyId,
        company_id: &CompanyId,
    ) -> Result<Option<StudyRecord>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard
            .get(id)
            .filter(|record| record.company_id == *company_id)
            .cloned())
    }

    fn save_score(&self, id: &StudyId, record: &ScoreRecord) -> Result<(), StoreError> {
        let mut guard = self.saved.lock().expect("store mutex poisoned");
        guard.insert(id.clone(), record.clone());
        Ok(())
    }
}

/// Store double that hands back a record belonging to another tenant,
/// exercising the service's cross-tenant guard.
pub(super) struct MisscopedStudyStore;

impl StudyStore for MisscopedStudyStore {
    fn fetch(
        &self,
        id: &StudyId,
        _company_id: &CompanyId,
    ) -> Result<Option<StudyRecord>, StoreError> {
        let mut record = study_record(&id.0);
        record.company_id = CompanyId("co-other".to_string());
        Ok(Some(record))
    }

    fn save_score(&self, _id: &StudyId, _record: &ScoreRecord) -> Result<(), StoreError> {
        panic!("save_score must not be reached for a mismatched tenant");
    }
}

pub(super) struct UnavailableStudyStore;

impl StudyStore for UnavailableStudyStore {
    fn fetch(
        &self,
        _id: &StudyId,
        _company_id: &CompanyId,
    ) -> Result<Option<StudyRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn save_score(&self, _id: &StudyId, _record: &ScoreRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryParameters {
    labels: HashMap<ParameterId, String>,
    codes: HashMap<String, ParameterId>,
}

impl MemoryParameters {
    /// Standard fixture: a quarterly period label plus the completed status.
    pub(super) fn standard() -> Self {
        let mut params = Self::default();
        params
            .labels
            .insert(QUARTERLY_PERIOD_ID, "Trimestral".to_string());
        params
            .codes
            .insert(STATUS_STUDY_COMPLETED.to_string(), COMPLETED_STATUS_ID);
        params
    }

    pub(super) fn without_completed_status() -> Self {
        let mut params = Self::standard();
        params.codes.clear();
        params
    }

    pub(super) fn with_label(mut self, id: ParameterId, label: &str) -> Self {
        self.labels.insert(id, label.to_string());
        self
    }
}

impl ParameterResolver for MemoryParameters {
    fn parameter_label(&self, id: ParameterId) -> Result<Option<String>, StoreError> {
        Ok(self.labels.get(&id).cloned())
    }

    fn status_id_by_code(&self, code: &str) -> Result<Option<ParameterId>, StoreError> {
        Ok(self.codes.get(code).copied())
    }

    fn labels_for(&self, ids: &[ParameterId]) -> Result<BTreeMap<ParameterId, String>, StoreError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.labels.get(id).map(|label| (*id, label.clone())))
            .collect())
    }
}

pub(super) fn build_service(
    record: StudyRecord,
) -> (
    Arc<StudyScoringService<MemoryStudyStore, MemoryParameters>>,
    Arc<MemoryStudyStore>,
) {
    let store = Arc::new(MemoryStudyStore::with_record(record));
    let service = Arc::new(StudyScoringService::new(
        store.clone(),
        Arc::new(MemoryParameters::standard()),
    ));
    (service, store)
}
