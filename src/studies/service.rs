use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{CompanyId, StoreError, StudyId};
use crate::parameters::{IncomeStatementPeriod, ParameterResolver, STATUS_STUDY_COMPLETED};

use super::domain::{ScoreRecord, ScoredStudy};
use super::repository::StudyStore;
use super::scoring;

/// Service composing the study store, the parameter resolver, and the pure
/// scoring engine into the "perform" operation.
pub struct StudyScoringService<S, P> {
    store: Arc<S>,
    parameters: Arc<P>,
}

impl<S, P> StudyScoringService<S, P>
where
    S: StudyStore + 'static,
    P: ParameterResolver + 'static,
{
    pub fn new(store: Arc<S>, parameters: Arc<P>) -> Self {
        Self { store, parameters }
    }

    /// Score one study and persist the outcome onto it.
    ///
    /// `resolved_on` is injected by the caller so the service itself stays
    /// clock-free. Recomputation overwrites the previous score.
    pub fn perform(
        &self,
        company_id: &CompanyId,
        study_id: &StudyId,
        resolved_on: DateTime<Utc>,
    ) -> Result<ScoredStudy, ScoringServiceError> {
        let study = self
            .store
            .fetch(study_id, company_id)?
            .ok_or_else(|| ScoringServiceError::StudyNotFound(study_id.clone()))?;

        // Never compute over a record the store handed back for the wrong
        // tenant, even though fetch is already scoped.
        if study.company_id != *company_id {
            return Err(ScoringServiceError::TenantMismatch {
                study: study_id.clone(),
                company: company_id.clone(),
            });
        }

        let period = match study.income_statement_period {
            Some(parameter_id) => self
                .parameters
                .parameter_label(parameter_id)?
                .map(|label| IncomeStatementPeriod::from_label(&label))
                .unwrap_or(IncomeStatementPeriod::Anual),
            None => IncomeStatementPeriod::Anual,
        };

        let result = scoring::compute(&study.financials, period);
        debug!(
            study = %study.id.0,
            stability_factor = result.stability_factor,
            flags = result.flags.len(),
            "study scored"
        );

        let status_id = self
            .parameters
            .status_id_by_code(STATUS_STUDY_COMPLETED)?
            .ok_or(ScoringServiceError::CompletedStatusMissing)?;

        let record = ScoreRecord {
            result,
            resolution_date: resolved_on,
            status_id,
        };
        self.store.save_score(study_id, &record)?;

        Ok(ScoredStudy {
            study_id: study.id,
            company_id: study.company_id,
            customer_id: study.customer_id,
            result: record.result,
            resolution_date: record.resolution_date,
            status_id: record.status_id,
        })
    }
}

/// Error raised by the scoring service.
#[derive(Debug, thiserror::Error)]
pub enum ScoringServiceError {
    #[error("credit study {} not found in this company", .0 .0)]
    StudyNotFound(StudyId),
    #[error("credit study {} does not belong to company {}", .study.0, .company.0)]
    TenantMismatch { study: StudyId, company: CompanyId },
    #[error("parameter table has no '{STATUS_STUDY_COMPLETED}' status")]
    CompletedStatusMissing,
    #[error(transparent)]
    Store(#[from] StoreError),
}
