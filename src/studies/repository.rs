use crate::domain::{CompanyId, StoreError, StudyId};

use super::domain::{ScoreRecord, StudyRecord};

/// Storage abstraction for credit studies so the scoring service can be
/// exercised in isolation. `fetch` is tenant-scoped; `save_score` is a
/// single keyed write with last-write-wins semantics — concurrent recompute
/// of the same study id is not guaranteed orderable.
pub trait StudyStore: Send + Sync {
    fn fetch(
        &self,
        id: &StudyId,
        company_id: &CompanyId,
    ) -> Result<Option<StudyRecord>, StoreError>;

    fn save_score(&self, id: &StudyId, record: &ScoreRecord) -> Result<(), StoreError>;
}
