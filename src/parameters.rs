//! Boundary contract for the shared parameter (lookup) table.
//!
//! Statuses, person types, economic activities, and income-statement periods
//! are all rows of one external lookup store. The core only ever resolves
//! ids to labels, codes to ids, and period labels to month counts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{ParameterId, StoreError};

/// Code of the status a study receives once its score has been computed.
/// Its absence from the parameter table is a configuration error.
pub const STATUS_STUDY_COMPLETED: &str = "estudioRealizado";

/// Resolver over the external parameter table.
pub trait ParameterResolver: Send + Sync {
    fn parameter_label(&self, id: ParameterId) -> Result<Option<String>, StoreError>;
    fn status_id_by_code(&self, code: &str) -> Result<Option<ParameterId>, StoreError>;
    /// Batch label lookup; ids missing from the table are simply absent from
    /// the returned map.
    fn labels_for(&self, ids: &[ParameterId]) -> Result<BTreeMap<ParameterId, String>, StoreError>;
}

/// Reporting period of a study's income statement. The raw value is a
/// free-text parameter label; unknown labels resolve to `Anual`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomeStatementPeriod {
    Mensual,
    Trimestral,
    Semestral,
    Anual,
}

impl IncomeStatementPeriod {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Mensual" => Self::Mensual,
            "Trimestral" => Self::Trimestral,
            "Semestral" => Self::Semestral,
            _ => Self::Anual,
        }
    }

    pub const fn months(self) -> u32 {
        match self {
            Self::Mensual => 1,
            Self::Trimestral => 3,
            Self::Semestral => 6,
            Self::Anual => 12,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Mensual => "Mensual",
            Self::Trimestral => "Trimestral",
            Self::Semestral => "Semestral",
            Self::Anual => "Anual",
        }
    }
}
