use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::{CompanyId, StoreError};

/// Dashboard access level carried by a tenant's current subscription.
/// Unknown plan codes resolve to `Basic`, which the gate rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    Basic,
    Advanced,
    Premium,
}

impl SubscriptionTier {
    pub fn from_code(code: &str) -> Self {
        match code {
            "advanced" => Self::Advanced,
            "premium" => Self::Premium,
            _ => Self::Basic,
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Advanced => "advanced",
            Self::Premium => "premium",
        }
    }

    pub const fn allows_advanced_dashboard(self) -> bool {
        matches!(self, Self::Advanced | Self::Premium)
    }
}

/// Resolver of a tenant's current subscription tier. The store guarantees
/// at most one current subscription per tenant; the core only reads the
/// resolved tier. `None` means the tenant has no subscription record.
pub trait SubscriptionDirectory: Send + Sync {
    fn current_tier(&self, company_id: &CompanyId)
        -> Result<Option<SubscriptionTier>, StoreError>;
}

/// Policy gate in front of the advanced dashboard. Runs before any advanced
/// aggregate query is issued.
pub struct AccessGate<B> {
    subscriptions: Arc<B>,
}

impl<B> AccessGate<B>
where
    B: SubscriptionDirectory,
{
    pub fn new(subscriptions: Arc<B>) -> Self {
        Self { subscriptions }
    }

    pub fn authorize(&self, company_id: &CompanyId) -> Result<SubscriptionTier, AccessDenied> {
        match self.subscriptions.current_tier(company_id)? {
            None => Err(AccessDenied::SubscriptionNotFound(company_id.clone())),
            Some(tier) if tier.allows_advanced_dashboard() => Ok(tier),
            Some(tier) => Err(AccessDenied::AdvancedTierRequired(tier)),
        }
    }
}

/// Denial raised by the access gate.
#[derive(Debug, thiserror::Error)]
pub enum AccessDenied {
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
