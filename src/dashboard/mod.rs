//! Tenant dashboards: KPI aggregation, month-bucketed trends, and the
//! subscription-tier gate over the advanced analytics.

pub mod access;
pub mod domain;
pub mod months;
pub mod repository;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use access::{AccessDenied, AccessGate, SubscriptionDirectory, SubscriptionTier};
pub use domain::{DashboardFilter, DateWindow, StabilityBand};
pub use months::{fill, month_key, MonthBucket};
pub use repository::{
    CreditAggregates, CustomerAnalytics, DebtStructureAverages, FinancialIndicatorAverages,
    ProfileDirectory, RecentStudyRow, RevenueNetIncomeRow, StudyAnalytics, TopCustomerRow,
    TurnoverAverages,
};
pub use router::dashboard_router;
pub use service::{DashboardError, DashboardService, UNKNOWN_LABEL};
pub use views::{AdvancedDashboard, BasicDashboard};
