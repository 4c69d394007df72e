//! Multi-tenant credit back-office core: a pure credit-scoring engine over
//! financial-statement inputs, and subscription-gated dashboard analytics.
//!
//! Persistence, authentication, and billing are external collaborators
//! reached through the store traits in `studies::repository`,
//! `dashboard::repository`, `dashboard::access`, and `parameters`.

pub mod config;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod parameters;
pub mod studies;
pub mod telemetry;
