//! Daily stress log processing: reconciliation of raw self-reports, missed
//! day detection, imputation for backfills, restore quota bookkeeping and a
//! gated multi-day stress forecast.
//!
//! Every core operation is a synchronous, pure function over its inputs:
//!
//! - [`reconcile`]: one record per calendar date
//! - [`missing_dates`]: days eligible for backfill
//! - [`impute`]: suggested values for a missed day
//! - [`evaluate`]: forecast gating and mode
//! - [`expand`] / [`expand_gated`]: compounding multi-day forecast
//! - [`plan_restore`]: quota-checked backfill entry

pub mod calendar;
pub mod config;
pub mod eligibility;
pub mod forecast;
pub mod gaps;
pub mod impute;
pub mod logging;
pub mod models;
pub mod reconcile;
pub mod report;
pub mod restore;
pub mod risk;
pub mod source;

pub use config::Settings;
pub use eligibility::{evaluate, GateRules, GateVerdict};
pub use forecast::{expand, expand_gated, AdvicePools};
pub use gaps::missing_dates;
pub use impute::{impute, Imputation, ImputedProfile};
pub use models::{
    DayRecord, EligibilitySnapshot, ForecastDay, ForecastMode, Metric, Metrics, RawLogEntry,
    RiskStatus, StressLevel, UpstreamForecast,
};
pub use reconcile::{reconcile, Reconciled};
pub use report::build_report;
pub use restore::{plan_restore, RestoreError, RestoreValues};
