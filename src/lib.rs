//! Incentive Engine - variable compensation rule engine for real-estate services roles
//!
//! This library provides:
//! - A data-driven rule table: per-role input schema, eligibility gate and payout lines
//! - Rule evaluation with gate zeroing policies (all variable lines or disbursement only)
//! - Tiered-percentage consultant plans with quarterly point bonuses
//! - Period label parsing shared with the historical payroll reports
//! - Batch and sweep evaluation over a pre-loaded rule table

pub mod currency;
pub mod error;
pub mod evaluator;
pub mod history;
pub mod inputs;
pub mod payout;
pub mod period;
pub mod quarterly;
pub mod rules;
pub mod scenario;

// Re-export commonly used types
pub use currency::Currency;
pub use error::{EngineError, Result};
pub use evaluator::{evaluate, Evaluation, Evaluator};
pub use inputs::{InputKind, InputSet, InputSpec, InputValue};
pub use payout::{LineKind, PayoutLine, PayoutResult};
pub use period::{parse_period, CalendarMonth, Quarter};
pub use quarterly::{QuarterlyAggregate, QuarterlyAggregator, QuotaFlags};
pub use rules::{GateScope, GoalTables, RoleDefinition, RuleTable};
pub use scenario::ScenarioRunner;
