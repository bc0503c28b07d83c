//! Core evaluation of one role against one filled input set

use super::gating::apply_gate;
use crate::currency::Currency;
use crate::error::Result;
use crate::inputs::InputSet;
use crate::payout::PayoutResult;
use crate::rules::{RoleDefinition, RuleTable};
use serde::Serialize;

/// Outcome of evaluating one role
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub role_id: &'static str,
    pub title: &'static str,
    pub currency: Currency,
    /// Whether the eligibility gate held
    pub eligible: bool,
    pub result: PayoutResult,
}

impl Evaluation {
    pub fn total(&self) -> f64 {
        self.result.total()
    }
}

/// Evaluate a role definition against an input set
///
/// Inputs are validated first and any error aborts the evaluation. Raw lines are
/// always computed, then the gate's zeroing policy is applied and the total taken.
pub fn evaluate(role: &RoleDefinition, inputs: &InputSet) -> Result<Evaluation> {
    role.validate(inputs)?;

    let eligible = role.gate.holds(inputs)?;
    let raw = role.formula.compute(inputs)?;
    log::debug!(
        "{}: gate {} ({} raw lines)",
        role.id,
        if eligible { "passed" } else { "failed" },
        raw.len()
    );

    let result = PayoutResult::from_lines(apply_gate(role.gate_scope, eligible, raw));
    log::debug!("{}: total {}", role.id, result.total());

    Ok(Evaluation {
        role_id: role.id,
        title: role.title,
        currency: role.currency,
        eligible,
        result,
    })
}

/// Evaluator bound to a loaded rule table
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    table: &'a RuleTable,
}

impl<'a> Evaluator<'a> {
    pub fn new(table: &'a RuleTable) -> Self {
        Self { table }
    }

    /// Evaluate a role looked up by id or title
    pub fn evaluate(&self, role: &str, inputs: &InputSet) -> Result<Evaluation> {
        evaluate(self.table.get(role)?, inputs)
    }

    pub fn table(&self) -> &'a RuleTable {
        self.table
    }
}
