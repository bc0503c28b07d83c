//! Scenario runner for batch evaluations
//!
//! Loads the rule table once, then evaluates many input sets against it
//! without re-reading goal CSV files.

use crate::error::{EngineError, Result};
use crate::evaluator::{evaluate, Evaluation};
use crate::inputs::{InputKind, InputSet};
use crate::quarterly::{QuarterlyAggregate, QuarterlyAggregator, QuotaFlags, MONTHS_PER_QUARTER};
use crate::rules::{GoalTables, RuleTable};
use rayon::prelude::*;
use std::ops::RangeInclusive;
use std::path::Path;

/// Pre-loaded scenario runner for batch evaluations
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_csv()?;
///
/// for approvals in [5, 10, 20] {
///     let inputs = runner.defaults("credit-manager-upf")?.with("approvals_month", approvals);
///     let evaluation = runner.run("credit-manager-upf", &inputs)?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    table: RuleTable,
}

/// One point of a sweep over a count input
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SweepPoint {
    pub value: i64,
    pub evaluation: Evaluation,
}

impl ScenarioRunner {
    /// Create runner with the built-in goal tables
    pub fn new() -> Self {
        Self {
            table: RuleTable::builtin(),
        }
    }

    /// Create runner by loading goal tables from CSV files
    pub fn from_csv() -> Result<Self> {
        Ok(Self {
            table: RuleTable::from_csv()?,
        })
    }

    /// Create runner from a specific goals directory
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        Ok(Self {
            table: RuleTable::from_csv_path(path)?,
        })
    }

    /// Create runner around an already loaded rule table
    pub fn with_table(table: RuleTable) -> Self {
        Self { table }
    }

    /// Create runner with pre-built goal tables
    pub fn with_goals(goals: &GoalTables) -> Self {
        Self {
            table: RuleTable::with_goals(goals),
        }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Default input set of a role
    pub fn defaults(&self, role: &str) -> Result<InputSet> {
        Ok(self.table.get(role)?.default_inputs())
    }

    /// Evaluate one input set
    pub fn run(&self, role: &str, inputs: &InputSet) -> Result<Evaluation> {
        evaluate(self.table.get(role)?, inputs)
    }

    /// Evaluate many input sets for one role in parallel, preserving order
    ///
    /// Each entry carries its own result, so one invalid input set does not
    /// abort the rest of the batch.
    pub fn run_batch(&self, role: &str, batch: &[InputSet]) -> Result<Vec<Result<Evaluation>>> {
        let definition = self.table.get(role)?;
        Ok(batch.par_iter().map(|inputs| evaluate(definition, inputs)).collect())
    }

    /// Evaluate a role's defaults with one count input varied over a range
    pub fn sweep(&self, role: &str, key: &str, values: RangeInclusive<i64>) -> Result<Vec<SweepPoint>> {
        let base = self.defaults(role)?;
        self.sweep_from(role, &base, key, values)
    }

    /// Evaluate `base` with one count input varied over a range, in parallel
    pub fn sweep_from(
        &self,
        role: &str,
        base: &InputSet,
        key: &str,
        values: RangeInclusive<i64>,
    ) -> Result<Vec<SweepPoint>> {
        let definition = self.table.get(role)?;
        let spec = definition
            .input(key)
            .ok_or_else(|| EngineError::UnknownInput { key: key.to_string() })?;
        if spec.kind != InputKind::Int {
            return Err(EngineError::KindMismatch {
                key: key.to_string(),
                expected: InputKind::Int.as_str(),
                found: spec.kind.as_str().to_string(),
            });
        }

        let values: Vec<i64> = values.collect();
        log::debug!("{}: sweeping {} over {} values", definition.id, key, values.len());

        values
            .into_par_iter()
            .map(|value| {
                let inputs = base.clone().with(key, value);
                Ok(SweepPoint {
                    value,
                    evaluation: evaluate(definition, &inputs)?,
                })
            })
            .collect()
    }

    /// Aggregate a consultant quarter
    pub fn run_quarter(
        &self,
        role: &str,
        months: &[InputSet; MONTHS_PER_QUARTER],
        flags: QuotaFlags,
    ) -> Result<QuarterlyAggregate> {
        QuarterlyAggregator::new().aggregate(self.table.get(role)?, months, flags)
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}
