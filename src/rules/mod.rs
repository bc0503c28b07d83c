//! Compensation rule table: role definitions, gates, payout formulas and goal tables

mod brackets;
mod catalog;
mod condition;
pub mod consultant;
mod goals;
pub mod loader;

pub use brackets::{Bracket, BracketTable, UNBOUNDED};
pub use condition::{Condition, Goal};
pub use consultant::{ConsultantMonth, ConsultantPlan, ConsultantTier};
pub use goals::GoalTables;

use crate::currency::Currency;
use crate::error::{EngineError, Result};
use crate::inputs::{self, InputSet, InputSpec};
use crate::payout::{LineKind, PayoutLine};
use serde::Serialize;
use std::path::Path;

/// Environment variable naming a goals directory
pub const GOALS_DIR_ENV: &str = "INCENTIVE_GOALS_DIR";

/// Which payout lines a failed gate zeroes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GateScope {
    /// Every non-fixed line
    All,
    /// Only the disbursement commission line
    DisbursementOnly,
}

/// Formula for a single payout line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Formula {
    /// `max(units - minimum_free_units, 0) x unit_rate`
    Excess {
        units_key: &'static str,
        minimum_free_units: u64,
        unit_rate: f64,
    },
    /// Sum of `units x rate` over several count inputs
    Weighted(Vec<(&'static str, f64)>),
    /// Constant amount
    Flat(f64),
    /// First tier whose condition holds pays its amount, otherwise 0
    Step(Vec<(Condition, f64)>),
}

impl Formula {
    pub fn compute(&self, inputs: &InputSet) -> Result<f64> {
        match self {
            Formula::Excess {
                units_key,
                minimum_free_units,
                unit_rate,
            } => {
                let units = inputs.count(units_key)?;
                Ok(units.saturating_sub(*minimum_free_units) as f64 * unit_rate)
            }
            Formula::Weighted(terms) => {
                let mut amount = 0.0;
                for (key, rate) in terms {
                    amount += inputs.count(key)? as f64 * rate;
                }
                Ok(amount)
            }
            Formula::Flat(amount) => Ok(*amount),
            Formula::Step(tiers) => {
                for (condition, amount) in tiers {
                    if condition.holds(inputs)? {
                        return Ok(*amount);
                    }
                }
                Ok(0.0)
            }
        }
    }
}

/// A named payout line and the formula producing it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineRule {
    pub name: &'static str,
    pub kind: LineKind,
    pub formula: Formula,
}

impl LineRule {
    pub fn new(name: &'static str, kind: LineKind, formula: Formula) -> Self {
        Self { name, kind, formula }
    }

    pub fn variable(name: &'static str, formula: Formula) -> Self {
        Self::new(name, LineKind::Variable, formula)
    }
}

/// Payout formula of a role, selected by discriminant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PayoutFormula {
    /// Threshold, per-unit and step-goal lines
    Lines(Vec<LineRule>),
    /// Tiered-percentage consultant month
    Consultant(ConsultantPlan),
}

impl PayoutFormula {
    /// Raw payout lines, before any gating
    pub fn compute(&self, inputs: &InputSet) -> Result<Vec<PayoutLine>> {
        match self {
            PayoutFormula::Lines(rules) => rules
                .iter()
                .map(|rule| {
                    let amount = rule.formula.compute(inputs)?;
                    Ok(PayoutLine::new(rule.name, rule.kind, amount))
                })
                .collect(),
            PayoutFormula::Consultant(plan) => Ok(plan.month(inputs)?.lines()),
        }
    }
}

/// Immutable compensation rules for one job role
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleDefinition {
    /// Stable lookup key
    pub id: &'static str,
    /// Display title
    pub title: &'static str,
    pub currency: Currency,
    pub inputs: Vec<InputSpec>,
    pub gate: Condition,
    pub gate_scope: GateScope,
    pub formula: PayoutFormula,
}

impl RoleDefinition {
    /// Input set pre-populated with this role's defaults
    pub fn default_inputs(&self) -> InputSet {
        InputSet::defaults(&self.inputs)
    }

    /// Check an input set covers this role's schema with in-domain values
    pub fn validate(&self, inputs: &InputSet) -> Result<()> {
        inputs::validate(&self.inputs, inputs)
    }

    pub fn input(&self, key: &str) -> Option<&InputSpec> {
        self.inputs.iter().find(|spec| spec.key == key)
    }

    pub fn consultant_plan(&self) -> Option<&ConsultantPlan> {
        match &self.formula {
            PayoutFormula::Consultant(plan) => Some(plan),
            PayoutFormula::Lines(_) => None,
        }
    }

    /// Whether the title or id matches, ignoring case
    pub fn matches(&self, name: &str) -> bool {
        let name = name.trim();
        self.id.eq_ignore_ascii_case(name) || self.title.to_lowercase() == name.to_lowercase()
    }
}

/// Registry of every role, read-only after construction
#[derive(Debug, Clone)]
pub struct RuleTable {
    roles: Vec<RoleDefinition>,
}

impl RuleTable {
    /// Built-in catalog with the default goal tables
    pub fn builtin() -> Self {
        Self::with_goals(&GoalTables::default())
    }

    /// Built-in catalog with custom goal tables
    pub fn with_goals(goals: &GoalTables) -> Self {
        Self {
            roles: catalog::roles(goals),
        }
    }

    /// Load goal tables from CSV files in the default location (data/goals/)
    pub fn from_csv() -> Result<Self> {
        Self::from_csv_path(Path::new(loader::DEFAULT_GOALS_PATH))
    }

    /// Load goal tables from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        Ok(Self::with_goals(&GoalTables::load_from(path)?))
    }

    /// Load the table from `dir`, else from the directory named by
    /// `INCENTIVE_GOALS_DIR`, else from data/goals/ when present, else built-in goals
    pub fn load_configured(dir: Option<&Path>) -> Result<Self> {
        if let Some(dir) = dir {
            return Self::from_csv_path(dir);
        }
        if let Ok(dir) = std::env::var(GOALS_DIR_ENV) {
            return Self::from_csv_path(Path::new(&dir));
        }
        let default_dir = Path::new(loader::DEFAULT_GOALS_PATH);
        if default_dir.is_dir() {
            return Self::from_csv_path(default_dir);
        }
        log::info!("No goals directory found, using built-in goal tables");
        Ok(Self::builtin())
    }

    /// Find a role by id or title
    pub fn get(&self, name: &str) -> Result<&RoleDefinition> {
        self.roles
            .iter()
            .find(|role| role.matches(name))
            .ok_or_else(|| EngineError::UnknownRole(name.to_string()))
    }

    pub fn roles(&self) -> &[RoleDefinition] {
        &self.roles
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.roles.iter().map(|role| role.id)
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_excess_formula() {
        let formula = Formula::Excess {
            units_key: "approvals",
            minimum_free_units: 4,
            unit_rate: 125_000.0,
        };
        let at = |n: i64| formula.compute(&InputSet::new().with("approvals", n)).unwrap();
        assert_eq!(at(0), 0.0);
        assert_eq!(at(4), 0.0);
        assert_eq!(at(5), 125_000.0);
        assert_eq!(at(10), 750_000.0);
    }

    #[test]
    fn test_weighted_and_step_formulas() {
        let weighted = Formula::Weighted(vec![("t1", 30_000.0), ("t2", 50_000.0)]);
        let inputs = InputSet::new().with("t1", 2).with("t2", 3);
        assert_eq!(weighted.compute(&inputs).unwrap(), 210_000.0);

        let step = Formula::Step(vec![
            (Condition::at_least("n", 100.0), 2_000_000.0),
            (Condition::at_least("n", 95.0), 1_250_000.0),
        ]);
        assert_eq!(step.compute(&InputSet::new().with("n", 100)).unwrap(), 2_000_000.0);
        assert_eq!(step.compute(&InputSet::new().with("n", 97)).unwrap(), 1_250_000.0);
        assert_eq!(step.compute(&InputSet::new().with("n", 94)).unwrap(), 0.0);
    }

    #[test]
    fn test_role_lookup() {
        let table = RuleTable::builtin();
        assert_eq!(table.get("credit-manager-upf").unwrap().id, "credit-manager-upf");
        assert_eq!(table.get("CREDIT-MANAGER-UPF").unwrap().id, "credit-manager-upf");
        assert_eq!(table.get("Credit Manager - UPF").unwrap().id, "credit-manager-upf");
        assert!(matches!(table.get("ceo"), Err(EngineError::UnknownRole(_))));
    }

    #[test]
    fn test_catalog_invariants() {
        let table = RuleTable::builtin();
        let ids: HashSet<_> = table.ids().collect();
        assert_eq!(ids.len(), table.roles().len(), "role ids must be unique");

        for role in table.roles() {
            let keys: HashSet<_> = role.inputs.iter().map(|spec| spec.key).collect();
            assert_eq!(keys.len(), role.inputs.len(), "{} has duplicate input keys", role.id);

            // Defaults must satisfy the role's own schema
            assert!(role.validate(&role.default_inputs()).is_ok(), "{} defaults invalid", role.id);

            // Every key a gate reads must be declared
            for key in role.gate.keys() {
                assert!(role.input(key).is_some(), "{} gate reads undeclared {}", role.id, key);
            }
        }
    }

    #[test]
    fn test_consultant_roles_carry_plans() {
        let table = RuleTable::builtin();
        let consultants: Vec<_> = table
            .roles()
            .iter()
            .filter_map(|role| role.consultant_plan())
            .map(|plan| plan.tier)
            .collect();
        assert_eq!(consultants, ConsultantTier::ALL.to_vec());
        assert!(table.get("credit-analyst-2").unwrap().consultant_plan().is_none());
    }

    #[test]
    fn test_from_csv_matches_builtin_goals() {
        let loaded = RuleTable::from_csv().unwrap();
        let builtin = RuleTable::builtin();
        assert_eq!(loaded.roles(), builtin.roles());
    }
}
