//! Eligibility gates and step-tier conditions

use crate::error::{EngineError, Result};
use crate::inputs::InputSet;
use crate::period::{month_number, Quarter, QUARTER_KEYS, SPANISH_MONTHS};
use serde::Serialize;

/// A goal a metric is compared against
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Goal {
    Fixed(f64),
    /// Goal that depends on the month named by a month-valued input
    ByMonth {
        month_key: &'static str,
        goals: [u32; 12],
    },
    /// Goal that depends on the quarter named by a quarter-valued input
    ByQuarter {
        quarter_key: &'static str,
        goals: [u32; 4],
    },
}

impl Goal {
    pub fn resolve(&self, inputs: &InputSet) -> Result<f64> {
        match self {
            Goal::Fixed(goal) => Ok(*goal),
            Goal::ByMonth { month_key, goals } => {
                let name = inputs.choice(month_key)?;
                let month = month_number(name).ok_or_else(|| EngineError::UnknownChoice {
                    key: month_key.to_string(),
                    value: name.to_string(),
                    allowed: SPANISH_MONTHS.join(", "),
                })?;
                Ok(goals[(month - 1) as usize] as f64)
            }
            Goal::ByQuarter { quarter_key, goals } => {
                let name = inputs.choice(quarter_key)?;
                let quarter: Quarter = name.parse().map_err(|_| EngineError::UnknownChoice {
                    key: quarter_key.to_string(),
                    value: name.to_string(),
                    allowed: QUARTER_KEYS.join(", "),
                })?;
                Ok(goals[quarter.index()] as f64)
            }
        }
    }
}

/// Predicate over a filled input set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Condition {
    Always,
    /// A boolean input must be true
    Flag(&'static str),
    /// Metric >= goal
    AtLeast { key: &'static str, goal: Goal },
    /// Metric strictly greater than a threshold
    Above { key: &'static str, threshold: f64 },
    /// Every condition must hold; any failure fails the whole conjunction
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    pub fn at_least(key: &'static str, goal: f64) -> Self {
        Condition::AtLeast {
            key,
            goal: Goal::Fixed(goal),
        }
    }

    pub fn holds(&self, inputs: &InputSet) -> Result<bool> {
        match self {
            Condition::Always => Ok(true),
            Condition::Flag(key) => inputs.flag(key),
            Condition::AtLeast { key, goal } => Ok(inputs.number(key)? >= goal.resolve(inputs)?),
            Condition::Above { key, threshold } => Ok(inputs.number(key)? > *threshold),
            Condition::All(conditions) => {
                for condition in conditions {
                    if !condition.holds(inputs)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Condition::Any(conditions) => {
                for condition in conditions {
                    if condition.holds(inputs)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    /// Input keys this condition reads, for diagnostics
    pub fn keys(&self) -> Vec<&'static str> {
        match self {
            Condition::Always => Vec::new(),
            Condition::Flag(key) | Condition::Above { key, .. } => vec![*key],
            Condition::AtLeast { key, goal } => {
                let mut keys = vec![*key];
                match goal {
                    Goal::ByMonth { month_key, .. } => keys.push(*month_key),
                    Goal::ByQuarter { quarter_key, .. } => keys.push(*quarter_key),
                    Goal::Fixed(_) => {}
                }
                keys
            }
            Condition::All(conditions) | Condition::Any(conditions) => {
                conditions.iter().flat_map(Condition::keys).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quality_gate() -> Condition {
        Condition::All(vec![
            Condition::at_least("monitoring", 0.95),
            Condition::at_least("sla", 0.90),
            Condition::at_least("notes_productivity", 0.90),
        ])
    }

    #[test]
    fn test_conjunction_has_no_partial_credit() {
        let passing = InputSet::new()
            .with("monitoring", 0.95)
            .with("sla", 0.90)
            .with("notes_productivity", 1.0);
        assert!(quality_gate().holds(&passing).unwrap());

        let one_short = passing.clone().with("sla", 0.89);
        assert!(!quality_gate().holds(&one_short).unwrap());
    }

    #[test]
    fn test_any_and_above_are_strict() {
        let either = Condition::Any(vec![
            Condition::Above { key: "vivecasas", threshold: 60.0 },
            Condition::Above { key: "new", threshold: 140.0 },
        ]);
        let at_threshold = InputSet::new().with("vivecasas", 60).with("new", 140);
        assert!(!either.holds(&at_threshold).unwrap());

        let one_over = at_threshold.with("new", 141);
        assert!(either.holds(&one_over).unwrap());
    }

    #[test]
    fn test_goal_by_month_and_quarter() {
        let mut month_goals = [0u32; 12];
        month_goals[2] = 338;
        let by_month = Goal::ByMonth { month_key: "month", goals: month_goals };
        let march = InputSet::new().with("month", "Marzo");
        assert_eq!(by_month.resolve(&march).unwrap(), 338.0);

        let by_quarter = Goal::ByQuarter { quarter_key: "quarter", goals: [405, 440, 500, 575] };
        let q3 = InputSet::new().with("quarter", "Q3");
        assert_eq!(by_quarter.resolve(&q3).unwrap(), 500.0);

        let unknown = InputSet::new().with("month", "Thermidor");
        assert!(matches!(by_month.resolve(&unknown), Err(EngineError::UnknownChoice { .. })));
    }

    #[test]
    fn test_flag_and_missing_key() {
        let gate = Condition::Flag("guarantee");
        assert!(gate.holds(&InputSet::new().with("guarantee", true)).unwrap());
        assert!(!gate.holds(&InputSet::new().with("guarantee", false)).unwrap());
        assert!(matches!(gate.holds(&InputSet::new()), Err(EngineError::MissingInput { .. })));
        assert!(Condition::Always.holds(&InputSet::new()).unwrap());
    }

    #[test]
    fn test_keys() {
        assert_eq!(quality_gate().keys(), vec!["monitoring", "sla", "notes_productivity"]);
    }
}
