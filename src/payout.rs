//! Payout output structures

use serde::{Deserialize, Serialize};

/// How a payout line reacts to a failed eligibility gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineKind {
    /// Guaranteed component, never zeroed by a gate
    Fixed,
    /// Variable component, zeroed whenever the gate fails
    Variable,
    /// Variable disbursement commission; the only line zeroed under a
    /// disbursement-only gate scope
    Disbursement,
}

impl LineKind {
    pub fn is_fixed(&self) -> bool {
        matches!(self, LineKind::Fixed)
    }
}

/// One named payout amount, in the role's currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutLine {
    pub name: String,
    pub kind: LineKind,
    pub amount: f64,
}

impl PayoutLine {
    pub fn new(name: impl Into<String>, kind: LineKind, amount: f64) -> Self {
        Self {
            name: name.into(),
            kind,
            amount,
        }
    }

    pub fn variable(name: impl Into<String>, amount: f64) -> Self {
        Self::new(name, LineKind::Variable, amount)
    }

    pub fn zeroed(mut self) -> Self {
        self.amount = 0.0;
        self
    }
}

/// Payout lines plus their total
///
/// The total is computed once at construction and the lines cannot be
/// mutated afterwards, so it always equals the sum of the lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayoutResult {
    lines: Vec<PayoutLine>,
    total: f64,
}

impl PayoutResult {
    pub fn from_lines(lines: Vec<PayoutLine>) -> Self {
        let total = lines.iter().map(|line| line.amount).sum();
        Self { lines, total }
    }

    pub fn lines(&self) -> &[PayoutLine] {
        &self.lines
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Amount of a line by name
    pub fn amount(&self, name: &str) -> Option<f64> {
        self.lines
            .iter()
            .find(|line| line.name == name)
            .map(|line| line.amount)
    }

    /// Sum of the guaranteed lines only
    pub fn fixed_total(&self) -> f64 {
        self.lines
            .iter()
            .filter(|line| line.kind.is_fixed())
            .map(|line| line.amount)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_total_is_sum_of_lines() {
        let result = PayoutResult::from_lines(vec![
            PayoutLine::new("Fixed monthly", LineKind::Fixed, 10_000_000.0),
            PayoutLine::variable("Monthly variable", 1_250_000.0),
            PayoutLine::new("Disbursement commission", LineKind::Disbursement, 375_000.0),
        ]);

        assert_relative_eq!(result.total(), 11_625_000.0);
        assert_relative_eq!(result.fixed_total(), 10_000_000.0);
        assert_eq!(result.amount("Monthly variable"), Some(1_250_000.0));
        assert_eq!(result.amount("Missing"), None);
    }

    #[test]
    fn test_empty_result_totals_zero() {
        let result = PayoutResult::from_lines(Vec::new());
        assert_eq!(result.total(), 0.0);
        assert!(result.lines().is_empty());
    }

    #[test]
    fn test_serialized_result_carries_total() {
        let result = PayoutResult::from_lines(vec![PayoutLine::variable("Monthly commission", 500.0)]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["total"], 500.0);
        assert_eq!(json["lines"][0]["kind"], "Variable");
    }
}
