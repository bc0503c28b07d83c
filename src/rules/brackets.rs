//! Bracket tables: unit-count or point ranges mapped to a rate or payout

use crate::error::{EngineError, Result};
use serde::Serialize;

/// Upper bound sentinel for the open-ended last bracket
pub const UNBOUNDED: u64 = u64::MAX;

/// A closed range `[low, high]` paying `rate`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bracket {
    pub low: u64,
    pub high: u64,
    pub rate: f64,
}

impl Bracket {
    pub const fn new(low: u64, high: u64, rate: f64) -> Self {
        Self { low, high, rate }
    }

    pub fn contains(&self, n: u64) -> bool {
        self.low <= n && n <= self.high
    }
}

/// Ordered, non-overlapping brackets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BracketTable {
    brackets: Vec<Bracket>,
}

impl BracketTable {
    /// Build from brackets already in ascending order
    pub fn from_sorted(brackets: &[Bracket]) -> Self {
        Self {
            brackets: brackets.to_vec(),
        }
    }

    /// Build and validate
    pub fn new(brackets: Vec<Bracket>) -> Result<Self> {
        let table = Self { brackets };
        table.validate()?;
        Ok(table)
    }

    /// Check ordering, overlap and the starting point of the table
    pub fn validate(&self) -> Result<()> {
        let first = self
            .brackets
            .first()
            .ok_or_else(|| EngineError::InvalidBrackets("table is empty".to_string()))?;
        if first.low == 0 {
            return Err(EngineError::InvalidBrackets(
                "ranges start at 1; a count of 0 always pays 0".to_string(),
            ));
        }
        for bracket in &self.brackets {
            if bracket.low > bracket.high {
                return Err(EngineError::InvalidBrackets(format!(
                    "range [{}, {}] is inverted",
                    bracket.low, bracket.high
                )));
            }
        }
        for pair in self.brackets.windows(2) {
            if pair[1].low <= pair[0].high {
                return Err(EngineError::InvalidBrackets(format!(
                    "range starting at {} overlaps range ending at {}",
                    pair[1].low, pair[0].high
                )));
            }
        }
        Ok(())
    }

    /// Rate of the bracket containing `n`, or 0 when none does
    pub fn lookup(&self, n: u64) -> f64 {
        self.brackets
            .iter()
            .find(|bracket| bracket.contains(n))
            .map(|bracket| bracket.rate)
            .unwrap_or(0.0)
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    /// Whether the last bracket catches unbounded counts
    pub fn is_open_ended(&self) -> bool {
        self.brackets.last().map_or(false, |b| b.high == UNBOUNDED)
    }
}
