//! In-memory payroll history with role, person and period filtering

use super::record::{AmountColumn, PayrollRecord};
use crate::error::{EngineError, Result};
use crate::period::CalendarMonth;
use serde::Serialize;
use std::collections::BTreeSet;

/// A distinct period label and its parsed month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodLabel {
    pub label: String,
    pub month: Option<CalendarMonth>,
}

impl PeriodLabel {
    fn sort_key(&self) -> (bool, Option<CalendarMonth>, &str) {
        (self.month.is_none(), self.month, &self.label)
    }
}

/// Filter for one person's records within a role
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    pub role: String,
    pub person: String,
    /// Inclusive period label range; `None` selects every period
    pub range: Option<(String, String)>,
}

impl HistoryQuery {
    pub fn new(role: impl Into<String>, person: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            person: person.into(),
            range: None,
        }
    }

    pub fn between(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.range = Some((start.into(), end.into()));
        self
    }
}

/// Loaded payroll history
#[derive(Debug, Clone, Default)]
pub struct PayrollHistory {
    records: Vec<PayrollRecord>,
    columns: Vec<AmountColumn>,
}

impl PayrollHistory {
    pub fn new(records: Vec<PayrollRecord>, columns: Vec<AmountColumn>) -> Self {
        Self { records, columns }
    }

    pub fn records(&self) -> &[PayrollRecord] {
        &self.records
    }

    /// Optional amount columns present in the source, in canonical order
    pub fn columns(&self) -> &[AmountColumn] {
        &self.columns
    }

    /// Distinct roles, sorted
    pub fn roles(&self) -> Vec<&str> {
        let roles: BTreeSet<&str> = self
            .records
            .iter()
            .map(|r| r.role.as_str())
            .filter(|r| !r.is_empty())
            .collect();
        roles.into_iter().collect()
    }

    /// Distinct people holding a role, sorted
    pub fn people(&self, role: &str) -> Vec<&str> {
        let people: BTreeSet<&str> = self
            .records
            .iter()
            .filter(|r| r.role == role)
            .map(|r| r.person.as_str())
            .filter(|p| !p.is_empty())
            .collect();
        people.into_iter().collect()
    }

    /// Distinct periods of a person in a role, by month with unparseable labels last
    pub fn periods(&self, role: &str, person: &str) -> Vec<PeriodLabel> {
        let mut periods: Vec<PeriodLabel> = Vec::new();
        for record in self.records.iter().filter(|r| r.role == role && r.person == person) {
            let label = PeriodLabel {
                label: record.period.clone(),
                month: record.period_month,
            };
            if !periods.contains(&label) {
                periods.push(label);
            }
        }
        periods.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        periods
    }

    /// Records matching a query, in period order
    ///
    /// When both range endpoints parse as months the range filters by month;
    /// otherwise it selects the labels between the endpoints in period order.
    pub fn select(&self, query: &HistoryQuery) -> Result<Vec<&PayrollRecord>> {
        let mut selected: Vec<&PayrollRecord> = self
            .records
            .iter()
            .filter(|r| r.role == query.role && r.person == query.person)
            .collect();

        if let Some((start, end)) = &query.range {
            let periods = self.periods(&query.role, &query.person);
            let position = |label: &str| {
                periods
                    .iter()
                    .position(|p| p.label == label)
                    .ok_or_else(|| EngineError::UnknownPeriod(label.to_string()))
            };
            let (start_idx, end_idx) = (position(start)?, position(end)?);
            let (lo, hi) = (start_idx.min(end_idx), start_idx.max(end_idx));

            match (periods[lo].month, periods[hi].month) {
                (Some(from), Some(to)) => {
                    selected.retain(|r| r.period_month.is_some_and(|m| m >= from && m <= to));
                }
                _ => {
                    let labels: Vec<&str> = periods[lo..=hi].iter().map(|p| p.label.as_str()).collect();
                    log::debug!("period range {}..{} has unparsed labels, filtering by label", start, end);
                    selected.retain(|r| labels.contains(&r.period.as_str()));
                }
            }
        }

        selected.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        Ok(selected)
    }
}
