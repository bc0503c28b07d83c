//! CSV-based goal table loader
//!
//! Loads goal tables from CSV files in data/goals/

use super::goals::GoalTables;
use crate::error::{EngineError, Result};
use crate::period::{month_number, Quarter};
use std::fs::File;
use std::path::Path;

/// Default path to goals directory
pub const DEFAULT_GOALS_PATH: &str = "data/goals";

fn invalid(table: &str, reason: impl Into<String>) -> EngineError {
    EngineError::InvalidGoals {
        table: table.to_string(),
        reason: reason.into(),
    }
}

fn parse_goal(table: &str, raw: &str) -> Result<u32> {
    raw.trim()
        .parse()
        .map_err(|_| invalid(table, format!("goal `{}` is not a whole number", raw)))
}

/// Load monthly disbursement goals from CSV
/// Columns: month name (English or Spanish), full goal, reduced goal
pub fn load_disbursement_goals(path: &Path) -> Result<([u32; 12], [u32; 12])> {
    const TABLE: &str = "disbursement_goals.csv";
    let file = File::open(path.join(TABLE))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut full = [None; 12];
    let mut reduced = [None; 12];

    for result in reader.records() {
        let record = result?;
        let name = record.get(0).unwrap_or_default();
        let month = month_number(name).ok_or_else(|| invalid(TABLE, format!("unknown month `{}`", name)))?;
        let idx = (month - 1) as usize;
        full[idx] = Some(parse_goal(TABLE, record.get(1).unwrap_or_default())?);
        reduced[idx] = Some(parse_goal(TABLE, record.get(2).unwrap_or_default())?);
    }

    Ok((complete(TABLE, full)?, complete(TABLE, reduced)?))
}

/// Load quarterly goals with `C` goal columns after the quarter key
fn load_quarter_columns<const C: usize>(path: &Path, table: &str) -> Result<[[u32; 4]; C]> {
    let file = File::open(path.join(table))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut columns = [[None; 4]; C];

    for result in reader.records() {
        let record = result?;
        let key = record.get(0).unwrap_or_default();
        let quarter: Quarter = key.parse().map_err(|e: String| invalid(table, e))?;
        for (c, column) in columns.iter_mut().enumerate() {
            column[quarter.index()] = Some(parse_goal(table, record.get(c + 1).unwrap_or_default())?);
        }
    }

    let mut out = [[0; 4]; C];
    for (c, column) in columns.into_iter().enumerate() {
        out[c] = complete(table, column)?;
    }
    Ok(out)
}

fn complete<const N: usize>(table: &str, slots: [Option<u32>; N]) -> Result<[u32; N]> {
    let mut goals = [0; N];
    for (idx, slot) in slots.iter().enumerate() {
        goals[idx] = slot.ok_or_else(|| invalid(table, format!("no goal for period {}", idx + 1)))?;
    }
    Ok(goals)
}

/// Load analysis approval goals from CSV
/// Columns: quarter (Q1-Q4), full goal, reduced goal
pub fn load_analysis_goals(path: &Path) -> Result<([u32; 4], [u32; 4])> {
    let [full, reduced] = load_quarter_columns::<2>(path, "analysis_goals.csv")?;
    Ok((full, reduced))
}

/// Load the agreements lead's quarterly approval goals from CSV
/// Columns: quarter (Q1-Q4), goal
pub fn load_agreements_goals(path: &Path) -> Result<[u32; 4]> {
    let [goals] = load_quarter_columns::<1>(path, "agreements_goals.csv")?;
    Ok(goals)
}

impl GoalTables {
    /// Load all goal tables from the default path
    pub fn load_default() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_GOALS_PATH))
    }

    /// Load all goal tables from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let (disbursement_full, disbursement_reduced) = load_disbursement_goals(path)?;
        let (analysis_full, analysis_reduced) = load_analysis_goals(path)?;
        let goals = Self {
            disbursement_full,
            disbursement_reduced,
            analysis_full,
            analysis_reduced,
            agreements_quarter: load_agreements_goals(path)?,
        };
        if !goals.is_consistent() {
            return Err(invalid(
                &path.display().to_string(),
                "a reduced goal exceeds its full goal",
            ));
        }
        log::info!("Loaded goal tables from {}", path.display());
        Ok(goals)
    }
}
