//! Historical payroll: loading, filtering and per-period reporting

mod record;
pub mod loader;
mod report;
mod table;

pub use record::{
    AmountColumn, PayAmounts, PayrollRecord, EMPLOYER_COLUMN, PERIOD_COLUMN, PERSON_COLUMN, REQUIRED_COLUMNS,
    ROLE_COLUMN,
};
pub use loader::{load_default_history, load_history, load_history_from_reader, DEFAULT_HISTORY_PATH};
pub use report::{summary_by_period, totals, write_csv, write_summary_csv, PeriodSummary};
pub use table::{HistoryQuery, PayrollHistory, PeriodLabel};
