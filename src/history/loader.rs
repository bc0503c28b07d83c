//! Load payroll history from CSV exports

use super::record::{AmountColumn, PayAmounts, PayrollRecord, REQUIRED_COLUMNS};
use super::PayrollHistory;
use crate::error::{EngineError, Result};
use crate::period::parse_period;
use csv::{ReaderBuilder, Trim};
use std::collections::HashSet;
use std::path::Path;

/// Default location of the payroll history export
pub const DEFAULT_HISTORY_PATH: &str = "data/history.csv";

/// Raw CSV row; identifying columns are required, amount columns optional
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Periodo")]
    period: String,
    #[serde(rename = "Empleador")]
    employer: String,
    #[serde(rename = "Nick Name")]
    person: String,
    #[serde(rename = "Cargo")]
    role: String,
    #[serde(rename = "Total Salario Basico USD", default)]
    basic_salary: Option<String>,
    #[serde(rename = "Total PPSS Salario Basico USD", default)]
    basic_salary_ppss: Option<String>,
    #[serde(rename = "Total Prestaciones Sociales USD", default)]
    social_benefits: Option<String>,
    #[serde(rename = "Total Comisiones Vivecasa USD", default)]
    vivecasa_commissions: Option<String>,
    #[serde(rename = "Total Comisiones Viveprestamo USD", default)]
    viveprestamo_commissions: Option<String>,
    #[serde(rename = "Total Bonos y Premios USD", default)]
    bonuses: Option<String>,
    #[serde(rename = "Total Total Nomina USD", default)]
    total_payroll: Option<String>,
    #[serde(rename = "Total Activos", default)]
    total_assets: Option<String>,
}

impl CsvRow {
    fn raw(&self, column: AmountColumn) -> Option<&str> {
        let cell = match column {
            AmountColumn::BasicSalary => &self.basic_salary,
            AmountColumn::BasicSalaryPpss => &self.basic_salary_ppss,
            AmountColumn::SocialBenefits => &self.social_benefits,
            AmountColumn::VivecasaCommissions => &self.vivecasa_commissions,
            AmountColumn::ViveprestamoCommissions => &self.viveprestamo_commissions,
            AmountColumn::Bonuses => &self.bonuses,
            AmountColumn::TotalPayroll => &self.total_payroll,
            AmountColumn::TotalAssets => &self.total_assets,
        };
        cell.as_deref()
    }

    fn to_record(self, line: u64) -> PayrollRecord {
        let mut amounts = PayAmounts::default();
        for column in AmountColumn::ALL.into_iter().filter(AmountColumn::is_pay) {
            amounts.set(column, clean_amount(self.raw(column), column, line));
        }
        let total_assets = clean_amount(self.raw(AmountColumn::TotalAssets), AmountColumn::TotalAssets, line);

        let period_month = parse_period(&self.period);
        PayrollRecord {
            period: self.period,
            period_month,
            employer: self.employer,
            person: self.person,
            role: self.role,
            total_assets,
            amounts,
        }
    }
}

/// Parse a money cell, dropping `$`, thousands separators and whitespace
///
/// Blank cells are 0. Cells that still fail to parse are logged and read as 0.
pub fn clean_amount(raw: Option<&str>, column: AmountColumn, line: u64) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("nan") {
        return 0.0;
    }
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            log::warn!("line {}: `{}` value {:?} is not a number, using 0", line, column.header(), raw);
            0.0
        }
    }
}

fn check_required(headers: &csv::StringRecord) -> Result<Vec<AmountColumn>> {
    let present: HashSet<&str> = headers.iter().collect();
    if let Some(missing) = REQUIRED_COLUMNS.iter().find(|column| !present.contains(*column)) {
        return Err(EngineError::MissingColumn(missing.to_string()));
    }
    Ok(AmountColumn::ALL
        .into_iter()
        .filter(|column| present.contains(column.header()))
        .collect())
}

/// Load payroll history from any reader (e.g., string buffer, network stream)
pub fn load_history_from_reader<R: std::io::Read>(reader: R) -> Result<PayrollHistory> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).flexible(true).from_reader(reader);
    let columns = check_required(csv_reader.headers()?)?;

    let mut records = Vec::new();
    let mut unparsed = HashSet::new();
    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        let line = records.len() as u64 + 2;
        let record = row.to_record(line);
        if record.period_month.is_none() && unparsed.insert(record.period.clone()) {
            log::warn!("period label {:?} is not a recognised month, ordering by label", record.period);
        }
        records.push(record);
    }

    log::info!(
        "Loaded {} payroll records ({} of {} optional columns present)",
        records.len(),
        columns.len(),
        AmountColumn::ALL.len()
    );
    Ok(PayrollHistory::new(records, columns))
}

/// Load payroll history from a CSV file
pub fn load_history<P: AsRef<Path>>(path: P) -> Result<PayrollHistory> {
    let file = std::fs::File::open(path)?;
    load_history_from_reader(file)
}

/// Load payroll history from the default location
pub fn load_default_history() -> Result<PayrollHistory> {
    load_history(DEFAULT_HISTORY_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::record::PERSON_COLUMN;
    use crate::period::CalendarMonth;
    use approx::assert_relative_eq;

    const SAMPLE: &str = "\
 Periodo ,Empleador,Nick Name,Cargo,Total Salario Basico USD,Total Bonos y Premios USD
January 2024,Viventa SAS,ana,Consultor,\"$1,200.50\",
Febrero 2024,Viventa SAS,ana,Consultor,1100,  $ 250
Cierre,Viventa SAS,ana,Consultor,n/a,10
";

    #[test]
    fn test_load_from_reader_cleans_amounts() {
        let history = load_history_from_reader(SAMPLE.as_bytes()).unwrap();
        let records = history.records();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].period, "January 2024");
        assert_eq!(records[0].period_month, CalendarMonth::new(2024, 1));
        assert_relative_eq!(records[0].amounts.basic_salary, 1200.50);
        assert_eq!(records[0].amounts.bonuses, 0.0);

        assert_eq!(records[1].period_month, CalendarMonth::new(2024, 2));
        assert_relative_eq!(records[1].amounts.bonuses, 250.0);

        // Unparseable label and garbage amount are not fatal
        assert_eq!(records[2].period_month, None);
        assert_eq!(records[2].amounts.basic_salary, 0.0);
        assert_relative_eq!(records[2].amounts.bonuses, 10.0);
    }

    #[test]
    fn test_present_columns_tracked() {
        let history = load_history_from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(
            history.columns(),
            &[AmountColumn::BasicSalary, AmountColumn::Bonuses]
        );
    }

    #[test]
    fn test_missing_required_column_is_fatal() {
        let data = "Periodo,Empleador,Cargo\nJanuary 2024,Viventa,Consultor\n";
        let result = load_history_from_reader(data.as_bytes());
        assert!(matches!(result, Err(EngineError::MissingColumn(c)) if c == PERSON_COLUMN));
    }

    #[test]
    fn test_clean_amount() {
        let column = AmountColumn::TotalPayroll;
        assert_eq!(clean_amount(None, column, 1), 0.0);
        assert_eq!(clean_amount(Some(""), column, 1), 0.0);
        assert_eq!(clean_amount(Some("  "), column, 1), 0.0);
        assert_eq!(clean_amount(Some("nan"), column, 1), 0.0);
        assert_eq!(clean_amount(Some("$ 1,234,567.25"), column, 1), 1_234_567.25);
        assert_eq!(clean_amount(Some("-15"), column, 1), -15.0);
        assert_eq!(clean_amount(Some("abc"), column, 1), 0.0);
    }

    #[test]
    fn test_load_default_history() {
        let history = load_default_history().expect("Failed to load history");
        assert!(!history.records().is_empty());
        assert!(history.roles().len() >= 2);
    }
}
