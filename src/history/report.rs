//! Totals, per-period summaries and CSV export of selected records

use super::record::{
    AmountColumn, PayAmounts, PayrollRecord, EMPLOYER_COLUMN, PERIOD_COLUMN, PERSON_COLUMN, ROLE_COLUMN,
};
use crate::error::Result;
use crate::period::CalendarMonth;
use serde::Serialize;
use std::io::Write;

/// Summed pay amounts for one period label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub period: String,
    pub period_month: Option<CalendarMonth>,
    pub records: usize,
    pub amounts: PayAmounts,
}

/// Sum of pay amounts over records
pub fn totals<'a>(records: impl IntoIterator<Item = &'a PayrollRecord>) -> PayAmounts {
    let mut total = PayAmounts::default();
    for record in records {
        total += record.amounts;
    }
    total
}

/// Pay amounts grouped by period, in period order
pub fn summary_by_period<'a>(records: impl IntoIterator<Item = &'a PayrollRecord>) -> Vec<PeriodSummary> {
    let mut summaries: Vec<PeriodSummary> = Vec::new();
    for record in records {
        match summaries
            .iter_mut()
            .find(|s| s.period == record.period && s.period_month == record.period_month)
        {
            Some(summary) => {
                summary.records += 1;
                summary.amounts += record.amounts;
            }
            None => summaries.push(PeriodSummary {
                period: record.period.clone(),
                period_month: record.period_month,
                records: 1,
                amounts: record.amounts,
            }),
        }
    }
    summaries.sort_by(|a, b| {
        (a.period_month.is_none(), a.period_month, &a.period).cmp(&(b.period_month.is_none(), b.period_month, &b.period))
    });
    summaries
}

/// Write records as CSV with the identifying columns and the given amount columns
pub fn write_csv<'a, W: Write>(
    records: impl IntoIterator<Item = &'a PayrollRecord>,
    columns: &[AmountColumn],
    writer: W,
) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec![PERIOD_COLUMN, EMPLOYER_COLUMN, PERSON_COLUMN, ROLE_COLUMN];
    header.extend(columns.iter().map(AmountColumn::header));
    csv_writer.write_record(&header)?;

    for record in records {
        let mut row = vec![
            record.period.clone(),
            record.employer.clone(),
            record.person.clone(),
            record.role.clone(),
        ];
        row.extend(columns.iter().map(|c| format!("{:.2}", record.amount(*c))));
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write per-period summaries as CSV, pay columns only
pub fn write_summary_csv<W: Write>(summaries: &[PeriodSummary], columns: &[AmountColumn], writer: W) -> Result<()> {
    let pay_columns: Vec<AmountColumn> = columns.iter().copied().filter(AmountColumn::is_pay).collect();
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec![PERIOD_COLUMN];
    header.extend(pay_columns.iter().map(AmountColumn::header));
    csv_writer.write_record(&header)?;

    for summary in summaries {
        let mut row = vec![summary.period.clone()];
        row.extend(pay_columns.iter().map(|c| format!("{:.2}", summary.amounts.get(*c))));
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{load_history_from_reader, HistoryQuery};
    use approx::assert_relative_eq;

    const SAMPLE: &str = "\
Periodo,Empleador,Nick Name,Cargo,Total Activos,Total Comisiones Vivecasa USD,Total Total Nomina USD
January 2024,Viventa,ana,Consultor,3,100,1000
January 2024,Viventa Dos,ana,Consultor,1,50,500
Febrero 2024,Viventa,ana,Consultor,2,$25.5,\"1,200\"
";

    #[test]
    fn test_totals_and_summary() {
        let history = load_history_from_reader(SAMPLE.as_bytes()).unwrap();
        let selected = history.select(&HistoryQuery::new("Consultor", "ana")).unwrap();

        let total = totals(selected.iter().copied());
        assert_relative_eq!(total.vivecasa_commissions, 175.5);
        assert_relative_eq!(total.total_payroll, 2700.0);

        let summary = summary_by_period(selected.iter().copied());
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].period, "January 2024");
        assert_eq!(summary[0].records, 2);
        assert_relative_eq!(summary[0].amounts.total_payroll, 1500.0);
        assert_relative_eq!(summary[1].amounts.vivecasa_commissions, 25.5);
    }

    #[test]
    fn test_write_csv_detail() {
        let history = load_history_from_reader(SAMPLE.as_bytes()).unwrap();
        let mut out = Vec::new();
        write_csv(history.records(), history.columns(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Periodo,Empleador,Nick Name,Cargo,Total Comisiones Vivecasa USD,Total Total Nomina USD,Total Activos")
        );
        assert_eq!(lines.next(), Some("January 2024,Viventa,ana,Consultor,100.00,1000.00,3.00"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_write_summary_skips_assets() {
        let history = load_history_from_reader(SAMPLE.as_bytes()).unwrap();
        let summary = summary_by_period(history.records());
        let mut out = Vec::new();
        write_summary_csv(&summary, history.columns(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.lines().next(),
            Some("Periodo,Total Comisiones Vivecasa USD,Total Total Nomina USD")
        );
        assert_eq!(text.lines().nth(2), Some("Febrero 2024,25.50,1200.00"));
    }
}
