//! Payroll history record structures

use crate::period::CalendarMonth;
use serde::Serialize;
use std::ops::AddAssign;

/// Required identifying columns
pub const PERIOD_COLUMN: &str = "Periodo";
pub const EMPLOYER_COLUMN: &str = "Empleador";
pub const PERSON_COLUMN: &str = "Nick Name";
pub const ROLE_COLUMN: &str = "Cargo";

pub const REQUIRED_COLUMNS: [&str; 4] = [PERIOD_COLUMN, EMPLOYER_COLUMN, PERSON_COLUMN, ROLE_COLUMN];

/// Optional numeric columns, cleaned of currency symbols and separators on load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AmountColumn {
    BasicSalary,
    BasicSalaryPpss,
    SocialBenefits,
    VivecasaCommissions,
    ViveprestamoCommissions,
    Bonuses,
    TotalPayroll,
    /// Headcount-style column, cleaned like the money columns but never summed
    TotalAssets,
}

impl AmountColumn {
    pub const ALL: [AmountColumn; 8] = [
        AmountColumn::BasicSalary,
        AmountColumn::BasicSalaryPpss,
        AmountColumn::SocialBenefits,
        AmountColumn::VivecasaCommissions,
        AmountColumn::ViveprestamoCommissions,
        AmountColumn::Bonuses,
        AmountColumn::TotalPayroll,
        AmountColumn::TotalAssets,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            AmountColumn::BasicSalary => "Total Salario Basico USD",
            AmountColumn::BasicSalaryPpss => "Total PPSS Salario Basico USD",
            AmountColumn::SocialBenefits => "Total Prestaciones Sociales USD",
            AmountColumn::VivecasaCommissions => "Total Comisiones Vivecasa USD",
            AmountColumn::ViveprestamoCommissions => "Total Comisiones Viveprestamo USD",
            AmountColumn::Bonuses => "Total Bonos y Premios USD",
            AmountColumn::TotalPayroll => "Total Total Nomina USD",
            AmountColumn::TotalAssets => "Total Activos",
        }
    }

    /// USD pay columns, the ones summed in totals and summaries
    pub fn is_pay(&self) -> bool {
        !matches!(self, AmountColumn::TotalAssets)
    }
}

/// USD amounts of one record, or a sum of records
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PayAmounts {
    pub basic_salary: f64,
    pub basic_salary_ppss: f64,
    pub social_benefits: f64,
    pub vivecasa_commissions: f64,
    pub viveprestamo_commissions: f64,
    pub bonuses: f64,
    pub total_payroll: f64,
}

impl PayAmounts {
    /// Amount for a pay column; `TotalAssets` is not a pay amount and reads 0
    pub fn get(&self, column: AmountColumn) -> f64 {
        match column {
            AmountColumn::BasicSalary => self.basic_salary,
            AmountColumn::BasicSalaryPpss => self.basic_salary_ppss,
            AmountColumn::SocialBenefits => self.social_benefits,
            AmountColumn::VivecasaCommissions => self.vivecasa_commissions,
            AmountColumn::ViveprestamoCommissions => self.viveprestamo_commissions,
            AmountColumn::Bonuses => self.bonuses,
            AmountColumn::TotalPayroll => self.total_payroll,
            AmountColumn::TotalAssets => 0.0,
        }
    }

    pub(crate) fn set(&mut self, column: AmountColumn, value: f64) {
        match column {
            AmountColumn::BasicSalary => self.basic_salary = value,
            AmountColumn::BasicSalaryPpss => self.basic_salary_ppss = value,
            AmountColumn::SocialBenefits => self.social_benefits = value,
            AmountColumn::VivecasaCommissions => self.vivecasa_commissions = value,
            AmountColumn::ViveprestamoCommissions => self.viveprestamo_commissions = value,
            AmountColumn::Bonuses => self.bonuses = value,
            AmountColumn::TotalPayroll => self.total_payroll = value,
            AmountColumn::TotalAssets => {}
        }
    }
}

impl AddAssign for PayAmounts {
    fn add_assign(&mut self, other: Self) {
        self.basic_salary += other.basic_salary;
        self.basic_salary_ppss += other.basic_salary_ppss;
        self.social_benefits += other.social_benefits;
        self.vivecasa_commissions += other.vivecasa_commissions;
        self.viveprestamo_commissions += other.viveprestamo_commissions;
        self.bonuses += other.bonuses;
        self.total_payroll += other.total_payroll;
    }
}

/// One row of the payroll history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayrollRecord {
    /// Period label as written in the source, e.g. "January 2024"
    pub period: String,
    /// First day of the period's month, when the label parses
    pub period_month: Option<CalendarMonth>,
    pub employer: String,
    pub person: String,
    pub role: String,
    pub total_assets: f64,
    pub amounts: PayAmounts,
}

impl PayrollRecord {
    /// Ordering key: parsed month first (unparseable labels last), then label
    pub fn sort_key(&self) -> (bool, Option<CalendarMonth>, &str) {
        (self.period_month.is_none(), self.period_month, &self.period)
    }

    pub fn amount(&self, column: AmountColumn) -> f64 {
        match column {
            AmountColumn::TotalAssets => self.total_assets,
            pay => self.amounts.get(pay),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assign_sums_every_field() {
        let mut total = PayAmounts::default();
        let mut one = PayAmounts::default();
        for column in AmountColumn::ALL {
            one.set(column, 1.5);
        }
        total += one;
        total += one;
        for column in AmountColumn::ALL.into_iter().filter(AmountColumn::is_pay) {
            assert_eq!(total.get(column), 3.0, "{:?}", column);
        }
        assert_eq!(total.get(AmountColumn::TotalAssets), 0.0);
    }

    #[test]
    fn test_unparsed_periods_sort_last() {
        let record = |period: &str, month: Option<CalendarMonth>| PayrollRecord {
            period: period.to_string(),
            period_month: month,
            employer: String::new(),
            person: String::new(),
            role: String::new(),
            total_assets: 0.0,
            amounts: PayAmounts::default(),
        };
        let mut records = vec![
            record("Cierre", None),
            record("March 2024", CalendarMonth::new(2024, 3)),
            record("January 2024", CalendarMonth::new(2024, 1)),
        ];
        records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        let labels: Vec<_> = records.iter().map(|r| r.period.as_str()).collect();
        assert_eq!(labels, vec!["January 2024", "March 2024", "Cierre"]);
    }
}
