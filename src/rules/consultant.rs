//! Consultant commission plans (tiered-percentage roles)
//!
//! A consultant earns, per month:
//! - SV commission: billed SV units x net per-unit rate x a percentage taken from
//!   the tier's unit-count brackets, where net rate = gross x (1 - avg discount)
//! - a flat stranded-to-billed bonus per recovered unit
//! - Vivecasa commission, earned in COP on property value and converted with the TRM,
//!   paid as an advance per property (value-banded) plus the balance due
//! - a new-development bonus keyed to the count of new-development sales
//!
//! Monthly points feed the quarterly bonus (see `crate::quarterly`).

use super::brackets::{Bracket, BracketTable, UNBOUNDED};
use crate::error::Result;
use crate::inputs::{InputSet, InputSpec};
use crate::payout::PayoutLine;
use serde::{Deserialize, Serialize};

pub const SV_ASSIGNED: &str = "sv_assigned";
pub const SV_SELF_SOURCED: &str = "sv_self_sourced";
pub const SV_GROSS_RATE: &str = "sv_gross_rate";
pub const SV_AVG_DISCOUNT: &str = "sv_avg_discount";
pub const STRANDED_TO_BILLED: &str = "stranded_to_billed";
pub const VIVECASA_UNITS: &str = "vivecasa_units";
pub const VIVECASA_SELF_SOURCED: &str = "vivecasa_self_sourced";
pub const VIVECASA_AVG_VALUE: &str = "vivecasa_avg_value";
pub const TRM: &str = "trm";
pub const NEW_DEVELOPMENT_SALES: &str = "new_development_sales";

pub const LINE_SV_COMMISSION: &str = "SV commission";
pub const LINE_STRANDED_BONUS: &str = "Stranded-to-billed bonus";
pub const LINE_VIVECASA_ADVANCE: &str = "Vivecasa advance";
pub const LINE_VIVECASA_BALANCE: &str = "Vivecasa balance due";
pub const LINE_NEW_DEVELOPMENT_BONUS: &str = "New-development bonus";

/// Points per SV unit from an assigned lead
pub const POINTS_SV_ASSIGNED: u64 = 10;
/// Points per self-sourced SV unit
pub const POINTS_SV_SELF_SOURCED: u64 = 15;
/// Points per Vivecasa unit
pub const POINTS_VIVECASA: u64 = 20;
/// Points per self-sourced Vivecasa unit
pub const POINTS_VIVECASA_SELF_SOURCED: u64 = 30;

/// Advance per property by average property value (COP), closed bands
const ADVANCE_BANDS: [(f64, f64); 4] = [
    (90_000_000.0, 220.0),
    (270_000_001.0, 420.0),
    (480_000_001.0, 650.0),
    (600_000_001.0, 950.0),
];

/// Consultant career tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsultantTier {
    Apprentice,
    Entrepreneur,
    Expert,
}

impl ConsultantTier {
    pub const ALL: [ConsultantTier; 3] = [
        ConsultantTier::Apprentice,
        ConsultantTier::Entrepreneur,
        ConsultantTier::Expert,
    ];
}

/// Rate schedules for one consultant tier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsultantPlan {
    pub tier: ConsultantTier,
    /// Billed SV units -> commission percentage
    pub sv_brackets: BracketTable,
    /// USD per stranded unit moved to billed
    pub stranded_bonus_per_unit: f64,
    /// Share of property value earned as Vivecasa commission (COP)
    pub vivecasa_rate: f64,
    /// Quarterly points -> quarterly bonus (USD)
    pub quarterly_brackets: BracketTable,
}

impl ConsultantPlan {
    pub fn for_tier(tier: ConsultantTier) -> Self {
        match tier {
            ConsultantTier::Apprentice => Self {
                tier,
                sv_brackets: BracketTable::from_sorted(&[
                    Bracket::new(1, 4, 0.40),
                    Bracket::new(5, 9, 0.50),
                    Bracket::new(10, UNBOUNDED, 0.60),
                ]),
                stranded_bonus_per_unit: 10.0,
                vivecasa_rate: 0.010,
                quarterly_brackets: BracketTable::from_sorted(&[
                    Bracket::new(250, 350, 1500.0),
                    Bracket::new(351, UNBOUNDED, 1800.0),
                ]),
            },
            ConsultantTier::Entrepreneur => Self {
                tier,
                sv_brackets: BracketTable::from_sorted(&[
                    Bracket::new(1, 4, 0.45),
                    Bracket::new(5, 9, 0.55),
                    Bracket::new(10, UNBOUNDED, 0.65),
                ]),
                stranded_bonus_per_unit: 15.0,
                vivecasa_rate: 0.012,
                quarterly_brackets: BracketTable::from_sorted(&[
                    Bracket::new(350, 450, 2000.0),
                    Bracket::new(451, UNBOUNDED, 2500.0),
                ]),
            },
            ConsultantTier::Expert => Self {
                tier,
                sv_brackets: BracketTable::from_sorted(&[
                    Bracket::new(1, 4, 0.50),
                    Bracket::new(5, 9, 0.60),
                    Bracket::new(10, UNBOUNDED, 0.70),
                ]),
                stranded_bonus_per_unit: 20.0,
                vivecasa_rate: 0.015,
                quarterly_brackets: BracketTable::from_sorted(&[
                    Bracket::new(450, 600, 2800.0),
                    Bracket::new(601, UNBOUNDED, 3500.0),
                ]),
            },
        }
    }

    /// Input schema shared by every consultant tier
    pub fn input_specs() -> Vec<InputSpec> {
        vec![
            InputSpec::count(SV_ASSIGNED, "SV units billed, assigned leads"),
            InputSpec::count(SV_SELF_SOURCED, "SV units billed, self-sourced"),
            InputSpec::amount(SV_GROSS_RATE, "SV gross rate per unit (USD)", 500.0),
            InputSpec::ratio(SV_AVG_DISCOUNT, "SV average discount (0-1)", 0.0),
            InputSpec::count(STRANDED_TO_BILLED, "Stranded units moved to billed"),
            InputSpec::count(VIVECASA_UNITS, "Vivecasa properties sold"),
            InputSpec::count(VIVECASA_SELF_SOURCED, "Vivecasa properties, self-sourced"),
            InputSpec::amount(VIVECASA_AVG_VALUE, "Vivecasa average property value (COP)", 0.0),
            InputSpec::amount(TRM, "TRM (COP per USD)", 4_000.0).at_least(1.0),
            InputSpec::count(NEW_DEVELOPMENT_SALES, "New-development sales"),
        ]
    }

    /// Compute one month's breakdown from a validated input set
    pub fn month(&self, inputs: &InputSet) -> Result<ConsultantMonth> {
        let sv_assigned = inputs.count(SV_ASSIGNED)?;
        let sv_self_sourced = inputs.count(SV_SELF_SOURCED)?;
        let sv_units = sv_assigned.saturating_add(sv_self_sourced);
        let sv_rate_pct = self.sv_brackets.lookup(sv_units);
        let sv_net_rate = inputs.number(SV_GROSS_RATE)? * (1.0 - inputs.number(SV_AVG_DISCOUNT)?);
        let sv_commission = sv_units as f64 * sv_net_rate * sv_rate_pct;

        let stranded_bonus = inputs.count(STRANDED_TO_BILLED)? as f64 * self.stranded_bonus_per_unit;

        let vivecasa_units = inputs.count(VIVECASA_UNITS)?;
        let vivecasa_self_sourced = inputs.count(VIVECASA_SELF_SOURCED)?.min(vivecasa_units);
        let avg_value = inputs.number(VIVECASA_AVG_VALUE)?;
        let vivecasa_commission_cop = vivecasa_units as f64 * avg_value * self.vivecasa_rate;
        let vivecasa_commission = vivecasa_commission_cop / inputs.number(TRM)?;

        let advance_per_property = advance_per_property(avg_value);
        let advance = advance_per_property * vivecasa_units as f64;
        let balance_due = (vivecasa_commission - advance).max(0.0);

        let new_development_bonus = new_development_bonus(inputs.count(NEW_DEVELOPMENT_SALES)?);

        // Counts are unbounded above; points saturate instead of wrapping.
        let points = [
            sv_assigned.saturating_mul(POINTS_SV_ASSIGNED),
            sv_self_sourced.saturating_mul(POINTS_SV_SELF_SOURCED),
            (vivecasa_units - vivecasa_self_sourced).saturating_mul(POINTS_VIVECASA),
            vivecasa_self_sourced.saturating_mul(POINTS_VIVECASA_SELF_SOURCED),
        ]
        .into_iter()
        .fold(0u64, u64::saturating_add);

        Ok(ConsultantMonth {
            sv_units,
            sv_rate_pct,
            sv_net_rate,
            sv_commission,
            stranded_bonus,
            vivecasa_commission_cop,
            vivecasa_commission,
            advance_per_property,
            advance,
            balance_due,
            new_development_bonus,
            points,
        })
    }

    /// Quarterly bonus for a point total; both quota flags must hold
    pub fn quarterly_bonus(&self, points: u64, meets_creation_quota: bool, meets_effective_quota: bool) -> f64 {
        if meets_creation_quota && meets_effective_quota {
            self.quarterly_brackets.lookup(points)
        } else {
            0.0
        }
    }
}

/// Advance paid per property for an average property value in COP
///
/// Values below the lowest band pay nothing.
pub fn advance_per_property(avg_value: f64) -> f64 {
    ADVANCE_BANDS
        .iter()
        .rev()
        .find(|(floor, _)| avg_value >= *floor)
        .map(|&(_, advance)| advance)
        .unwrap_or(0.0)
}

/// Bonus keyed to new-development sales: 2 pays 300, 3 or more pay 500
pub fn new_development_bonus(sales: u64) -> f64 {
    match sales {
        0 | 1 => 0.0,
        2 => 300.0,
        _ => 500.0,
    }
}

/// One month of consultant earnings, in USD unless noted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsultantMonth {
    pub sv_units: u64,
    pub sv_rate_pct: f64,
    pub sv_net_rate: f64,
    pub sv_commission: f64,
    pub stranded_bonus: f64,
    pub vivecasa_commission_cop: f64,
    pub vivecasa_commission: f64,
    pub advance_per_property: f64,
    pub advance: f64,
    pub balance_due: f64,
    pub new_development_bonus: f64,
    pub points: u64,
}

impl ConsultantMonth {
    /// Paid lines; the Vivecasa commission itself is paid as advance + balance
    pub fn lines(&self) -> Vec<PayoutLine> {
        vec![
            PayoutLine::variable(LINE_SV_COMMISSION, self.sv_commission),
            PayoutLine::variable(LINE_STRANDED_BONUS, self.stranded_bonus),
            PayoutLine::variable(LINE_VIVECASA_ADVANCE, self.advance),
            PayoutLine::variable(LINE_VIVECASA_BALANCE, self.balance_due),
            PayoutLine::variable(LINE_NEW_DEVELOPMENT_BONUS, self.new_development_bonus),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn month_inputs() -> InputSet {
        InputSet::defaults(&ConsultantPlan::input_specs())
    }

    #[test]
    fn test_apprentice_sv_commission() {
        let plan = ConsultantPlan::for_tier(ConsultantTier::Apprentice);
        let inputs = month_inputs().with(SV_ASSIGNED, 5);
        let month = plan.month(&inputs).unwrap();

        assert_eq!(month.sv_units, 5);
        assert_relative_eq!(month.sv_rate_pct, 0.50);
        assert_relative_eq!(month.sv_commission, 1250.0);
    }

    #[test]
    fn test_discount_reduces_net_rate() {
        let plan = ConsultantPlan::for_tier(ConsultantTier::Expert);
        let inputs = month_inputs()
            .with(SV_ASSIGNED, 6)
            .with(SV_SELF_SOURCED, 4)
            .with(SV_AVG_DISCOUNT, 0.10);
        let month = plan.month(&inputs).unwrap();

        // 10 units -> 70% bracket, 500 x 0.9 net
        assert_relative_eq!(month.sv_net_rate, 450.0);
        assert_relative_eq!(month.sv_commission, 10.0 * 450.0 * 0.70);
    }

    #[test]
    fn test_advance_bands() {
        assert_eq!(advance_per_property(0.0), 0.0);
        assert_eq!(advance_per_property(89_999_999.0), 0.0);
        assert_eq!(advance_per_property(90_000_000.0), 220.0);
        assert_eq!(advance_per_property(270_000_000.0), 220.0);
        assert_eq!(advance_per_property(270_000_001.0), 420.0);
        assert_eq!(advance_per_property(480_000_000.0), 420.0);
        assert_eq!(advance_per_property(480_000_001.0), 650.0);
        assert_eq!(advance_per_property(600_000_000.0), 650.0);
        assert_eq!(advance_per_property(600_000_001.0), 950.0);
        assert_eq!(advance_per_property(2_000_000_000.0), 950.0);
    }

    #[test]
    fn test_vivecasa_commission_advance_and_balance() {
        let plan = ConsultantPlan::for_tier(ConsultantTier::Apprentice);
        let inputs = month_inputs()
            .with(VIVECASA_UNITS, 2)
            .with(VIVECASA_AVG_VALUE, 200_000_000.0)
            .with(TRM, 4_000.0);
        let month = plan.month(&inputs).unwrap();

        // 2 x 200M x 1% = 4M COP = 1000 USD; advance 2 x 220
        assert_relative_eq!(month.vivecasa_commission_cop, 4_000_000.0);
        assert_relative_eq!(month.vivecasa_commission, 1000.0);
        assert_relative_eq!(month.advance, 440.0);
        assert_relative_eq!(month.balance_due, 560.0);
    }

    #[test]
    fn test_balance_due_never_negative() {
        let plan = ConsultantPlan::for_tier(ConsultantTier::Apprentice);
        let inputs = month_inputs()
            .with(VIVECASA_UNITS, 1)
            .with(VIVECASA_AVG_VALUE, 100_000_000.0)
            .with(TRM, 5_000.0);
        let month = plan.month(&inputs).unwrap();

        // 1M COP / 5000 = 200 USD earned, 220 advanced
        assert_relative_eq!(month.vivecasa_commission, 200.0);
        assert_relative_eq!(month.advance, 220.0);
        assert_eq!(month.balance_due, 0.0);
    }

    #[test]
    fn test_new_development_bonus() {
        assert_eq!(new_development_bonus(0), 0.0);
        assert_eq!(new_development_bonus(1), 0.0);
        assert_eq!(new_development_bonus(2), 300.0);
        assert_eq!(new_development_bonus(3), 500.0);
        assert_eq!(new_development_bonus(12), 500.0);
    }

    #[test]
    fn test_points_cap_self_sourced_at_total() {
        let plan = ConsultantPlan::for_tier(ConsultantTier::Entrepreneur);
        let inputs = month_inputs()
            .with(SV_ASSIGNED, 3)
            .with(SV_SELF_SOURCED, 2)
            .with(VIVECASA_UNITS, 2)
            .with(VIVECASA_SELF_SOURCED, 5);
        let month = plan.month(&inputs).unwrap();

        // 3x10 + 2x15 + 0x20 + 2x30
        assert_eq!(month.points, 120);

        let partial = inputs.with(VIVECASA_SELF_SOURCED, 1);
        assert_eq!(plan.month(&partial).unwrap().points, 30 + 30 + 20 + 30);
    }

    #[test]
    fn test_quarterly_bonus_requires_both_flags() {
        for tier in ConsultantTier::ALL {
            let plan = ConsultantPlan::for_tier(tier);
            assert!(plan.quarterly_bonus(10_000, true, true) > 0.0);
            assert_eq!(plan.quarterly_bonus(10_000, false, true), 0.0);
            assert_eq!(plan.quarterly_bonus(10_000, true, false), 0.0);
            assert_eq!(plan.quarterly_bonus(10_000, false, false), 0.0);
        }
    }

    #[test]
    fn test_tier_tables_are_valid() {
        for tier in ConsultantTier::ALL {
            let plan = ConsultantPlan::for_tier(tier);
            assert!(plan.sv_brackets.validate().is_ok());
            assert!(plan.quarterly_brackets.validate().is_ok());
            assert!(plan.sv_brackets.is_open_ended());
            assert!(plan.quarterly_brackets.is_open_ended());
        }
    }

    #[test]
    fn test_huge_counts_saturate_points() {
        let plan = ConsultantPlan::for_tier(ConsultantTier::Apprentice);
        let inputs = month_inputs()
            .with(SV_ASSIGNED, i64::MAX)
            .with(SV_SELF_SOURCED, i64::MAX)
            .with(VIVECASA_UNITS, i64::MAX);
        let month = plan.month(&inputs).unwrap();
        assert_eq!(month.sv_units, u64::MAX);
        assert_eq!(month.points, u64::MAX);
        assert_eq!(month.sv_rate_pct, 0.60);
    }

    #[test]
    fn test_lines_total_paid_amounts() {
        let plan = ConsultantPlan::for_tier(ConsultantTier::Apprentice);
        let inputs = month_inputs()
            .with(SV_ASSIGNED, 5)
            .with(STRANDED_TO_BILLED, 3)
            .with(NEW_DEVELOPMENT_SALES, 2);
        let lines = plan.month(&inputs).unwrap().lines();
        let total: f64 = lines.iter().map(|l| l.amount).sum();
        assert_relative_eq!(total, 1250.0 + 30.0 + 300.0);
    }
}
