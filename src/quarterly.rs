//! Quarterly aggregation for consultant roles
//!
//! Three consecutive months are evaluated independently; their points are summed
//! and the tier's quarterly bracket turns the point total into a bonus, paid only
//! when both the creation quota and the minimum-effective quota were met.

use crate::currency::Currency;
use crate::error::{EngineError, Result};
use crate::evaluator::{evaluate, Evaluation};
use crate::inputs::InputSet;
use crate::rules::RoleDefinition;
use serde::{Deserialize, Serialize};

/// Months in a quarter
pub const MONTHS_PER_QUARTER: usize = 3;

/// External eligibility flags for the quarterly bonus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuotaFlags {
    pub meets_creation_quota: bool,
    pub meets_effective_quota: bool,
}

impl QuotaFlags {
    pub fn new(meets_creation_quota: bool, meets_effective_quota: bool) -> Self {
        Self {
            meets_creation_quota,
            meets_effective_quota,
        }
    }

    pub fn both_met(&self) -> bool {
        self.meets_creation_quota && self.meets_effective_quota
    }
}

/// Quarter summary for one consultant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarterlyAggregate {
    pub role_id: &'static str,
    pub currency: Currency,
    /// Per-month evaluations, in input order
    pub months: Vec<Evaluation>,
    pub month_points: [u64; MONTHS_PER_QUARTER],
    pub points_quarter: u64,
    pub flags: QuotaFlags,
    pub quarterly_bonus: f64,
    /// Sum of the three monthly totals
    pub months_total: f64,
    /// Monthly totals plus the quarterly bonus
    pub quarterly_total: f64,
}

/// Aggregates three monthly input sets of a consultant role
#[derive(Debug, Clone, Copy, Default)]
pub struct QuarterlyAggregator;

impl QuarterlyAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn aggregate(
        &self,
        role: &RoleDefinition,
        months: &[InputSet; MONTHS_PER_QUARTER],
        flags: QuotaFlags,
    ) -> Result<QuarterlyAggregate> {
        let plan = role
            .consultant_plan()
            .ok_or_else(|| EngineError::NotQuarterlyRole(role.id.to_string()))?;

        let mut evaluations = Vec::with_capacity(MONTHS_PER_QUARTER);
        let mut month_points = [0; MONTHS_PER_QUARTER];
        for (idx, inputs) in months.iter().enumerate() {
            evaluations.push(evaluate(role, inputs)?);
            month_points[idx] = plan.month(inputs)?.points;
        }

        let points_quarter = month_points.iter().fold(0u64, |total, &points| total.saturating_add(points));
        let quarterly_bonus =
            plan.quarterly_bonus(points_quarter, flags.meets_creation_quota, flags.meets_effective_quota);
        let months_total: f64 = evaluations.iter().map(Evaluation::total).sum();

        log::debug!(
            "{}: {} quarter points, bonus {} (quotas met: {})",
            role.id,
            points_quarter,
            quarterly_bonus,
            flags.both_met()
        );

        Ok(QuarterlyAggregate {
            role_id: role.id,
            currency: role.currency,
            months: evaluations,
            month_points,
            points_quarter,
            flags,
            quarterly_bonus,
            months_total,
            quarterly_total: months_total + quarterly_bonus,
        })
    }

    /// Aggregate from a slice, which must hold exactly three months
    pub fn aggregate_slice(
        &self,
        role: &RoleDefinition,
        months: &[InputSet],
        flags: QuotaFlags,
    ) -> Result<QuarterlyAggregate> {
        let months: &[InputSet; MONTHS_PER_QUARTER] = months.try_into().map_err(|_| {
            EngineError::InvalidQuarter(format!(
                "expected {} monthly input sets, got {}",
                MONTHS_PER_QUARTER,
                months.len()
            ))
        })?;
        self.aggregate(role, months, flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::consultant::{SV_ASSIGNED, SV_SELF_SOURCED, VIVECASA_UNITS};
    use crate::rules::RuleTable;
    use approx::assert_relative_eq;

    /// Months whose points add up to `[a, b, c]`, using assigned SV units (10 points each)
    fn months_with_points(role: &RoleDefinition, points: [i64; 3]) -> [InputSet; 3] {
        points.map(|p| role.default_inputs().with(SV_ASSIGNED, p / 10))
    }

    #[test]
    fn test_apprentice_quarter_brackets() {
        let table = RuleTable::builtin();
        let role = table.get("consultant-apprentice").unwrap();
        let aggregator = QuarterlyAggregator::new();
        let met = QuotaFlags::new(true, true);

        let bonus = |points: [i64; 3], extra_self_sourced: i64| {
            let mut months = months_with_points(role, points);
            months[0].set(SV_SELF_SOURCED, extra_self_sourced);
            aggregator.aggregate(role, &months, met).unwrap()
        };

        // 120 + 120 + 110 = 350
        let at_upper_break = bonus([120, 120, 110], 0);
        assert_eq!(at_upper_break.points_quarter, 350);
        assert_eq!(at_upper_break.quarterly_bonus, 1500.0);

        // 340 plus one self-sourced SV unit at 15 points
        let above = bonus([120, 120, 100], 1);
        assert_eq!(above.points_quarter, 355);
        assert_eq!(above.quarterly_bonus, 1800.0);

        let below = bonus([100, 100, 40], 0);
        assert_eq!(below.points_quarter, 240);
        assert_eq!(below.quarterly_bonus, 0.0);

        let at_lower_break = bonus([100, 100, 50], 0);
        assert_eq!(at_lower_break.quarterly_bonus, 1500.0);
    }

    #[test]
    fn test_bracket_breaks() {
        let table = RuleTable::builtin();
        let plan = table.get("consultant-apprentice").unwrap().consultant_plan().unwrap();
        assert_eq!(plan.quarterly_bonus(351, true, true), 1800.0);
        assert_eq!(plan.quarterly_bonus(350, true, true), 1500.0);
        assert_eq!(plan.quarterly_bonus(250, true, true), 1500.0);
        assert_eq!(plan.quarterly_bonus(249, true, true), 0.0);
    }

    #[test]
    fn test_mixed_sources_reach_upper_bracket() {
        let table = RuleTable::builtin();
        let role = table.get("consultant-apprentice").unwrap();
        let months = [
            role.default_inputs().with(SV_ASSIGNED, 12).with(SV_SELF_SOURCED, 1),
            role.default_inputs().with(SV_ASSIGNED, 12).with(SV_SELF_SOURCED, 1),
            role.default_inputs()
                .with(SV_ASSIGNED, 3)
                .with(SV_SELF_SOURCED, 1)
                .with(VIVECASA_UNITS, 2),
        ];
        let aggregate = QuarterlyAggregator::new()
            .aggregate(role, &months, QuotaFlags::new(true, true))
            .unwrap();
        // 135 + 135 + (30 + 15 + 40)
        assert_eq!(aggregate.month_points, [135, 135, 85]);
        assert_eq!(aggregate.points_quarter, 355);
        assert_eq!(aggregate.quarterly_bonus, 1800.0);
    }

    #[test]
    fn test_either_flag_false_pays_no_bonus() {
        let table = RuleTable::builtin();
        let role = table.get("consultant-expert").unwrap();
        let months = months_with_points(role, [400, 400, 400]);
        let aggregator = QuarterlyAggregator::new();

        for flags in [
            QuotaFlags::new(false, true),
            QuotaFlags::new(true, false),
            QuotaFlags::new(false, false),
        ] {
            let aggregate = aggregator.aggregate(role, &months, flags).unwrap();
            assert_eq!(aggregate.points_quarter, 1200);
            assert_eq!(aggregate.quarterly_bonus, 0.0);
            assert_relative_eq!(aggregate.quarterly_total, aggregate.months_total);
        }

        let paid = aggregator.aggregate(role, &months, QuotaFlags::new(true, true)).unwrap();
        assert_eq!(paid.quarterly_bonus, 3500.0);
    }

    #[test]
    fn test_quarterly_total_adds_months_and_bonus() {
        let table = RuleTable::builtin();
        let role = table.get("consultant-apprentice").unwrap();
        let months = months_with_points(role, [150, 150, 100]);
        let aggregate = QuarterlyAggregator::new()
            .aggregate(role, &months, QuotaFlags::new(true, true))
            .unwrap();

        // 15, 15 and 10 SV units at 500 gross: 60%, 60% and 60%
        let expected_months = (15.0 + 15.0 + 10.0) * 500.0 * 0.60;
        assert_eq!(aggregate.month_points, [150, 150, 100]);
        assert_relative_eq!(aggregate.months_total, expected_months);
        assert_eq!(aggregate.quarterly_bonus, 1800.0);
        assert_relative_eq!(aggregate.quarterly_total, expected_months + 1800.0);
        assert_eq!(aggregate.months.len(), 3);
    }

    #[test]
    fn test_huge_counts_saturate_quarter_points() {
        let table = RuleTable::builtin();
        let role = table.get("consultant-apprentice").unwrap();
        let huge = role.default_inputs().with(SV_ASSIGNED, i64::MAX);
        assert!(role.validate(&huge).is_ok());

        let evaluation = evaluate(role, &huge).unwrap();
        assert!(evaluation.total() > 0.0);

        let months = [huge.clone(), huge.clone(), huge];
        let aggregate = QuarterlyAggregator::new()
            .aggregate(role, &months, QuotaFlags::new(true, true))
            .unwrap();
        assert_eq!(aggregate.month_points, [u64::MAX; 3]);
        assert_eq!(aggregate.points_quarter, u64::MAX);
        assert_eq!(aggregate.quarterly_bonus, 1800.0);
    }

    #[test]
    fn test_non_consultant_role_rejected() {
        let table = RuleTable::builtin();
        let role = table.get("credit-manager-upf").unwrap();
        let months = [role.default_inputs(), role.default_inputs(), role.default_inputs()];
        let result = QuarterlyAggregator::new().aggregate(role, &months, QuotaFlags::default());
        assert!(matches!(result, Err(EngineError::NotQuarterlyRole(_))));
    }

    #[test]
    fn test_slice_must_hold_three_months() {
        let table = RuleTable::builtin();
        let role = table.get("consultant-apprentice").unwrap();
        let two = vec![role.default_inputs(), role.default_inputs()];
        let result = QuarterlyAggregator::new().aggregate_slice(role, &two, QuotaFlags::default());
        assert!(matches!(result, Err(EngineError::InvalidQuarter(_))));
    }

    #[test]
    fn test_invalid_month_fails_whole_quarter() {
        let table = RuleTable::builtin();
        let role = table.get("consultant-apprentice").unwrap();
        let mut months = months_with_points(role, [10, 10, 10]);
        months[1].set(SV_ASSIGNED, -4);
        let result = QuarterlyAggregator::new().aggregate(role, &months, QuotaFlags::new(true, true));
        assert!(matches!(result, Err(EngineError::OutOfDomain { .. })));
    }
}
