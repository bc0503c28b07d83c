//! Built-in role catalog

use super::condition::{Condition, Goal};
use super::consultant::{ConsultantPlan, ConsultantTier};
use super::goals::GoalTables;
use super::{Formula, GateScope, LineRule, PayoutFormula, RoleDefinition};
use crate::currency::Currency;
use crate::inputs::InputSpec;
use crate::payout::LineKind;
use crate::period::{QUARTER_KEYS, SPANISH_MONTHS};

const COMMISSION: &str = "Monthly commission";
const QUARTER_BONUS: &str = "Quarterly bonus";
const APPROVALS_COMMISSION: &str = "Monthly commission (approvals)";
const APPROVALS_BONUS: &str = "Quarterly bonus (approvals)";
const REVIEWS_BONUS: &str = "Quarterly bonus (reviews)";
const VARIABLE: &str = "Monthly variable";

const CREDIT_MANAGER_RATE: f64 = 125_000.0;
const CREDIT_MANAGER_QUARTER_BONUS: f64 = 500_000.0;
const LEAD_STEP: f64 = 1_000_000.0;
const LEAD_HALF_STEP: f64 = 500_000.0;

/// Every built-in role, in display order
pub(super) fn roles(goals: &GoalTables) -> Vec<RoleDefinition> {
    let mut roles = vec![
        credit_manager("credit-manager-upf", "Credit Manager - UPF", 4, 25.0),
        credit_manager("credit-manager-agreements", "Credit Manager - Agreements/Vivecasas", 10, 50.0),
        credit_manager("credit-manager-fna", "Credit Manager - FNA", 0, 20.0),
        credit_manager("credit-manager-new-used", "Credit Manager - New/Used", 15, 70.0),
        credit_analyst("credit-analyst-2", "Credit Analyst II", 40, 25_000.0),
        credit_analyst("credit-analyst-3", "Credit Analyst III", 60, 25_000.0),
        credit_analyst("credit-analysis-lead", "Credit Analysis Lead", 350, 10_000.0),
        legalization_analyst(),
        disbursement_lead(),
        disbursement_manager(goals),
        agreements_lead(goals),
        used_housing_lead(),
        new_housing_lead(),
        credit_analysis_manager(goals),
    ];
    roles.extend(ConsultantTier::ALL.into_iter().map(consultant));
    roles
}

fn credit_manager(
    id: &'static str,
    title: &'static str,
    minimum_free_units: u64,
    quarter_goal: f64,
) -> RoleDefinition {
    RoleDefinition {
        id,
        title,
        currency: Currency::COP,
        inputs: vec![
            InputSpec::count("approvals_month", "Net approvals (month)"),
            InputSpec::count("approvals_quarter", "Net approvals (quarter)"),
            InputSpec::flag("service_guarantee", "Meets service guarantee", true),
        ],
        gate: Condition::Flag("service_guarantee"),
        gate_scope: GateScope::All,
        formula: PayoutFormula::Lines(vec![
            LineRule::variable(
                COMMISSION,
                Formula::Excess {
                    units_key: "approvals_month",
                    minimum_free_units,
                    unit_rate: CREDIT_MANAGER_RATE,
                },
            ),
            LineRule::variable(
                QUARTER_BONUS,
                Formula::Step(vec![(
                    Condition::at_least("approvals_quarter", quarter_goal),
                    CREDIT_MANAGER_QUARTER_BONUS,
                )]),
            ),
        ]),
    }
}

fn credit_analyst(
    id: &'static str,
    title: &'static str,
    minimum_free_units: u64,
    unit_rate: f64,
) -> RoleDefinition {
    RoleDefinition {
        id,
        title,
        currency: Currency::COP,
        inputs: vec![
            InputSpec::count("approvals_month", "Net approvals (month)"),
            InputSpec::ratio("folders_within_3_days", "Folders within 3 days (0-1)", 0.90),
            InputSpec::ratio("filings_approved", "Filings approved (0-1)", 0.90),
        ],
        gate: Condition::All(vec![
            Condition::at_least("folders_within_3_days", 0.90),
            Condition::at_least("filings_approved", 0.90),
        ]),
        gate_scope: GateScope::All,
        formula: PayoutFormula::Lines(vec![LineRule::variable(
            COMMISSION,
            Formula::Excess {
                units_key: "approvals_month",
                minimum_free_units,
                unit_rate,
            },
        )]),
    }
}

fn disbursement_quality_inputs() -> Vec<InputSpec> {
    vec![
        InputSpec::count("disbursements_month", "Disbursements (month)"),
        InputSpec::ratio("monitoring", "Monitoring (0-1)", 0.95),
        InputSpec::ratio("sla", "SLA compliance (0-1)", 0.90),
        InputSpec::ratio("notes_productivity", "Notes productivity (0-1)", 0.90),
    ]
}

fn disbursement_quality_gate() -> Condition {
    Condition::All(vec![
        Condition::at_least("monitoring", 0.95),
        Condition::at_least("sla", 0.90),
        Condition::at_least("notes_productivity", 0.90),
    ])
}

fn legalization_analyst() -> RoleDefinition {
    let mut inputs = disbursement_quality_inputs();
    inputs.push(InputSpec::count("updates_type_1", "Type 1 updates (units)"));
    inputs.push(InputSpec::count("updates_type_2", "Type 2 updates (units)"));

    RoleDefinition {
        id: "legalization-analyst",
        title: "Legalization Analyst",
        currency: Currency::COP,
        inputs,
        gate: disbursement_quality_gate(),
        gate_scope: GateScope::DisbursementOnly,
        formula: PayoutFormula::Lines(vec![
            LineRule::new(
                "Disbursement commission",
                LineKind::Disbursement,
                Formula::Excess {
                    units_key: "disbursements_month",
                    minimum_free_units: 20,
                    unit_rate: 75_000.0,
                },
            ),
            LineRule::variable(
                "Updates",
                Formula::Weighted(vec![("updates_type_1", 30_000.0), ("updates_type_2", 50_000.0)]),
            ),
        ]),
    }
}

fn disbursement_lead() -> RoleDefinition {
    RoleDefinition {
        id: "disbursement-lead",
        title: "Disbursement Lead",
        currency: Currency::COP,
        inputs: disbursement_quality_inputs(),
        gate: disbursement_quality_gate(),
        gate_scope: GateScope::All,
        formula: PayoutFormula::Lines(vec![LineRule::variable(
            COMMISSION,
            Formula::Excess {
                units_key: "disbursements_month",
                minimum_free_units: 250,
                unit_rate: 10_000.0,
            },
        )]),
    }
}

fn disbursement_manager(goals: &GoalTables) -> RoleDefinition {
    let goal = |goals: [u32; 12]| Goal::ByMonth {
        month_key: "month",
        goals,
    };
    RoleDefinition {
        id: "disbursement-manager",
        title: "Disbursement and Customer Success Manager",
        currency: Currency::COP,
        inputs: vec![
            InputSpec::choice("month", "Month", &SPANISH_MONTHS, SPANISH_MONTHS[0]),
            InputSpec::count("disbursements_month", "Disbursements (month)"),
        ],
        gate: Condition::Always,
        gate_scope: GateScope::All,
        formula: PayoutFormula::Lines(vec![
            LineRule::new("Fixed monthly", LineKind::Fixed, Formula::Flat(10_000_000.0)),
            LineRule::variable(
                VARIABLE,
                Formula::Step(vec![
                    (
                        Condition::AtLeast {
                            key: "disbursements_month",
                            goal: goal(goals.disbursement_full),
                        },
                        2_000_000.0,
                    ),
                    (
                        Condition::AtLeast {
                            key: "disbursements_month",
                            goal: goal(goals.disbursement_reduced),
                        },
                        1_250_000.0,
                    ),
                ]),
            ),
        ]),
    }
}

fn lead_inputs() -> Vec<InputSpec> {
    vec![
        InputSpec::count("approvals_month", "Bank approvals (month)"),
        InputSpec::count("approvals_quarter", "Bank approvals (quarter)"),
        InputSpec::count("reviews_quarter", "5-star Google reviews (quarter)"),
    ]
}

fn reviews_bonus(goal: f64) -> LineRule {
    LineRule::variable(
        REVIEWS_BONUS,
        Formula::Step(vec![(Condition::at_least("reviews_quarter", goal), LEAD_HALF_STEP)]),
    )
}

fn agreements_lead(goals: &GoalTables) -> RoleDefinition {
    let mut inputs = lead_inputs();
    inputs.insert(1, InputSpec::choice("quarter", "Quarter", &QUARTER_KEYS, QUARTER_KEYS[0]));

    RoleDefinition {
        id: "agreements-lead",
        title: "Agreements Lead",
        currency: Currency::COP,
        inputs,
        gate: Condition::Always,
        gate_scope: GateScope::All,
        formula: PayoutFormula::Lines(vec![
            LineRule::variable(
                APPROVALS_COMMISSION,
                Formula::Step(vec![(Condition::at_least("approvals_month", 85.0), LEAD_STEP)]),
            ),
            LineRule::variable(
                APPROVALS_BONUS,
                Formula::Step(vec![(
                    Condition::AtLeast {
                        key: "approvals_quarter",
                        goal: Goal::ByQuarter {
                            quarter_key: "quarter",
                            goals: goals.agreements_quarter,
                        },
                    },
                    LEAD_STEP,
                )]),
            ),
            reviews_bonus(250.0),
        ]),
    }
}

fn used_housing_lead() -> RoleDefinition {
    RoleDefinition {
        id: "used-housing-lead",
        title: "Used Housing and UPF Lead",
        currency: Currency::COP,
        inputs: lead_inputs(),
        gate: Condition::Always,
        gate_scope: GateScope::All,
        formula: PayoutFormula::Lines(vec![
            LineRule::variable(
                APPROVALS_COMMISSION,
                Formula::Step(vec![(Condition::at_least("approvals_month", 120.0), LEAD_STEP)]),
            ),
            LineRule::variable(
                APPROVALS_BONUS,
                Formula::Step(vec![(Condition::at_least("approvals_quarter", 325.0), LEAD_STEP)]),
            ),
            reviews_bonus(325.0),
        ]),
    }
}

fn new_housing_lead() -> RoleDefinition {
    RoleDefinition {
        id: "new-housing-lead",
        title: "New Housing and Vivecasas Lead",
        currency: Currency::COP,
        inputs: vec![
            InputSpec::count("approvals_month_total", "Bank approvals, total (month)"),
            InputSpec::count("approvals_month_vivecasas", "Vivecasas approvals (month)"),
            InputSpec::count("approvals_month_new", "New housing approvals (month)"),
            InputSpec::count("approvals_quarter", "Bank approvals (quarter)"),
            InputSpec::count("reviews_quarter", "5-star Google reviews (quarter)"),
        ],
        gate: Condition::Always,
        gate_scope: GateScope::All,
        formula: PayoutFormula::Lines(vec![
            LineRule::variable(
                APPROVALS_COMMISSION,
                Formula::Step(vec![
                    (Condition::at_least("approvals_month_total", 200.0), LEAD_STEP),
                    (
                        Condition::Any(vec![
                            Condition::Above {
                                key: "approvals_month_vivecasas",
                                threshold: 60.0,
                            },
                            Condition::Above {
                                key: "approvals_month_new",
                                threshold: 140.0,
                            },
                        ]),
                        LEAD_HALF_STEP,
                    ),
                ]),
            ),
            LineRule::variable(
                APPROVALS_BONUS,
                Formula::Step(vec![(Condition::at_least("approvals_quarter", 575.0), LEAD_STEP)]),
            ),
            reviews_bonus(500.0),
        ]),
    }
}

fn credit_analysis_manager(goals: &GoalTables) -> RoleDefinition {
    let goal = |goals: [u32; 4]| Goal::ByQuarter {
        quarter_key: "quarter",
        goals,
    };
    RoleDefinition {
        id: "credit-analysis-manager",
        title: "Credit Analysis and Management Manager",
        currency: Currency::EUR,
        inputs: vec![
            InputSpec::choice("quarter", "Quarter", &QUARTER_KEYS, QUARTER_KEYS[0]),
            InputSpec::count("approvals_month", "Bank approvals (month)"),
        ],
        gate: Condition::Always,
        gate_scope: GateScope::All,
        formula: PayoutFormula::Lines(vec![LineRule::variable(
            VARIABLE,
            Formula::Step(vec![
                (
                    Condition::AtLeast {
                        key: "approvals_month",
                        goal: goal(goals.analysis_full),
                    },
                    700.0,
                ),
                (
                    Condition::AtLeast {
                        key: "approvals_month",
                        goal: goal(goals.analysis_reduced),
                    },
                    450.0,
                ),
            ]),
        )]),
    }
}

fn consultant(tier: ConsultantTier) -> RoleDefinition {
    let (id, title) = match tier {
        ConsultantTier::Apprentice => ("consultant-apprentice", "Consultant - Apprentice"),
        ConsultantTier::Entrepreneur => ("consultant-entrepreneur", "Consultant - Entrepreneur"),
        ConsultantTier::Expert => ("consultant-expert", "Consultant - Expert"),
    };
    RoleDefinition {
        id,
        title,
        currency: Currency::USD,
        inputs: ConsultantPlan::input_specs(),
        gate: Condition::Always,
        gate_scope: GateScope::All,
        formula: PayoutFormula::Consultant(ConsultantPlan::for_tier(tier)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_size_and_order() {
        let roles = roles(&GoalTables::default());
        assert_eq!(roles.len(), 17);
        assert_eq!(roles[0].id, "credit-manager-upf");
        assert_eq!(roles[16].id, "consultant-expert");
    }

    #[test]
    fn test_only_legalization_scopes_to_disbursement() {
        for role in roles(&GoalTables::default()) {
            let expected = if role.id == "legalization-analyst" {
                GateScope::DisbursementOnly
            } else {
                GateScope::All
            };
            assert_eq!(role.gate_scope, expected, "{}", role.id);
        }
    }

    #[test]
    fn test_custom_goals_flow_into_roles() {
        let mut goals = GoalTables::default();
        goals.agreements_quarter = [1, 2, 3, 4];
        let roles = roles(&goals);
        let lead = roles.iter().find(|r| r.id == "agreements-lead").unwrap();
        let PayoutFormula::Lines(lines) = &lead.formula else {
            panic!("agreements lead should use line rules");
        };
        let Formula::Step(tiers) = &lines[1].formula else {
            panic!("quarterly bonus should be a step");
        };
        assert!(matches!(
            &tiers[0].0,
            Condition::AtLeast { goal: Goal::ByQuarter { goals: [1, 2, 3, 4], .. }, .. }
        ));
    }
}
