//! Zeroing policy applied when a role's eligibility gate fails

use crate::payout::{LineKind, PayoutLine};
use crate::rules::GateScope;

/// Apply the gate outcome to raw payout lines
///
/// An eligible role keeps every line. Otherwise a disbursement-only scope zeroes
/// just the disbursement lines; when a role has none it falls back to zeroing
/// every non-fixed line, which is also what the `All` scope does.
pub fn apply_gate(scope: GateScope, eligible: bool, lines: Vec<PayoutLine>) -> Vec<PayoutLine> {
    if eligible {
        return lines;
    }

    let has_disbursement = lines.iter().any(|line| line.kind == LineKind::Disbursement);
    let zero_only_disbursement = scope == GateScope::DisbursementOnly && has_disbursement;

    lines
        .into_iter()
        .map(|line| {
            let zero = if zero_only_disbursement {
                line.kind == LineKind::Disbursement
            } else {
                !line.kind.is_fixed()
            };
            if zero {
                line.zeroed()
            } else {
                line
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines() -> Vec<PayoutLine> {
        vec![
            PayoutLine::new("Fixed monthly", LineKind::Fixed, 10_000_000.0),
            PayoutLine::new("Disbursement commission", LineKind::Disbursement, 750_000.0),
            PayoutLine::variable("Updates", 80_000.0),
        ]
    }

    fn amounts(lines: &[PayoutLine]) -> Vec<f64> {
        lines.iter().map(|line| line.amount).collect()
    }

    #[test]
    fn test_eligible_keeps_everything() {
        let kept = apply_gate(GateScope::All, true, lines());
        assert_eq!(kept, lines());
    }

    #[test]
    fn test_all_scope_zeroes_every_non_fixed_line() {
        let gated = apply_gate(GateScope::All, false, lines());
        assert_eq!(amounts(&gated), vec![10_000_000.0, 0.0, 0.0]);
    }

    #[test]
    fn test_disbursement_scope_zeroes_only_disbursement() {
        let gated = apply_gate(GateScope::DisbursementOnly, false, lines());
        assert_eq!(amounts(&gated), vec![10_000_000.0, 0.0, 80_000.0]);
    }

    #[test]
    fn test_disbursement_scope_without_disbursement_line_falls_back() {
        let raw = vec![
            PayoutLine::new("Fixed monthly", LineKind::Fixed, 1.0),
            PayoutLine::variable("Monthly commission", 2.0),
        ];
        let gated = apply_gate(GateScope::DisbursementOnly, false, raw);
        assert_eq!(amounts(&gated), vec![1.0, 0.0]);
    }

    #[test]
    fn test_line_order_and_names_preserved() {
        let gated = apply_gate(GateScope::All, false, lines());
        let names: Vec<_> = gated.iter().map(|line| line.name.as_str()).collect();
        assert_eq!(names, vec!["Fixed monthly", "Disbursement commission", "Updates"]);
    }
}
