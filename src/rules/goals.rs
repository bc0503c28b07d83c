//! Monthly and quarterly goal tables for manager and leader roles

use serde::Serialize;

/// Goals that vary by calendar month or fiscal quarter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalTables {
    /// Disbursements per month for the full (100%) variable, January first
    pub disbursement_full: [u32; 12],
    /// Disbursements per month for the reduced (95%) variable
    pub disbursement_reduced: [u32; 12],
    /// Monthly approvals by quarter for the full (100%) variable
    pub analysis_full: [u32; 4],
    /// Monthly approvals by quarter for the reduced (95%) variable
    pub analysis_reduced: [u32; 4],
    /// Quarterly bank approvals unlocking the agreements lead's quarterly bonus
    pub agreements_quarter: [u32; 4],
}

impl Default for GoalTables {
    fn default() -> Self {
        Self {
            disbursement_full: [278, 298, 338, 316, 318, 297, 350, 330, 360, 350, 342, 338],
            disbursement_reduced: [264, 283, 321, 300, 302, 282, 333, 314, 342, 333, 325, 321],
            analysis_full: [405, 440, 500, 575],
            analysis_reduced: [385, 418, 475, 546],
            agreements_quarter: [250, 275, 275, 300],
        }
    }
}

impl GoalTables {
    /// Reduced goals must never exceed the matching full goals
    pub fn is_consistent(&self) -> bool {
        let months = self
            .disbursement_reduced
            .iter()
            .zip(self.disbursement_full.iter())
            .all(|(reduced, full)| reduced <= full);
        let quarters = self
            .analysis_reduced
            .iter()
            .zip(self.analysis_full.iter())
            .all(|(reduced, full)| reduced <= full);
        months && quarters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_goals() {
        let goals = GoalTables::default();
        assert_eq!(goals.disbursement_full[0], 278);
        assert_eq!(goals.disbursement_reduced[8], 342);
        assert_eq!(goals.analysis_full[3], 575);
        assert_eq!(goals.agreements_quarter[1], 275);
        assert!(goals.is_consistent());
    }

    #[test]
    fn test_inconsistent_goals_detected() {
        let mut goals = GoalTables::default();
        goals.analysis_reduced[0] = 500;
        assert!(!goals.is_consistent());
    }
}
