/// Ascending-threshold step function: the first row whose threshold the
/// value reaches awards its points, otherwise `floor_points`.
#[derive(Debug, Clone, Copy)]
pub struct StepTable {
    pub steps: &'static [(f64, i64)],
    pub floor_points: i64,
}

impl StepTable {
    pub fn points(self, value: f64) -> i64 {
        self.steps
            .iter()
            .find(|(threshold, _)| value >= *threshold)
            .map_or(self.floor_points, |(_, points)| *points)
    }

    pub fn max_points(self) -> i64 {
        self.steps
            .iter()
            .map(|(_, points)| *points)
            .fold(self.floor_points, i64::max)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CreditPolicy {
    pub base_score: i64,
    pub min_score: i64,
    pub max_score: i64,
    pub frequency: StepTable,
    pub balance: StepTable,
    pub consistency: StepTable,
    pub payment_history: StepTable,
    pub overdraft_points_each: i64,
    pub overdraft_penalty_cap: i64,
    /// Points each factor must reach before its tip is withheld.
    pub frequency_tip_floor: i64,
    pub balance_tip_floor: i64,
    pub consistency_tip_floor: i64,
    pub payment_history_tip_floor: i64,
    pub income_tip_floor: f64,
}

impl CreditPolicy {
    pub fn overdraft_penalty(self, overdraft_count: u32) -> i64 {
        (i64::from(overdraft_count) * self.overdraft_points_each).min(self.overdraft_penalty_cap)
    }

    pub fn clamp(self, raw: i64) -> i64 {
        raw.clamp(self.min_score, self.max_score)
    }
}

pub const CREDIT_POLICY_V1: CreditPolicy = CreditPolicy {
    base_score: 500,
    min_score: 300,
    max_score: 900,
    frequency: StepTable {
        steps: &[
            (50.0, 100),
            (30.0, 85),
            (20.0, 70),
            (10.0, 50),
            (5.0, 30),
        ],
        floor_points: 10,
    },
    balance: StepTable {
        steps: &[
            (100_000.0, 150),
            (50_000.0, 130),
            (25_000.0, 110),
            (10_000.0, 90),
            (5_000.0, 70),
            (1_000.0, 50),
            (500.0, 30),
        ],
        floor_points: 10,
    },
    consistency: StepTable {
        steps: &[
            (0.9, 100),
            (0.8, 85),
            (0.7, 70),
            (0.6, 55),
            (0.5, 40),
            (0.3, 25),
        ],
        floor_points: 10,
    },
    payment_history: StepTable {
        steps: &[
            (95.0, 150),
            (85.0, 130),
            (75.0, 110),
            (65.0, 90),
            (50.0, 70),
            (30.0, 50),
        ],
        floor_points: 20,
    },
    overdraft_points_each: 10,
    overdraft_penalty_cap: 50,
    frequency_tip_floor: 50,
    balance_tip_floor: 90,
    consistency_tip_floor: 70,
    payment_history_tip_floor: 100,
    income_tip_floor: 50_000.0,
};

#[cfg(test)]
mod tests {
    use super::CREDIT_POLICY_V1;

    #[test]
    fn step_thresholds_are_inclusive() {
        let policy = CREDIT_POLICY_V1;
        assert_eq!(policy.frequency.points(50.0), 100);
        assert_eq!(policy.frequency.points(49.0), 85);
        assert_eq!(policy.frequency.points(4.0), 10);
        assert_eq!(policy.balance.points(500.0), 30);
        assert_eq!(policy.balance.points(499.99), 10);
        assert_eq!(policy.consistency.points(0.3), 25);
        assert_eq!(policy.consistency.points(0.29), 10);
        assert_eq!(policy.payment_history.points(95.0), 150);
        assert_eq!(policy.payment_history.points(29.0), 20);
    }

    #[test]
    fn steps_descend_strictly() {
        let policy = CREDIT_POLICY_V1;
        for table in [
            policy.frequency,
            policy.balance,
            policy.consistency,
            policy.payment_history,
        ] {
            for pair in table.steps.windows(2) {
                assert!(pair[0].0 > pair[1].0);
                assert!(pair[0].1 > pair[1].1);
            }
            assert!(table.steps.iter().all(|(_, points)| *points > table.floor_points));
        }
    }

    #[test]
    fn best_case_reaches_the_ceiling_before_clamping() {
        let policy = CREDIT_POLICY_V1;
        let best = policy.base_score
            + policy.frequency.max_points()
            + policy.balance.max_points()
            + policy.consistency.max_points()
            + policy.payment_history.max_points();
        assert_eq!(best, 1_000);
        assert_eq!(policy.clamp(best), policy.max_score);
    }

    #[test]
    fn overdraft_penalty_is_capped() {
        let policy = CREDIT_POLICY_V1;
        assert_eq!(policy.overdraft_penalty(0), 0);
        assert_eq!(policy.overdraft_penalty(3), 30);
        assert_eq!(policy.overdraft_penalty(9), 50);
    }
}
