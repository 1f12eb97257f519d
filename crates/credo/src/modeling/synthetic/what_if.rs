use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::{draw_base, label_noise, BaseDraw, BaseRanges};
use crate::finance::{calculate_emi, FinancialState, HealthFeatures, ScenarioKind, WhatIfFeatures};
use crate::modeling::policy::{RiskCategory, ScenarioLabelingPolicy};

/// One simulated change with its heuristic outcome labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WhatIfSample {
    pub scenario: ScenarioKind,
    pub features: WhatIfFeatures,
    pub predicted_score: f64,
    pub predicted_risk: RiskCategory,
    pub predicted_eligibility: f64,
}

const WHAT_IF_RANGES: BaseRanges = BaseRanges {
    credit_score: 400.0..850.0,
    credit_utilization: 0.0..80.0,
};

/// Deterministic for a given `(count, seed)`. Scenario types are drawn uniformly.
pub fn generate_what_if_samples(count: usize, seed: u64) -> Vec<WhatIfSample> {
    let mut rng = StdRng::seed_from_u64(seed);
    let policy = ScenarioLabelingPolicy::default();

    (0..count)
        .map(|_| {
            let base = draw_base(&mut rng, &WHAT_IF_RANGES);
            let scenario = ScenarioKind::ALL[rng.random_range(0..ScenarioKind::ALL.len())];
            let after = perturb(&mut rng, scenario, &base.state);
            label(&mut rng, &policy, scenario, &base, after)
        })
        .collect()
}

fn perturb(rng: &mut StdRng, scenario: ScenarioKind, before: &FinancialState) -> FinancialState {
    let mut after = *before;
    match scenario {
        ScenarioKind::NewLoan => {
            let amount = rng.random_range(50_000.0..1_000_000.0);
            let rate = rng.random_range(8.0..18.0);
            let years = rng.random_range(1u32..=9);
            after.total_emi += calculate_emi(amount, rate, years * 12).installment;
            after.credit_utilization =
                (before.credit_utilization + rng.random_range(5.0..15.0)).min(100.0);
        }
        ScenarioKind::ExpenseIncrease => {
            after.monthly_expense += rng.random_range(5_000.0..50_000.0);
            after.credit_utilization =
                (before.credit_utilization + rng.random_range(3.0..10.0)).min(100.0);
        }
        ScenarioKind::IncomeIncrease => {
            after.monthly_income += rng.random_range(10_000.0..100_000.0);
            after.credit_utilization =
                (before.credit_utilization - rng.random_range(2.0..8.0)).max(0.0);
        }
        ScenarioKind::PayOffLoan => {
            let cleared = if before.total_emi > 0.0 {
                rng.random_range(0.0..before.total_emi)
            } else {
                0.0
            };
            after.total_emi -= cleared;
            after.credit_utilization =
                (before.credit_utilization - rng.random_range(5.0..15.0)).max(0.0);
        }
    }
    after
}

fn label(
    rng: &mut StdRng,
    policy: &ScenarioLabelingPolicy,
    scenario: ScenarioKind,
    base: &BaseDraw,
    after: FinancialState,
) -> WhatIfSample {
    let noise = label_noise(rng);
    let predicted_score = policy.predicted_score(base.credit_score, &base.state, &after, noise);
    let predicted_risk = policy.categorize(predicted_score, &after);
    let predicted_eligibility = rng.random_range(policy.eligibility_range(predicted_risk));

    WhatIfSample {
        scenario,
        features: WhatIfFeatures {
            before: HealthFeatures::from_parts(
                &base.state,
                base.credit_score,
                base.num_credit_cards,
            ),
            after,
        },
        predicted_score,
        predicted_risk,
        predicted_eligibility,
    }
}
