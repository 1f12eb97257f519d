use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use super::{draw_base, label_noise, BaseRanges};
use crate::finance::HealthFeatures;
use crate::modeling::policy::{HealthLabelingPolicy, RiskCategory};

/// One labelled borrower for the risk classifier and eligibility regressor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HealthSample {
    pub features: HealthFeatures,
    pub risk_category: RiskCategory,
    pub eligibility: f64,
}

const HEALTH_RANGES: BaseRanges = BaseRanges {
    credit_score: 300.0..900.0,
    credit_utilization: 0.0..100.0,
};

/// Deterministic for a given `(count, seed)`.
pub fn generate_health_samples(count: usize, seed: u64) -> Vec<HealthSample> {
    let mut rng = StdRng::seed_from_u64(seed);
    let policy = HealthLabelingPolicy;

    (0..count)
        .map(|_| {
            let base = draw_base(&mut rng, &HEALTH_RANGES);
            let features =
                HealthFeatures::from_parts(&base.state, base.credit_score, base.num_credit_cards);
            let noise = label_noise(&mut rng);
            HealthSample {
                features,
                risk_category: policy.risk_category(&features),
                eligibility: policy.eligibility(&features, noise),
            }
        })
        .collect()
}
