//! Seeded synthetic datasets for the health and what-if models, plus CSV export.

mod health;
mod what_if;

use std::io::Write;
use std::ops::Range;

use rand::rngs::StdRng;
use rand::Rng;

use crate::finance::FinancialState;

pub use health::{generate_health_samples, HealthSample};
pub use what_if::{generate_what_if_samples, WhatIfSample};

/// Ranges for the credit score and utilisation draws; everything else is shared.
#[derive(Debug, Clone)]
pub(crate) struct BaseRanges {
    pub credit_score: Range<f64>,
    pub credit_utilization: Range<f64>,
}

/// A drawn borrower before any labels are attached.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BaseDraw {
    pub state: FinancialState,
    pub credit_score: f64,
    pub num_credit_cards: f64,
}

pub(crate) fn draw_base(rng: &mut StdRng, ranges: &BaseRanges) -> BaseDraw {
    let monthly_income = rng.random_range(20_000.0..200_000.0);
    let monthly_expense = rng.random_range(10_000.0..monthly_income * 0.8);
    let credit_score = rng.random_range(ranges.credit_score.clone());
    let credit_utilization = rng.random_range(ranges.credit_utilization.clone());
    let num_credit_cards = f64::from(rng.random_range(0u32..=4));
    let num_loans = rng.random_range(0usize..=3);
    let total_emi: f64 = (0..num_loans)
        .map(|_| rng.random_range(2_000.0..20_000.0))
        .sum();

    BaseDraw {
        state: FinancialState {
            monthly_income,
            monthly_expense,
            total_emi,
            credit_utilization,
        },
        credit_score,
        num_credit_cards,
    }
}

/// Label noise shared by both generators.
pub(crate) fn label_noise(rng: &mut StdRng) -> f64 {
    rng.random_range(-5.0..5.0)
}

pub fn write_health_csv<W: Write>(samples: &[HealthSample], writer: W) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    let mut header: Vec<&str> = crate::finance::HEALTH_SCHEMA.fields.to_vec();
    header.extend(["risk_category", "eligibility_probability"]);
    out.write_record(&header)?;

    for sample in samples {
        let mut record: Vec<String> = sample
            .features
            .to_vector()
            .iter()
            .map(|value| value.to_string())
            .collect();
        record.push(sample.risk_category.label().to_string());
        record.push(sample.eligibility.to_string());
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_what_if_csv<W: Write>(samples: &[WhatIfSample], writer: W) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    let mut header: Vec<&str> = vec!["scenario_type"];
    header.extend(crate::finance::WHAT_IF_SCHEMA.fields.iter().copied());
    header.extend(["predicted_score", "predicted_risk", "predicted_eligibility"]);
    out.write_record(&header)?;

    for sample in samples {
        let mut record = vec![sample.scenario.label().to_string()];
        record.extend(
            sample
                .features
                .to_vector()
                .iter()
                .map(|value| value.to_string()),
        );
        record.push(sample.predicted_score.to_string());
        record.push(sample.predicted_risk.label().to_string());
        record.push(sample.predicted_eligibility.to_string());
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}
