use serde::{Deserialize, Serialize};

use super::domain::{LoanOffer, Profile};
use super::features::total_emi;
use super::round_to;

/// Monthly installment breakdown, every field rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmiBreakdown {
    pub installment: f64,
    pub total_interest: f64,
    pub total_payable: f64,
}

/// Standard annuity installment for `principal` at `annual_rate` percent over `tenure_months`.
///
/// A zero rate falls back to straight-line repayment. Callers guarantee `tenure_months >= 1`;
/// a zero tenure is clamped to one month rather than dividing by zero.
pub fn calculate_emi(principal: f64, annual_rate: f64, tenure_months: u32) -> EmiBreakdown {
    let months = tenure_months.max(1);
    let (installment, total_interest) = if annual_rate == 0.0 {
        (principal / f64::from(months), 0.0)
    } else {
        let monthly_rate = annual_rate / 100.0 / 12.0;
        let growth = (1.0 + monthly_rate).powi(i32::try_from(months).unwrap_or(i32::MAX));
        // Past f64 range the annuity converges to paying the interest alone.
        let installment = if growth.is_finite() {
            principal * monthly_rate * growth / (growth - 1.0)
        } else {
            principal * monthly_rate
        };
        (installment, installment * f64::from(months) - principal)
    };

    EmiBreakdown {
        installment: round_to(installment, 2),
        total_interest: round_to(total_interest, 2),
        total_payable: round_to(principal + total_interest, 2),
    }
}

/// Result of checking whether a new installment fits the current budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Affordability {
    pub affordable: bool,
    pub available_income: f64,
    pub affordability_pct: f64,
    pub salary_used_pct: f64,
}

/// A new EMI is affordable when the monthly surplus covers it with a 20% buffer.
pub fn check_affordability(profile: &Profile, new_emi: f64) -> Affordability {
    let available_income =
        profile.monthly_income - profile.monthly_expense - total_emi(&profile.loans);

    let affordability_pct = if available_income > 0.0 {
        new_emi / available_income * 100.0
    } else {
        100.0
    };
    let salary_used_pct = if profile.monthly_income > 0.0 {
        new_emi / profile.monthly_income * 100.0
    } else {
        0.0
    };

    Affordability {
        affordable: available_income >= new_emi * 1.2,
        available_income,
        affordability_pct,
        salary_used_pct,
    }
}

/// One row of the lender comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferQuote {
    pub bank: String,
    pub loan_type: String,
    pub interest_rate: f64,
    pub emi: EmiBreakdown,
    pub processing_fee: Option<String>,
}

pub fn compare_offers(
    offers: &[LoanOffer],
    amount: f64,
    tenure_years: u32,
    loan_type: Option<&str>,
) -> Vec<OfferQuote> {
    offers
        .iter()
        .filter(|offer| loan_type.map_or(true, |wanted| offer.loan_type == wanted))
        .map(|offer| OfferQuote {
            bank: offer.bank.clone(),
            loan_type: offer.loan_type.clone(),
            interest_rate: offer.interest_rate,
            emi: calculate_emi(amount, offer.interest_rate, tenure_years.saturating_mul(12)),
            processing_fee: offer.processing_fee.clone(),
        })
        .collect()
}
