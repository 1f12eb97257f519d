use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const MIN_CREDIT_SCORE: u16 = 300;
pub const MAX_CREDIT_SCORE: u16 = 900;

/// Snapshot of a user's finances. Every derived metric and prediction is computed from this value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<NaiveDate>,
    pub monthly_income: f64,
    pub monthly_expense: f64,
    pub credit_score: u16,
    pub credit_utilization: f64,
    #[serde(default)]
    pub num_credit_cards: u32,
    #[serde(default, rename = "current_loans")]
    pub loans: Vec<Loan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<NaiveDateTime>,
}

impl Profile {
    pub fn new(
        monthly_income: f64,
        monthly_expense: f64,
        credit_score: u16,
        credit_utilization: f64,
    ) -> Self {
        Self {
            name: None,
            birthdate: None,
            monthly_income,
            monthly_expense,
            credit_score,
            credit_utilization,
            num_credit_cards: 0,
            loans: Vec::new(),
            last_updated: None,
        }
    }

    pub fn with_cards(mut self, num_credit_cards: u32) -> Self {
        self.num_credit_cards = num_credit_cards;
        self
    }

    pub fn with_loan(mut self, loan: Loan) -> Self {
        self.loans.push(loan);
        self
    }

    /// Rejects values outside the documented domains so no NaN/infinite ratio reaches a model.
    pub fn validate(&self) -> Result<(), ProfileError> {
        non_negative("monthly_income", self.monthly_income)?;
        non_negative("monthly_expense", self.monthly_expense)?;

        if !(MIN_CREDIT_SCORE..=MAX_CREDIT_SCORE).contains(&self.credit_score) {
            return Err(ProfileError::CreditScoreOutOfRange(self.credit_score));
        }

        if !self.credit_utilization.is_finite()
            || !(0.0..=100.0).contains(&self.credit_utilization)
        {
            return Err(ProfileError::UtilizationOutOfRange(self.credit_utilization));
        }

        for (index, loan) in self.loans.iter().enumerate() {
            if !loan.amount.is_finite() || loan.amount < 0.0 {
                return Err(ProfileError::InvalidLoan {
                    index,
                    field: "amount",
                });
            }
            if !loan.emi.is_finite() || loan.emi < 0.0 {
                return Err(ProfileError::InvalidLoan { index, field: "emi" });
            }
        }

        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ProfileError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ProfileError::NegativeAmount { field, value })
    }
}

/// An active loan. Only `emi` participates in the ratios; `amount` labels payoff choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub amount: f64,
    pub emi: f64,
    #[serde(default)]
    pub remaining_tenure: u32,
}

impl Loan {
    pub fn new(amount: f64, emi: f64, remaining_tenure: u32) -> Self {
        Self {
            amount,
            emi,
            remaining_tenure,
        }
    }
}

/// Point-in-time credit score observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditHistoryEntry {
    pub date: NaiveDateTime,
    pub credit_score: u16,
    #[serde(default)]
    pub notes: String,
}

/// A lender's advertised product, used by the loan comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanOffer {
    pub bank: String,
    #[serde(rename = "type")]
    pub loan_type: String,
    pub interest_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_fee: Option<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("{field} must be a non-negative amount (found {value})")]
    NegativeAmount { field: &'static str, value: f64 },
    #[error("credit score {0} is outside 300-900")]
    CreditScoreOutOfRange(u16),
    #[error("credit utilization {0} is outside 0-100")]
    UtilizationOutOfRange(f64),
    #[error("loan #{index} has an invalid {field}")]
    InvalidLoan { index: usize, field: &'static str },
}
