use serde::{Deserialize, Serialize};

use super::domain::Profile;
use super::emi::calculate_emi;
use super::features::FinancialState;

/// A hypothetical change to simulate against a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Scenario {
    NewLoan {
        amount: f64,
        annual_rate: f64,
        tenure_years: u32,
    },
    ExpenseIncrease {
        delta: f64,
    },
    IncomeIncrease {
        delta: f64,
    },
    PayOffLoan {
        loan_index: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    NewLoan,
    ExpenseIncrease,
    IncomeIncrease,
    PayOffLoan,
}

impl ScenarioKind {
    pub const ALL: [Self; 4] = [
        Self::NewLoan,
        Self::ExpenseIncrease,
        Self::IncomeIncrease,
        Self::PayOffLoan,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::NewLoan => "new_loan",
            Self::ExpenseIncrease => "expense_increase",
            Self::IncomeIncrease => "income_increase",
            Self::PayOffLoan => "pay_off_loan",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScenarioError {
    #[error("{field} must be a finite, non-negative number (found {value})")]
    InvalidAmount { field: &'static str, value: f64 },
    #[error("loan tenure must be at least one year")]
    ZeroTenure,
    #[error("loan index {index} is out of range for {loans} active loan(s)")]
    LoanIndexOutOfRange { index: usize, loans: usize },
}

impl Scenario {
    pub fn kind(&self) -> ScenarioKind {
        match self {
            Scenario::NewLoan { .. } => ScenarioKind::NewLoan,
            Scenario::ExpenseIncrease { .. } => ScenarioKind::ExpenseIncrease,
            Scenario::IncomeIncrease { .. } => ScenarioKind::IncomeIncrease,
            Scenario::PayOffLoan { .. } => ScenarioKind::PayOffLoan,
        }
    }

    pub fn validate(&self, profile: &Profile) -> Result<(), ScenarioError> {
        match self {
            Scenario::NewLoan {
                amount,
                annual_rate,
                tenure_years,
            } => {
                finite_non_negative("amount", *amount)?;
                finite_non_negative("annual_rate", *annual_rate)?;
                if *tenure_years == 0 {
                    return Err(ScenarioError::ZeroTenure);
                }
                Ok(())
            }
            Scenario::ExpenseIncrease { delta } | Scenario::IncomeIncrease { delta } => {
                finite_non_negative("delta", *delta)
            }
            Scenario::PayOffLoan { loan_index } => {
                if *loan_index < profile.loans.len() {
                    Ok(())
                } else {
                    Err(ScenarioError::LoanIndexOutOfRange {
                        index: *loan_index,
                        loans: profile.loans.len(),
                    })
                }
            }
        }
    }

    /// Cash-flow state after the change. The profile itself is never modified.
    pub fn apply(&self, profile: &Profile) -> Result<FinancialState, ScenarioError> {
        self.validate(profile)?;
        let before = FinancialState::of(profile);
        let mut after = before;

        match self {
            Scenario::NewLoan {
                amount,
                annual_rate,
                tenure_years,
            } => {
                let emi = calculate_emi(*amount, *annual_rate, tenure_years.saturating_mul(12));
                after.total_emi = before.total_emi + emi.installment;
                after.credit_utilization = (before.credit_utilization + 10.0).min(100.0);
            }
            Scenario::ExpenseIncrease { delta } => {
                after.monthly_expense = before.monthly_expense + delta;
                after.credit_utilization = (before.credit_utilization + 5.0).min(100.0);
            }
            Scenario::IncomeIncrease { delta } => {
                after.monthly_income = before.monthly_income + delta;
                after.credit_utilization = (before.credit_utilization - 5.0).max(0.0);
            }
            Scenario::PayOffLoan { loan_index } => {
                after.total_emi = before.total_emi - profile.loans[*loan_index].emi;
                after.credit_utilization = (before.credit_utilization - 10.0).max(0.0);
            }
        }

        Ok(after)
    }
}

fn finite_non_negative(field: &'static str, value: f64) -> Result<(), ScenarioError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ScenarioError::InvalidAmount { field, value })
    }
}
