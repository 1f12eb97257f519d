use chrono::NaiveDateTime;

use super::domain::{Alert, AlertKind, AlertPriority};
use crate::finance::{FinancialState, Profile};

/// Runs every threshold check against the profile. Checks are independent of one another;
/// within one metric only the most severe rung fires.
pub fn evaluate_profile(profile: &Profile, now: NaiveDateTime) -> Vec<Alert> {
    let state = FinancialState::of(profile);
    let mut alerts = Vec::new();
    let mut raise = |kind: AlertKind, priority: AlertPriority, message: String| {
        alerts.push(Alert::new(kind, priority, message, now));
    };

    let score = profile.credit_score;
    if score < 600 {
        raise(
            AlertKind::Error,
            AlertPriority::High,
            format!("Your credit score ({score}) is below 600. Consider improving your credit health."),
        );
    } else if score < 700 {
        raise(
            AlertKind::Warning,
            AlertPriority::Medium,
            format!("Your credit score ({score}) is moderate. Work on improving it for better loan terms."),
        );
    }

    let utilization = profile.credit_utilization;
    if utilization > 60.0 {
        raise(
            AlertKind::Error,
            AlertPriority::High,
            format!("High credit utilization ({utilization:?}%). Try to keep it below 30% for better credit health."),
        );
    } else if utilization > 30.0 {
        raise(
            AlertKind::Warning,
            AlertPriority::Medium,
            format!("Credit utilization ({utilization:?}%) is above recommended 30%. Consider reducing it."),
        );
    }

    if state.monthly_income > 0.0 {
        let dti = state.debt_to_income();
        if dti > 40.0 {
            raise(
                AlertKind::Error,
                AlertPriority::High,
                format!("High debt-to-income ratio ({dti:.1}%). Consider reducing debt."),
            );
        } else if dti > 30.0 {
            raise(
                AlertKind::Warning,
                AlertPriority::Medium,
                format!("Debt-to-income ratio ({dti:.1}%) is getting high. Monitor your finances."),
            );
        }
    }

    let savings = state.monthly_savings();
    if savings < 0.0 {
        raise(
            AlertKind::Error,
            AlertPriority::High,
            "You are spending more than your income. Review your expenses immediately.".to_string(),
        );
    } else if savings < state.monthly_income * 0.1 {
        raise(
            AlertKind::Warning,
            AlertPriority::Medium,
            "Low monthly savings. Aim to save at least 10-20% of your income.".to_string(),
        );
    }

    if !profile.loans.is_empty() {
        raise(
            AlertKind::Info,
            AlertPriority::Low,
            format!(
                "You have {} active loan(s). Ensure timely EMI payments.",
                profile.loans.len()
            ),
        );
    }

    if profile.num_credit_cards > 0 {
        raise(
            AlertKind::Info,
            AlertPriority::Low,
            format!(
                "Don't forget to pay your credit card bills on time. You have {} card(s).",
                profile.num_credit_cards
            ),
        );
    }

    alerts
}
