use crate::commands::{print_alerts, print_credit_health, print_outlook, print_what_if};
use chrono::{Duration, Local, NaiveDateTime};
use clap::Args;
use credo::config::AppConfig;
use credo::dashboard::DashboardService;
use credo::error::AppError;
use credo::finance::{CreditHistoryEntry, Loan, LoanOffer, Profile, Scenario};
use credo::modeling::ModelStore;
use credo::storage::InMemoryStore;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Directory for trained models (defaults to the configured model directory).
    #[arg(long)]
    pub(crate) model_dir: Option<PathBuf>,
    /// Skip the model-backed portion of the walkthrough.
    #[arg(long)]
    pub(crate) skip_predictions: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let model_dir = args.model_dir.unwrap_or(config.storage.model_dir);
    let now = Local::now().naive_local();

    let store = Arc::new(
        InMemoryStore::new()
            .with_offers(sample_offers())
            .with_history(sample_history(now)),
    );
    let models = Arc::new(ModelStore::new(model_dir, config.training));
    let service = DashboardService::new(store, models);

    println!("Credit health demo");
    let profile = service.update_profile(sample_profile())?;
    println!(
        "Profile: income {:.0} | expenses {:.0} | score {} | utilization {}% | {} loan(s)",
        profile.monthly_income,
        profile.monthly_expense,
        profile.credit_score,
        profile.credit_utilization,
        profile.loans.len()
    );

    let overview = service.overview()?;
    println!("\nMonthly picture");
    println!(
        "- EMIs {:.0} | savings {:.0} | debt-to-income {:.1}% | savings rate {:.1}%",
        overview.total_emi, overview.monthly_savings, overview.debt_to_income, overview.savings_rate
    );
    println!(
        "- Utilization is {} | health score {}/100 ({})",
        overview.utilization_band.label(),
        overview.health.score,
        overview.health.band.summary()
    );

    if let Some(analysis) = service.history_analysis() {
        println!("\nCredit history ({} entries)", analysis.entries);
        println!(
            "- Current {} | average {:.0} | range {}-{} | trend {:+.0} | volatility {:?}",
            analysis.current,
            analysis.average,
            analysis.lowest,
            analysis.highest,
            analysis.overall_trend,
            analysis.volatility
        );
    }

    if !args.skip_predictions {
        println!("\nLoading models (first run trains them, which takes a while)...");
        let outlook = service.outlook()?;
        println!();
        print_credit_health(&outlook.current);
        println!();
        print_outlook(&outlook);

        for scenario in sample_scenarios() {
            println!();
            let prediction = service.what_if(&scenario)?;
            print_what_if(&scenario, &prediction);
        }
    }

    println!();
    let alerts = service.refresh_alerts()?;
    print_alerts(&alerts);

    let new_emi = 15_000.0;
    let check = service.affordability(new_emi)?;
    println!("\nAffordability of a {new_emi:.0} EMI");
    println!(
        "- {} | uses {:.1}% of the monthly surplus and {:.1}% of salary",
        if check.affordable { "Affordable" } else { "Not affordable" },
        check.affordability_pct,
        check.salary_used_pct
    );

    println!("\nPersonal loan offers for 500000 over 5 years");
    for quote in service.compare_offers(500_000.0, 5, Some("Personal"))? {
        println!(
            "- {} at {}%: EMI {:.2} | interest {:.2} | fee {}",
            quote.bank,
            quote.interest_rate,
            quote.emi.installment,
            quote.emi.total_interest,
            quote.processing_fee.as_deref().unwrap_or("none")
        );
    }

    Ok(())
}

fn sample_profile() -> Profile {
    let mut profile = Profile::new(85_000.0, 42_000.0, 690, 38.0)
        .with_cards(3)
        .with_loan(Loan::new(600_000.0, 14_500.0, 48))
        .with_loan(Loan::new(120_000.0, 4_200.0, 18));
    profile.name = Some("Demo User".to_string());
    profile
}

/// Quarterly observations leading up to `now`, oldest first.
fn sample_history(now: NaiveDateTime) -> Vec<CreditHistoryEntry> {
    [(360, 642), (270, 655), (180, 661), (90, 674)]
        .into_iter()
        .map(|(days_ago, credit_score)| CreditHistoryEntry {
            date: now - Duration::days(days_ago),
            credit_score,
            notes: "Bureau refresh".to_string(),
        })
        .collect()
}

fn sample_offers() -> Vec<LoanOffer> {
    [
        ("HDFC Bank", "Personal", 10.5, Some("Up to 2.5%")),
        ("ICICI Bank", "Personal", 10.75, Some("Up to 2%")),
        ("SBI", "Personal", 11.15, None),
        ("SBI", "Home", 8.5, Some("0.35%")),
        ("Axis Bank", "Car", 9.2, Some("Rs 3,500")),
    ]
    .into_iter()
    .map(|(bank, loan_type, interest_rate, fee)| LoanOffer {
        bank: bank.to_string(),
        loan_type: loan_type.to_string(),
        interest_rate,
        processing_fee: fee.map(str::to_string),
    })
    .collect()
}

fn sample_scenarios() -> [Scenario; 4] {
    [
        Scenario::NewLoan {
            amount: 500_000.0,
            annual_rate: 10.5,
            tenure_years: 5,
        },
        Scenario::ExpenseIncrease { delta: 10_000.0 },
        Scenario::IncomeIncrease { delta: 20_000.0 },
        Scenario::PayOffLoan { loan_index: 1 },
    ]
}
