use crate::infra::{describe_scenario, open_dashboard, FileDashboard};
use clap::{Args, Subcommand};
use credo::alerts::{Alert, AlertPriority};
use credo::config::AppConfig;
use credo::dashboard::emi_for;
use credo::error::AppError;
use credo::finance::Scenario;
use credo::modeling::{
    generate_health_samples, generate_what_if_samples, write_health_csv, write_what_if_csv,
    ModelError, ModelKind, TrainingSettings,
};
use credo::predict::{CreditHealthPrediction, ImprovementOutlook, WhatIfPrediction};
use credo::telemetry;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct EmiArgs {
    /// Loan principal
    #[arg(long)]
    pub(crate) principal: f64,
    /// Annual interest rate in percent
    #[arg(long)]
    pub(crate) rate: f64,
    /// Tenure in months
    #[arg(long)]
    pub(crate) months: u32,
}

#[derive(Args, Debug, Default)]
pub(crate) struct TrainArgs {
    /// Retrain every model even when valid artifacts exist
    #[arg(long)]
    pub(crate) force: bool,
    /// Also write the synthetic training sets as CSV files into this directory
    #[arg(long)]
    pub(crate) export_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ScenarioCommand {
    /// Take on a new loan
    NewLoan {
        #[arg(long)]
        amount: f64,
        /// Annual interest rate in percent
        #[arg(long)]
        rate: f64,
        #[arg(long)]
        years: u32,
    },
    /// Raise monthly expenses
    ExpenseIncrease {
        #[arg(long)]
        delta: f64,
    },
    /// Raise monthly income
    IncomeIncrease {
        #[arg(long)]
        delta: f64,
    },
    /// Pay off one of the current loans
    PayOffLoan {
        /// Zero-based position in the profile's loan list
        #[arg(long, default_value_t = 0)]
        index: usize,
    },
}

impl From<ScenarioCommand> for Scenario {
    fn from(command: ScenarioCommand) -> Self {
        match command {
            ScenarioCommand::NewLoan {
                amount,
                rate,
                years,
            } => Scenario::NewLoan {
                amount,
                annual_rate: rate,
                tenure_years: years,
            },
            ScenarioCommand::ExpenseIncrease { delta } => Scenario::ExpenseIncrease { delta },
            ScenarioCommand::IncomeIncrease { delta } => Scenario::IncomeIncrease { delta },
            ScenarioCommand::PayOffLoan { index } => Scenario::PayOffLoan { loan_index: index },
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct AlertsArgs {
    /// Acknowledge every alert after listing them
    #[arg(long)]
    pub(crate) mark_all_seen: bool,
}

pub(crate) fn run_emi(args: EmiArgs) -> Result<(), AppError> {
    let breakdown = emi_for(args.principal, args.rate, args.months)?;
    println!(
        "EMI for {:.2} at {}% over {} months",
        args.principal, args.rate, args.months
    );
    println!("- Monthly installment: {:.2}", breakdown.installment);
    println!("- Total interest: {:.2}", breakdown.total_interest);
    println!("- Total payable: {:.2}", breakdown.total_payable);
    Ok(())
}

pub(crate) fn run_train(args: TrainArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let (_, models) = open_dashboard(&config);

    if args.force {
        models.retrain_all()?;
    } else {
        models.warm_up()?;
    }

    println!("Models ready in {}", models.dir().display());
    for kind in ModelKind::ALL {
        println!("- {}: {}", kind.label(), models.path_for(kind).display());
    }

    if let Some(dir) = args.export_dir {
        export_training_sets(&dir, &config.training)?;
        println!("Training sets written to {}", dir.display());
    }
    Ok(())
}

fn export_training_sets(dir: &Path, settings: &TrainingSettings) -> Result<(), AppError> {
    fs::create_dir_all(dir)?;

    let health = generate_health_samples(settings.health_samples, settings.seed);
    let file = File::create(dir.join("health_training.csv"))?;
    write_health_csv(&health, file).map_err(ModelError::from)?;

    let what_if = generate_what_if_samples(settings.what_if_samples, settings.seed);
    let file = File::create(dir.join("what_if_training.csv"))?;
    write_what_if_csv(&what_if, file).map_err(ModelError::from)?;
    Ok(())
}

fn stored_dashboard() -> Result<Arc<FileDashboard>, AppError> {
    let config = AppConfig::load()?;
    let (service, _) = open_dashboard(&config);
    Ok(service)
}

pub(crate) fn run_predict() -> Result<(), AppError> {
    let service = stored_dashboard()?;
    let outlook = service.outlook()?;
    print_credit_health(&outlook.current);
    print_outlook(&outlook);
    Ok(())
}

pub(crate) fn run_what_if(command: ScenarioCommand) -> Result<(), AppError> {
    let service = stored_dashboard()?;
    let scenario = Scenario::from(command);
    let prediction = service.what_if(&scenario)?;
    print_what_if(&scenario, &prediction);
    Ok(())
}

pub(crate) fn run_alerts(args: AlertsArgs) -> Result<(), AppError> {
    let service = stored_dashboard()?;
    let alerts = service.refresh_alerts()?;
    print_alerts(&alerts);
    if args.mark_all_seen {
        let changed = service.mark_all_seen()?;
        println!("Marked {changed} alert(s) as seen");
    }
    Ok(())
}

pub(crate) fn print_credit_health(prediction: &CreditHealthPrediction) {
    println!("Credit health");
    println!("- Loan eligibility: {:.2}%", prediction.eligibility);
    println!("- Risk category: {}", prediction.risk_category);
    println!("- {}", prediction.recommendation());
}

pub(crate) fn print_outlook(outlook: &ImprovementOutlook) {
    println!(
        "Improvement outlook (score {} -> {})",
        outlook.current_score, outlook.potential_score
    );
    println!(
        "- Eligibility {:.2}% -> {:.2}% | risk {} -> {}",
        outlook.current.eligibility,
        outlook.potential.eligibility,
        outlook.current.risk_category,
        outlook.potential.risk_category
    );
    for insight in &outlook.insights {
        println!("  * {insight}");
    }
}

pub(crate) fn print_what_if(scenario: &Scenario, prediction: &WhatIfPrediction) {
    println!("What if: {}", describe_scenario(scenario));
    println!(
        "- Predicted score: {} ({:+})",
        prediction.predicted_score, prediction.score_change
    );
    println!("- Risk category: {}", prediction.risk_category);
    println!("- Loan eligibility: {:.2}%", prediction.eligibility);
    println!(
        "- Debt-to-income {:.1}% -> {:.1}% | savings rate {:.1}% -> {:.1}%",
        prediction.before.debt_to_income(),
        prediction.after.debt_to_income(),
        prediction.before.savings_rate(),
        prediction.after.savings_rate()
    );
}

pub(crate) fn print_alerts(alerts: &[Alert]) {
    let unseen = alerts.iter().filter(|alert| !alert.seen).count();
    println!("Alerts ({} total, {} unseen)", alerts.len(), unseen);
    for alert in alerts {
        let priority = match alert.priority {
            AlertPriority::High => "HIGH",
            AlertPriority::Medium => "MEDIUM",
            AlertPriority::Low => "LOW",
        };
        let marker = if alert.seen { " " } else { "*" };
        println!(
            "{marker} [{priority}] {} ({})",
            alert.message,
            alert.timestamp.format("%Y-%m-%d %H:%M")
        );
    }
}
