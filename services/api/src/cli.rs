use crate::commands::{
    run_alerts, run_emi, run_predict, run_train, run_what_if, AlertsArgs, EmiArgs,
    ScenarioCommand, TrainArgs,
};
use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use credo::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "credo",
    about = "Credit health dashboard: predictions, what-if simulations and alerts",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Compute the monthly installment for a loan
    Emi(EmiArgs),
    /// Train or load every model, optionally exporting the synthetic training sets
    Train(TrainArgs),
    /// Predict credit health for the stored profile
    Predict,
    /// Simulate a financial decision against the stored profile
    WhatIf {
        #[command(subcommand)]
        scenario: ScenarioCommand,
    },
    /// Refresh and list alerts for the stored profile
    Alerts(AlertsArgs),
    /// Run an end-to-end walkthrough against an in-memory profile
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Emi(args) => run_emi(args),
        Command::Train(args) => run_train(args),
        Command::Predict => run_predict(),
        Command::WhatIf { scenario } => run_what_if(scenario),
        Command::Alerts(args) => run_alerts(args),
        Command::Demo(args) => run_demo(args),
    }
}
