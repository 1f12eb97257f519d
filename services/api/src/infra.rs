use std::sync::Arc;

use credo::config::AppConfig;
use credo::dashboard::DashboardService;
use credo::finance::Scenario;
use credo::modeling::{ModelSource, ModelStore};
use credo::storage::JsonFileStore;
use metrics_exporter_prometheus::PrometheusHandle;

pub(crate) type FileDashboard = DashboardService<JsonFileStore, ModelStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) models: Arc<dyn ModelSource>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// File-backed store and model cache rooted at the configured directories.
pub(crate) fn open_dashboard(config: &AppConfig) -> (Arc<FileDashboard>, Arc<ModelStore>) {
    let store = Arc::new(JsonFileStore::new(&config.storage.data_dir));
    let models = Arc::new(ModelStore::new(&config.storage.model_dir, config.training));
    let service = Arc::new(DashboardService::new(store, Arc::clone(&models)));
    (service, models)
}

pub(crate) fn describe_scenario(scenario: &Scenario) -> String {
    match scenario {
        Scenario::NewLoan {
            amount,
            annual_rate,
            tenure_years,
        } => format!("new loan of {amount:.0} at {annual_rate}% over {tenure_years} years"),
        Scenario::ExpenseIncrease { delta } => format!("monthly expenses up by {delta:.0}"),
        Scenario::IncomeIncrease { delta } => format!("monthly income up by {delta:.0}"),
        Scenario::PayOffLoan { loan_index } => format!("paying off loan #{}", loan_index + 1),
    }
}
