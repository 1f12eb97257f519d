use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::Value;

use crate::dashboard::DashboardService;
use crate::finance::{Loan, LoanOffer, Profile};
use crate::modeling::{ModelError, ModelKind, ModelSource, ModelStatus, Node, TrainedModel};
use crate::predict::fixtures::{constant_classifier, regressor, FixedModels};
use crate::storage::InMemoryStore;

pub(super) type MemoryService<M> = DashboardService<InMemoryStore, M>;

pub(super) fn profile() -> Profile {
    Profile::new(50_000.0, 30_000.0, 650, 40.0)
        .with_cards(2)
        .with_loan(Loan::new(150_000.0, 5_000.0, 30))
}

/// Low risk, 72% eligibility and a what-if score of 700 for every input.
pub(super) fn ready_models() -> FixedModels {
    FixedModels::default()
        .with(constant_classifier(0))
        .with(regressor(ModelKind::EligibilityRegressor, vec![Node::Leaf(72.0)]))
        .with(regressor(ModelKind::WhatIfRegressor, vec![Node::Leaf(700.0)]))
}

/// A model source whose background training has not finished.
pub(super) struct WarmingModels;

impl ModelSource for WarmingModels {
    fn get_or_train(&self, _kind: ModelKind) -> Result<Arc<TrainedModel>, ModelError> {
        Err(ModelError::EmptyModel)
    }

    fn status(&self) -> ModelStatus {
        ModelStatus::Warming
    }
}

/// A model source whose background training gave up.
pub(super) struct FailedModels;

impl ModelSource for FailedModels {
    fn get_or_train(&self, _kind: ModelKind) -> Result<Arc<TrainedModel>, ModelError> {
        Err(ModelError::EmptyModel)
    }

    fn status(&self) -> ModelStatus {
        ModelStatus::Failed("model directory is read-only".to_string())
    }
}

pub(super) fn offers() -> Vec<LoanOffer> {
    vec![
        LoanOffer {
            bank: "North Bank".to_string(),
            loan_type: "Personal".to_string(),
            interest_rate: 10.5,
            processing_fee: Some("1%".to_string()),
        },
        LoanOffer {
            bank: "Harbor Credit".to_string(),
            loan_type: "Home".to_string(),
            interest_rate: 8.4,
            processing_fee: None,
        },
    ]
}

pub(super) fn build_service() -> (Arc<MemoryService<FixedModels>>, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new().with_offers(offers()));
    let service = Arc::new(DashboardService::new(
        Arc::clone(&store),
        Arc::new(ready_models()),
    ));
    (service, store)
}

pub(super) fn build_service_with_profile() -> (Arc<MemoryService<FixedModels>>, Arc<InMemoryStore>)
{
    let (service, store) = build_service();
    service
        .update_profile(profile())
        .expect("profile is valid");
    (service, store)
}

pub(super) fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serializable body")))
        .expect("valid request")
}

pub(super) fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    serde_json::from_slice(&bytes).expect("json body")
}
