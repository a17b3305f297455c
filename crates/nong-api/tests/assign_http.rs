use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use nong_api::{AssignerAdapter, HttpApi};
use nong_core::{AssignConfig, Assigner, SequentialQueue};
use nong_model::{PartnerId, Preference, RegistrantId};
use nong_store::{MemoryStore, SeedTarget};
use serde_json::Value;
use tower::ServiceExt;

fn app(partners: &[&str], registrants: &[(&str, Preference)]) -> Router {
    let store = MemoryStore::new();
    for p in partners {
        store.insert_partner(&PartnerId::from(*p)).unwrap();
    }
    for (id, pref) in registrants {
        store
            .insert_registrant(&RegistrantId::from(*id), *pref)
            .unwrap();
    }
    let assigner = Assigner::new(
        Arc::new(store),
        SequentialQueue::new(),
        &AssignConfig::default(),
    );
    HttpApi::new(Arc::new(AssignerAdapter::new(Arc::new(assigner)))).router()
}

async fn post(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::post(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn assign_then_conflict_then_lookup() {
    let app = app(&["f-1", "f-2", "f-3"], &[("s-1", Preference::PrefersTwo)]);

    let (status, body) = post(&app, "/api/v1/registrants/s-1/assign").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["iteration"], 0);
    assert_eq!(body["partners"].as_array().unwrap().len(), 2);

    let (status, body) = post(&app, "/api/v1/registrants/s-1/assign").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "conflict");

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/v1/registrants/s-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let view: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(view["fullyAssigned"], true);
    assert_eq!(view["partners"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_registrant_and_empty_pool() {
    let app = app(&[], &[("s-1", Preference::Neutral)]);

    let (status, body) = post(&app, "/api/v1/registrants/ghost/assign").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");

    let (status, body) = post(&app, "/api/v1/registrants/s-1/assign").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["kind"], "unavailable");
}

#[tokio::test]
async fn single_partner_registrant_is_not_assigned_again() {
    let app = app(&["f-1", "f-2"], &[("s-1", Preference::DeclinesTwo)]);

    let (status, body) = post(&app, "/api/v1/registrants/s-1/assign").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["partners"].as_array().unwrap().len(), 1);

    let (status, body) = post(&app, "/api/v1/registrants/s-1/assign").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "conflict");
}
