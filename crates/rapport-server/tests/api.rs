//! HTTP tests driving the router directly with `oneshot`.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use rapport_core::catalog::{seed, Fixture};
use rapport_core::model::User;
use rapport_core::{EvaluationConfig, EvaluationService};
use rapport_server::wire::{CriterionDto, ReceiptDto, SummaryDto, SummaryItemDto};
use rapport_server::{router, AppState};
use rapport_store::MemoryStore;

async fn app(threshold: usize) -> Router {
    let store = Arc::new(MemoryStore::new());
    let fixture = Fixture {
        criteria: vec!["Humor".into(), "Wisdom".into()],
        users: vec![
            User {
                id: 1,
                username: "rita".into(),
            },
            User {
                id: 2,
                username: "sam".into(),
            },
            User {
                id: 3,
                username: "tom".into(),
            },
        ],
        friendships: vec![],
    };
    seed(store.as_ref(), &fixture).await.unwrap();
    let config = EvaluationConfig {
        threshold,
        ..Default::default()
    };
    router(AppState::new(EvaluationService::new(store, config)))
}

fn get(uri: &str, user: Option<u64>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(id) = user {
        builder = builder.header("X-User-Id", id.to_string());
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, user: u64, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("X-User-Id", user.to_string())
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn tasks_use_camel_case_and_paginate() {
    let app = app(10).await;
    let (status, body) = send(&app, get("/evaluations/tasks/", Some(1))).await;
    assert_eq!(status, StatusCode::OK);

    let tasks = body["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 4);
    assert_eq!(tasks[0]["subjectId"], 2);
    assert_eq!(tasks[0]["criterionName"], "Humor");
    assert_eq!(tasks[0]["firstTime"], true);
    assert_eq!(tasks[1]["firstTime"], false);
    assert!(body["next_offset"].is_null());

    let (_, past_end) = send(&app, get("/evaluations/tasks/?offset=50", Some(1))).await;
    assert!(past_end["tasks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn submission_flow() {
    let app = app(10).await;

    let (status, body) = send(
        &app,
        post_json(
            "/evaluations/evaluations/?subject_id=2",
            1,
            json!({"criterion_id": 1, "score": 8, "familiarity": 6}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let receipt: ReceiptDto = serde_json::from_value(body).unwrap();
    assert!(receipt.created);
    assert!(receipt.first_time);

    let (_, body) = send(&app, get("/evaluations/tasks/", Some(1))).await;
    let next_for_sam = body["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["subjectId"] == 2)
        .unwrap()
        .clone();
    assert_eq!(next_for_sam["criterionName"], "Wisdom");
    assert_eq!(next_for_sam["firstTime"], false);

    let (status, body) = send(&app, get("/evaluations/summary-v2/?subject_id=2", Some(1))).await;
    assert_eq!(status, StatusCode::OK);
    let summary: SummaryDto = serde_json::from_value(body).unwrap();
    assert!(!summary.gating.eligible);
    assert_eq!(summary.gating.outbound_count, 1);
    assert_eq!(summary.gating.remaining, 9);
    assert!(summary.criteria.is_empty());

    let (_, body) = send(&app, get("/evaluations/summary/?subject_id=2", Some(3))).await;
    let legacy: Vec<SummaryItemDto> = serde_json::from_value(body).unwrap();
    assert_eq!(legacy.len(), 1);
    assert_eq!(legacy[0].count, 1);
    assert!((legacy[0].average_score - 8.0).abs() < 1e-9);
}

#[tokio::test]
async fn subject_may_come_from_body() {
    let app = app(10).await;
    let (status, _) = send(
        &app,
        post_json(
            "/evaluations/evaluations/",
            1,
            json!({"subject_id": 3, "criterion_id": 2, "score": 4, "familiarity": 2}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn validation_errors_list_fields() {
    let app = app(10).await;
    let (status, body) = send(
        &app,
        post_json(
            "/evaluations/evaluations/?subject_id=2",
            1,
            json!({"criterion_id": 1, "score": 0, "familiarity": 5}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "score");

    let (status, body) = send(
        &app,
        post_json(
            "/evaluations/evaluations/?subject_id=2",
            1,
            json!({"criterion_id": 1, "score": 5}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "familiarity");
}

#[tokio::test]
async fn self_evaluation_is_rejected() {
    let app = app(10).await;
    let (status, body) = send(
        &app,
        post_json(
            "/evaluations/evaluations/?subject_id=1",
            1,
            json!({"criterion_id": 1, "score": 5, "familiarity": 5}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("themself"));
}

#[tokio::test]
async fn unknown_references_are_not_found() {
    let app = app(10).await;
    let (status, body) = send(
        &app,
        post_json(
            "/evaluations/evaluations/?subject_id=2",
            1,
            json!({"criterion_id": 99, "score": 5, "familiarity": 5}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "criterion not found: 99");

    let (status, _) = send(&app, get("/evaluations/summary-v2/?subject_id=42", Some(1))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn identity_is_required() {
    let app = app(10).await;
    let (status, body) = send(&app, get("/evaluations/criteria/", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("X-User-Id"));

    let request = Request::builder()
        .uri("/evaluations/criteria/")
        .header("X-User-Id", "not-a-number")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/evaluations/criteria/", Some(77))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_input_is_a_bad_request() {
    let app = app(10).await;
    let (status, body) = send(&app, get("/evaluations/summary/", Some(1))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, get("/evaluations/tasks/?offset=-3", Some(1))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/evaluations/evaluations/?subject_id=2")
        .header("X-User-Id", "1")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn criteria_are_listed() {
    let app = app(10).await;
    let (status, body) = send(&app, get("/evaluations/criteria/", Some(2))).await;
    assert_eq!(status, StatusCode::OK);
    let criteria: Vec<CriterionDto> = serde_json::from_value(body).unwrap();
    let names: Vec<_> = criteria.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Humor", "Wisdom"]);
}

#[tokio::test]
async fn gated_summary_opens_with_zero_threshold() {
    let app = app(0).await;
    for (rater, score, familiarity) in [(1, 10, 10), (3, 2, 1)] {
        let (status, _) = send(
            &app,
            post_json(
                "/evaluations/evaluations/?subject_id=2",
                rater,
                json!({"criterion_id": 2, "score": score, "familiarity": familiarity}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(&app, get("/evaluations/summary-v2/?subject_id=2", Some(2))).await;
    let summary: SummaryDto = serde_json::from_value(body).unwrap();
    assert!(summary.gating.eligible);
    assert_eq!(summary.criteria.len(), 1);
    assert!((summary.criteria[0].average_score - 102.0 / 11.0).abs() < 1e-9);
}

#[tokio::test]
async fn rater_stats_for_current_user() {
    let app = app(10).await;
    let (status, _) = send(&app, get("/evaluations/rater-stats/", Some(1))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(
        &app,
        post_json(
            "/evaluations/evaluations/?subject_id=2",
            1,
            json!({"criterion_id": 1, "score": 10, "familiarity": 3}),
        ),
    )
    .await;

    let (status, body) = send(&app, get("/evaluations/rater-stats/", Some(1))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ratings_count"], 1);
    assert_eq!(body["extreme_rate"], 1.0);
}
