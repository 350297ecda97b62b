use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::evaluation::router::{create_final_handler, lock_handler};
use crate::workflows::evaluation::{
    EvaluationPolicy, FinalEvaluationRequest, FinalEvaluationService,
};

fn final_request_body() -> Body {
    Body::from(
        serde_json::to_vec(&json!({
            "evaluator_id": "admin1",
            "technical_skills": 8,
            "communication": 9,
            "teamwork": 7,
            "punctuality": 10,
            "rating": 8.5,
            "feedback": "Good work"
        }))
        .expect("serialize request"),
    )
}

fn post_final(project: &str) -> Request<Body> {
    Request::post(format!("/api/v1/projects/{project}/final-evaluation"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(final_request_body())
        .expect("request builds")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

#[tokio::test]
async fn create_route_returns_created_evaluation() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router.oneshot(post_final("P1")).await.expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["evaluated_type"], "PROJECT");
    assert_eq!(body["evaluator_type"], "LAB_ADMIN");
    assert_eq!(body["evaluated_id"], "P1");
    assert_eq!(body["technical_skills"], 8.0);
    assert_eq!(body["feedback"], "Good work");
    assert_eq!(body["evaluation_date"], "2025-06-30");
}

#[tokio::test]
async fn duplicate_create_returns_structured_conflict() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let first = router
        .clone()
        .oneshot(post_final("P1"))
        .await
        .expect("route executes");
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = router.oneshot(post_final("P1")).await.expect("route executes");
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body = read_json_body(second).await;
    assert_eq!(body["status"], 409);
    assert_eq!(body["error"], "Conflict");
    assert!(body["message"]
        .as_str()
        .expect("message string")
        .contains("already exists"));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn unknown_project_returns_not_found() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(post_final("ghost"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn lock_status_and_summary_follow_final_evaluation() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let before = router
        .clone()
        .oneshot(get("/api/v1/projects/P1/final-evaluation/lock"))
        .await
        .expect("route executes");
    assert_eq!(read_json_body(before).await["locked"], false);

    router
        .clone()
        .oneshot(post_final("P1"))
        .await
        .expect("route executes");

    let after = router
        .clone()
        .oneshot(get("/api/v1/projects/P1/final-evaluation/lock"))
        .await
        .expect("route executes");
    assert_eq!(read_json_body(after).await["locked"], true);

    let summary = router
        .clone()
        .oneshot(get("/api/v1/projects/P1/final-evaluation/summary"))
        .await
        .expect("route executes");
    assert_eq!(summary.status(), StatusCode::OK);
    let summary = read_json_body(summary).await;
    assert_eq!(summary["locked"], true);
    assert_eq!(summary["total_evaluations"], 1);

    let score = router
        .oneshot(get("/api/v1/projects/P1/final-evaluation/score"))
        .await
        .expect("route executes");
    assert_eq!(read_json_body(score).await["final_score"], 8.5);
}

#[tokio::test]
async fn score_is_null_before_final_evaluation() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(get("/api/v1/projects/P1/final-evaluation/score"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(read_json_body(response).await["final_score"].is_null());
}

#[tokio::test]
async fn delete_route_unlocks_project() {
    let (service, _) = build_service();
    let router = router_with_service(service);
    router
        .clone()
        .oneshot(post_final("P1"))
        .await
        .expect("route executes");

    let deleted = router
        .clone()
        .oneshot(
            Request::delete("/api/v1/projects/P1/final-evaluation")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let missing = router
        .oneshot(
            Request::delete("/api/v1/projects/P1/final-evaluation")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lock_handler_reports_invalid_state_without_final() {
    let (service, _) = build_service();
    let result = lock_handler(State(Arc::new(service)), Path("P1".to_string())).await;

    let response = result.into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json_body(response).await;
    assert!(body["message"]
        .as_str()
        .expect("message string")
        .contains("no final evaluation to lock"));
}

#[tokio::test]
async fn create_handler_maps_validation_to_unprocessable() {
    let (service, _) = build_service();
    let mut invalid = payload();
    invalid.rating = 42.0;

    let result = create_final_handler(
        State(Arc::new(service)),
        Path("P1".to_string()),
        axum::Json(FinalEvaluationRequest {
            evaluator_id: admin(),
            payload: invalid,
        }),
    )
    .await;

    assert_eq!(result.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn repository_outage_maps_to_service_unavailable() {
    let service = FinalEvaluationService::new(
        Arc::new(UnavailableStore),
        Arc::new(UnavailableStore),
        EvaluationPolicy::default(),
    );
    let result = lock_handler(State(Arc::new(service)), Path("P1".to_string())).await;
    assert_eq!(
        result.into_response().status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[test]
fn unmapped_store_errors_keep_their_status() {
    use crate::workflows::evaluation::EvaluationServiceError;
    use crate::workflows::store::RepositoryError;

    let cases = [
        (RepositoryError::Conflict, StatusCode::CONFLICT),
        (RepositoryError::NotFound, StatusCode::NOT_FOUND),
        (
            RepositoryError::Unavailable("store offline".to_string()),
            StatusCode::SERVICE_UNAVAILABLE,
        ),
    ];
    for (source, expected) in cases {
        let response = EvaluationServiceError::Repository(source).into_response();
        assert_eq!(response.status(), expected);
    }
}

#[tokio::test]
async fn talent_evaluations_are_listed_per_project() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let created = router
        .clone()
        .oneshot(
            Request::post("/api/v1/projects/P1/evaluations")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&mentor_submission("talent-9", 7.0))
                        .expect("serialize submission"),
                ))
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(created.status(), StatusCode::CREATED);

    let listed = router
        .oneshot(get("/api/v1/projects/P1/evaluations"))
        .await
        .expect("route executes");
    let body = read_json_body(listed).await;
    let rows = body.as_array().expect("array body");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["evaluated_type"], "TALENT");
    assert_eq!(rows[0]["evaluated_id"], "talent-9");
}

#[tokio::test]
async fn register_project_route_creates_catalog_entry() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(
            Request::post("/api/v1/projects")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&project("P7")).expect("serialize project"),
                ))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(read_json_body(response).await["id"], "P7");
}
