pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::assessment::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Question catalog
        .route(
            "/api/v1/assessment/questions",
            get(handlers::handle_list_questions),
        )
        .route(
            "/api/v1/assessment/questions/:step",
            get(handlers::handle_step_questions),
        )
        // Sessions
        .route(
            "/api/v1/assessment/sessions",
            post(handlers::handle_create_session),
        )
        .route(
            "/api/v1/assessment/sessions/:id",
            get(handlers::handle_get_session),
        )
        .route(
            "/api/v1/assessment/sessions/:id/answers",
            put(handlers::handle_submit_answer),
        )
        .route(
            "/api/v1/assessment/sessions/:id/advance",
            post(handlers::handle_advance),
        )
        .route(
            "/api/v1/assessment/sessions/:id/back",
            post(handlers::handle_back),
        )
        .route(
            "/api/v1/assessment/sessions/:id/reset",
            post(handlers::handle_reset),
        )
        .route(
            "/api/v1/assessment/sessions/:id/result",
            get(handlers::handle_get_result),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::assessment::catalog::{QuestionCatalog, Step};
    use crate::assessment::engine::AssessmentEngine;
    use crate::assessment::enrichment::{EnrichmentClient, OfflineRecommendationService};
    use crate::assessment::persistence::{MemoryStore, PersistenceManager};
    use crate::config::Config;

    fn test_router() -> Router {
        let catalog = QuestionCatalog::standard();
        let engine = AssessmentEngine::new(
            catalog,
            PersistenceManager::new(Arc::new(MemoryStore::new()), catalog),
            EnrichmentClient::new(Arc::new(OfflineRecommendationService)),
        );
        build_router(AppState {
            engine: Arc::new(engine),
            config: Config::default(),
        })
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let router = test_router();
        let (status, body) = send(&router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "career-assessment-api");
        assert_eq!(body["recommendation_backend"], "offline");
    }

    #[tokio::test]
    async fn test_questions_grouped_by_step() {
        let router = test_router();
        let (status, body) = send(&router, "GET", "/api/v1/assessment/questions", None).await;
        assert_eq!(status, StatusCode::OK);
        let steps = body.as_array().unwrap();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0]["step"], "personality");
        assert_eq!(steps[0]["questions"].as_array().unwrap().len(), 10);
        assert_eq!(steps[3]["scale"], "rating");

        let (status, body) = send(&router, "GET", "/api/v1/assessment/questions/values", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["questions"].as_array().unwrap().len(), 5);
        assert_eq!(body["questions"][0]["type"], "value");
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let router = test_router();
        let uri = format!("/api/v1/assessment/sessions/{}", uuid::Uuid::new_v4());
        let (status, body) = send(&router, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_out_of_range_answer_is_400() {
        let router = test_router();
        let (_, session) = send(&router, "POST", "/api/v1/assessment/sessions", None).await;
        let uri = format!("/api/v1/assessment/sessions/{}/answers", session["session_id"].as_str().unwrap());
        let (status, body) = send(&router, "PUT", &uri, Some(json!({"question_id": "p1", "value": 0}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_full_assessment_over_http() {
        let router = test_router();
        let (status, session) = send(&router, "POST", "/api/v1/assessment/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(session["status"], "in_progress");
        let base = format!("/api/v1/assessment/sessions/{}", session["session_id"].as_str().unwrap());

        let (status, _) = send(&router, "GET", &format!("{base}/result"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, outcome) = send(&router, "POST", &format!("{base}/advance"), None).await;
        assert_eq!(outcome["outcome"], "incomplete");
        assert_eq!(outcome["missing"].as_array().unwrap().len(), 10);

        let catalog = QuestionCatalog::standard();
        for step in Step::ALL {
            for question in catalog.for_step(step) {
                let (status, _) = send(
                    &router,
                    "PUT",
                    &format!("{base}/answers"),
                    Some(json!({"question_id": question.id, "value": 4})),
                )
                .await;
                assert_eq!(status, StatusCode::OK);
            }
            let (status, _) = send(&router, "POST", &format!("{base}/advance"), None).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, result) = send(&router, "GET", &format!("{base}/result"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["recommended_careers"].as_array().unwrap().len(), 3);
        assert_eq!(result["scores"]["personality"]["openness"], 80);
        assert!(!result["archetype_careers"].as_array().unwrap().is_empty());

        let (status, body) = send(
            &router,
            "PUT",
            &format!("{base}/answers"),
            Some(json!({"question_id": "p1", "value": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "INVALID_STATE");

        let (status, view) = send(&router, "POST", &format!("{base}/reset"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["status"], "not_started");
        assert!(view["result"].is_null());

        let (status, _) = send(&router, "GET", &base, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_requests_use_error_envelope() {
        let router = test_router();
        let (_, session) = send(&router, "POST", "/api/v1/assessment/sessions", None).await;
        let answers = format!(
            "/api/v1/assessment/sessions/{}/answers",
            session["session_id"].as_str().unwrap()
        );

        let cases = [
            ("GET", "/api/v1/assessment/sessions/not-a-uuid".to_string(), None),
            ("POST", "/api/v1/assessment/sessions/123/advance".to_string(), None),
            ("GET", "/api/v1/assessment/questions/hobbies".to_string(), None),
            (
                "PUT",
                answers.clone(),
                Some(json!({"question_id": "p1", "value": "four"})),
            ),
            ("PUT", answers, Some(json!({"value": 4}))),
        ];
        for (method, uri, body) in cases {
            let (status, body) = send(&router, method, &uri, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri}");
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR", "{method} {uri}");
            assert!(body["error"]["message"].as_str().is_some_and(|m| !m.is_empty()));
        }
    }
}
