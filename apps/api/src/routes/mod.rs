pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::machine_coding::handlers as machine_coding;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview progress
        .route(
            "/api/v1/interview/progress",
            get(handlers::handle_get_progress)
                .put(handlers::handle_save_progress)
                .delete(handlers::handle_reset_progress),
        )
        .route(
            "/api/v1/interview/current-round",
            get(handlers::handle_current_round),
        )
        .route(
            "/api/v1/interview/rounds/:round/complete",
            post(handlers::handle_complete_round),
        )
        .route(
            "/api/v1/interview/rounds/:round/access",
            get(handlers::handle_round_access),
        )
        // Interview agents
        .route("/api/v1/agents/:agent_type", get(handlers::handle_get_agent))
        .route(
            "/api/v1/agents/:agent_type/status",
            get(handlers::handle_agent_status),
        )
        .route(
            "/api/v1/agents/:agent_type/url",
            get(handlers::handle_agent_url),
        )
        // Machine-coding proxy
        .route(
            "/api/machine-coding/init-session",
            post(machine_coding::handle_init_session),
        )
        .route(
            "/api/machine-coding/save-questions",
            post(machine_coding::handle_save_questions),
        )
        .route(
            "/api/machine-coding/save-submission",
            post(machine_coding::handle_save_submission),
        )
        .route(
            "/api/machine-coding/update-session",
            post(machine_coding::handle_update_session),
        )
        .route(
            "/api/machine-coding/end-session",
            post(machine_coding::handle_end_session),
        )
        .route(
            "/api/machine-coding/history/:user_id",
            get(machine_coding::handle_history),
        )
        .route(
            "/api/machine-coding/submissions/:session_id",
            get(machine_coding::handle_submissions),
        )
        .route(
            "/api/machine-coding/analytics/:user_id",
            get(machine_coding::handle_analytics),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::LiveKitSettings;
    use crate::interview::agents::AgentConfigurator;
    use crate::interview::progress::ProgressTracker;
    use crate::interview::store::MemoryStore;
    use crate::machine_coding::atlas::{AtlasError, DocumentStore};

    #[derive(Default)]
    struct FakeDocuments {
        inserted: Mutex<Vec<(String, Value)>>,
        updates: Mutex<Vec<(String, Value, Value)>>,
        fail: bool,
    }

    impl FakeDocuments {
        fn check(&self) -> Result<(), AtlasError> {
            if self.fail {
                return Err(AtlasError::Api {
                    status: 401,
                    message: "invalid session".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl DocumentStore for FakeDocuments {
        async fn insert_one(&self, collection: &str, document: Value) -> Result<Value, AtlasError> {
            self.check()?;
            let mut inserted = self.inserted.lock().unwrap();
            inserted.push((collection.to_string(), document));
            Ok(json!(format!("id-{}", inserted.len())))
        }

        async fn insert_many(
            &self,
            collection: &str,
            documents: Vec<Value>,
        ) -> Result<usize, AtlasError> {
            self.check()?;
            let count = documents.len();
            let mut inserted = self.inserted.lock().unwrap();
            inserted.extend(documents.into_iter().map(|d| (collection.to_string(), d)));
            Ok(count)
        }

        async fn update_one(
            &self,
            collection: &str,
            filter: Value,
            update: Value,
        ) -> Result<(), AtlasError> {
            self.check()?;
            self.updates
                .lock()
                .unwrap()
                .push((collection.to_string(), filter, update));
            Ok(())
        }

        async fn find(
            &self,
            collection: &str,
            filter: Value,
            _sort: Option<Value>,
        ) -> Result<Vec<Value>, AtlasError> {
            self.check()?;
            let inserted = self.inserted.lock().unwrap();
            Ok(inserted
                .iter()
                .filter(|(c, doc)| {
                    c == collection
                        && filter
                            .as_object()
                            .map(|f| f.iter().all(|(k, v)| doc.get(k) == Some(v)))
                            .unwrap_or(true)
                })
                .map(|(_, doc)| doc.clone())
                .collect())
        }
    }

    fn app_with(documents: Arc<FakeDocuments>) -> Router {
        let livekit = LiveKitSettings {
            technical_token: "tech-token".to_string(),
            technical_url: "wss://tech.livekit.cloud".to_string(),
            behavioural_token: String::new(),
            behavioural_url: "wss://hr.livekit.cloud".to_string(),
        };
        build_router(AppState {
            tracker: Arc::new(ProgressTracker::new(Arc::new(MemoryStore::new()))),
            agents: Arc::new(AgentConfigurator::new(livekit)),
            documents,
        })
    }

    fn app() -> Router {
        app_with(Arc::new(FakeDocuments::default()))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health_reports_ok() {
        let (status, body) = send(&app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_round_flow_over_http() {
        let app = app();

        let (_, body) = send(&app, Method::GET, "/api/v1/interview/progress", None).await;
        assert_eq!(body, json!({ "completedRounds": [], "currentRound": 1 }));

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/interview/rounds/1/complete",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["completedRounds"], json!([1]));
        assert_eq!(body["currentRound"], 2);

        let (_, body) = send(&app, Method::GET, "/api/v1/interview/rounds/2/access", None).await;
        assert_eq!(body, json!({ "round": 2, "accessible": true }));
        let (_, body) = send(&app, Method::GET, "/api/v1/interview/rounds/3/access", None).await;
        assert_eq!(body["accessible"], false);

        let (_, body) = send(&app, Method::GET, "/api/v1/interview/current-round", None).await;
        assert_eq!(body["currentRound"], 2);

        let (status, _) = send(&app, Method::DELETE, "/api/v1/interview/progress", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, body) = send(&app, Method::GET, "/api/v1/interview/current-round", None).await;
        assert_eq!(body["currentRound"], 1);
    }

    #[tokio::test]
    async fn test_put_progress_round_trips() {
        let app = app();
        let progress = json!({ "completedRounds": [1, 2], "currentRound": 3 });
        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/v1/interview/progress",
            Some(progress.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, body) = send(&app, Method::GET, "/api/v1/interview/progress", None).await;
        assert_eq!(body, progress);
    }

    #[tokio::test]
    async fn test_round_zero_is_rejected() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/interview/rounds/0/complete",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/v1/interview/progress",
            Some(json!({ "completedRounds": [0], "currentRound": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_agent_lookup_and_status() {
        let app = app();

        let (status, body) = send(&app, Method::GET, "/api/v1/agents/technical", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["room"], "te");
        assert_eq!(body["agentName"], "Technical Expert");

        let (_, body) = send(&app, Method::GET, "/api/v1/agents/technical/status", None).await;
        assert_eq!(body["configured"], true);

        let (_, body) = send(&app, Method::GET, "/api/v1/agents/behavioral/status", None).await;
        assert_eq!(body["configured"], false);
        assert_eq!(body["readiness"]["state"], "misconfigured");
        assert_eq!(body["readiness"]["token_missing"], true);

        let (_, body) = send(&app, Method::GET, "/api/v1/agents/behavioral/url", None).await;
        assert_eq!(body["url"], "wss://hr.livekit.cloud");
    }

    #[tokio::test]
    async fn test_unknown_agent_type() {
        let app = app();

        let (status, body) = send(&app, Method::GET, "/api/v1/agents/recruiter", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "UNKNOWN_AGENT_TYPE");

        let (status, body) = send(&app, Method::GET, "/api/v1/agents/recruiter/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["configured"], false);
        assert_eq!(body["readiness"]["state"], "unknown_agent");
    }

    #[tokio::test]
    async fn test_machine_coding_session_lifecycle() {
        let documents = Arc::new(FakeDocuments::default());
        let app = app_with(documents.clone());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/machine-coding/init-session",
            Some(json!({ "sessionId": "s1", "userId": "u1", "role": "SDE", "totalQuestions": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "insertedId": "id-1" }));

        let (_, body) = send(
            &app,
            Method::POST,
            "/api/machine-coding/save-questions",
            Some(json!({
                "sessionId": "s1",
                "userId": "u1",
                "generatedAt": "2025-01-02T03:04:05Z",
                "questions": [
                    { "id": "q1", "title": "Two Sum" },
                    { "id": "q2", "title": "LRU Cache" }
                ]
            })),
        )
        .await;
        assert_eq!(body, json!({ "success": true, "count": 2 }));

        for (question, score) in [("q1", 90), ("q2", 60)] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/machine-coding/save-submission",
                Some(json!({
                    "sessionId": "s1",
                    "userId": "u1",
                    "questionId": question,
                    "language": "rust",
                    "code": "fn main() {}",
                    "analysisResult": { "success": true, "analysis": { "overallScore": score } },
                    "submittedAt": "2025-01-02T03:10:00Z"
                })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, body) = send(&app, Method::GET, "/api/machine-coding/submissions/s1", None).await;
        assert_eq!(body["submissions"].as_array().unwrap().len(), 2);

        let (_, body) = send(&app, Method::GET, "/api/machine-coding/analytics/u1", None).await;
        assert_eq!(body["analytics"]["totalSubmissions"], 2);
        assert_eq!(body["analytics"]["averageScore"], 75);
        assert_eq!(body["analytics"]["questionsCorrect"], 1);

        let (_, body) = send(&app, Method::GET, "/api/machine-coding/history/u1", None).await;
        assert_eq!(body["sessions"][0]["role"], "SDE");

        let (_, body) = send(
            &app,
            Method::POST,
            "/api/machine-coding/end-session",
            Some(json!({ "sessionId": "s1" })),
        )
        .await;
        assert_eq!(body, json!({ "success": true }));

        let updates = documents.updates.lock().unwrap();
        let (collection, filter, update) = updates.last().unwrap();
        assert_eq!(collection, "machine_coding_sessions");
        assert_eq!(filter, &json!({ "sessionId": "s1" }));
        assert_eq!(update["$set"]["status"], "completed");
        assert_eq!(update["$set"]["totalScore"], 0.0);
    }

    #[tokio::test]
    async fn test_update_session_sets_only_provided_fields() {
        let documents = Arc::new(FakeDocuments::default());
        let app = app_with(documents.clone());

        send(
            &app,
            Method::POST,
            "/api/machine-coding/update-session",
            Some(json!({ "sessionId": "s1", "submissionCount": 3 })),
        )
        .await;

        let updates = documents.updates.lock().unwrap();
        let set = &updates[0].2["$set"];
        assert_eq!(set["submissionCount"], 3);
        assert!(set.get("totalScore").is_none());
        assert!(set["updatedAt"].is_string());
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        let documents = Arc::new(FakeDocuments::default());
        let app = app_with(documents.clone());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/machine-coding/init-session")
            .header("content-type", "application/json")
            .body(Body::from("{\"sessionId\": "))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert!(response.status().is_client_error());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());

        // missing required field
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/machine-coding/end-session",
            Some(json!({ "totalScore": 10 })),
        )
        .await;
        assert!(status.is_client_error());
        assert_eq!(body["success"], false);
        assert!(documents.inserted.lock().unwrap().is_empty());
        assert!(documents.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_round_above_max_is_rejected() {
        let app = app();
        let uri = format!("/api/v1/interview/rounds/{}/complete", u32::MAX);
        let (status, body) = send(&app, Method::POST, &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let uri = format!("/api/v1/interview/rounds/{}/complete", u32::MAX - 1);
        let (status, body) = send(&app, Method::POST, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["currentRound"], u32::MAX);
    }

    #[tokio::test]
    async fn test_upstream_failure_returns_error_envelope() {
        let app = app_with(Arc::new(FakeDocuments {
            fail: true,
            ..Default::default()
        }));
        let (status, body) = send(&app, Method::GET, "/api/machine-coding/analytics/u1", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("invalid session"));
    }
}
