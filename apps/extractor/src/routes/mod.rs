pub mod events;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/events/s3", post(events::handle_s3_event))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::extraction::schema::TOOL_NAME;
    use crate::extraction::{Extractor, ModelReply};
    use crate::models::candidate::sample_record;
    use crate::pipeline::Pipeline;
    use crate::testing::{MemoryFetcher, MemoryStore, ScriptedModel};

    fn test_state(store: Arc<MemoryStore>) -> AppState {
        let fetcher = MemoryFetcher::default().with_object("cv-uploads", "cv.pdf", b"%PDF-1.7");
        let model = ScriptedModel::replying(ModelReply::ToolCall {
            name: TOOL_NAME.to_string(),
            input: serde_json::to_value(sample_record()).unwrap(),
        });
        let pipeline = Pipeline::new(
            Arc::new(fetcher),
            Extractor::new(Arc::new(model)),
            store,
            Duration::from_secs(5),
        );
        AppState {
            pipeline: Arc::new(pipeline),
        }
    }

    async fn post_event(app: Router, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::post("/api/v1/events/s3")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state(Arc::default()));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "cv-extractor");
    }

    #[tokio::test]
    async fn test_event_success() {
        let store = Arc::new(MemoryStore::default());
        let app = build_router(test_state(store.clone()));
        let event = serde_json::to_string(&crate::event::S3Event::single("cv-uploads", "cv.pdf"))
            .unwrap();

        let (status, body) = post_event(app, &event).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["statusCode"], 200);
        assert_eq!(body["body"]["message"], "CV processed successfully");
        assert_eq!(body["body"]["result"]["fullName"], "Jane Smith");
        assert_eq!(store.written().len(), 1);
    }

    #[tokio::test]
    async fn test_event_with_no_records() {
        let app = build_router(test_state(Arc::default()));

        let (status, body) = post_event(app, r#"{"Records": []}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["statusCode"], 500);
        assert_eq!(body["body"]["message"], "Error processing CV");
        assert_eq!(body["body"]["error"], "Bad event: No records found in S3 event");
    }

    #[tokio::test]
    async fn test_malformed_body_gets_failure_envelope() {
        let store = Arc::new(MemoryStore::default());
        let app = build_router(test_state(store.clone()));

        let (status, body) = post_event(app, "not json").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["body"]["error"]
            .as_str()
            .unwrap()
            .starts_with("Bad event:"));
        assert_eq!(store.calls(), 0);
    }
}
