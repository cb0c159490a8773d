use axum::{body::Bytes, extract::State};
use tracing::warn;

use crate::envelope::ResponseEnvelope;
use crate::errors::PipelineError;
use crate::event::S3Event;
use crate::state::AppState;

/// POST /api/v1/events/s3
///
/// The body is parsed here rather than with the `Json` extractor so that a
/// malformed notification still gets the failure envelope.
pub async fn handle_s3_event(State(state): State<AppState>, body: Bytes) -> ResponseEnvelope {
    let event: S3Event = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!("Rejected S3 event body: {e}");
            let err =
                PipelineError::BadEvent(format!("event is not valid S3 notification JSON: {e}"));
            return ResponseEnvelope::failure(&err);
        }
    };
    state.pipeline.process(&event).await
}
