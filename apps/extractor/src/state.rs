use std::sync::Arc;

use crate::pipeline::Pipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Built once at startup; its clients are shared by every request.
    pub pipeline: Arc<Pipeline>,
}
