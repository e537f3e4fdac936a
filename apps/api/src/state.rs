use crate::analysis::InferenceGateway;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Prompt-building front for the model server. Wraps an `Arc<dyn ModelBackend>`.
    pub gateway: InferenceGateway,
}
