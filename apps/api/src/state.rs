use std::sync::Arc;

use crate::analysis::dispatcher::ProviderDispatcher;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Selected once at startup. `None` inside means analysis requests get a 503.
    pub dispatcher: Arc<ProviderDispatcher>,
}
