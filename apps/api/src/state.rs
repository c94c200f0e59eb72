use std::sync::Arc;

use crate::layout::DimensionRegistry;
use crate::preferences::PreferenceStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Persistence gateway. Default: Postgres-backed `PgPreferenceStore`.
    pub store: Arc<dyn PreferenceStore>,
    /// Card footprints, loaded once at startup (built-in table plus overrides).
    pub registry: Arc<DimensionRegistry>,
}
