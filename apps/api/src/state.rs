use crate::config::Config;
use crate::recommendation::service::RecommendationService;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data; concurrent requests never share mutable state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Provider and extractor are pluggable behind traits; see `main` for selection.
    pub recommender: RecommendationService,
}
