use std::sync::Arc;

use crate::services::{presentation::Presentation, RecommendationEngine};

/// Shared application state.
///
/// The engine is immutable after startup, so handlers share it without locks.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
    pub presentation: Presentation,
}

impl AppState {
    pub fn new(engine: RecommendationEngine, presentation: Presentation) -> Self {
        Self {
            engine: Arc::new(engine),
            presentation,
        }
    }
}
