use crate::screening::export::ProfileStore;
use crate::screening::question_selector::QuestionSelector;
use crate::screening::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// Template-only when no API key is configured.
    pub selector: QuestionSelector,
    pub profiles: ProfileStore,
}
