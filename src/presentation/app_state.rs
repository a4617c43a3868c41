// Application state for HTTP handlers
use crate::application::engine::DiagnosticEngine;

#[derive(Clone)]
pub struct AppState {
    pub engine: DiagnosticEngine,
}
