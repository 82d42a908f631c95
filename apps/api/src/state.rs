use std::sync::Arc;

use crate::config::Config;
use crate::render::Renderer;
use crate::suggestions::GenerationService;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no per-request data; every suggestion batch is independent.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Keyword and suggestion generation. Default: the Anthropic-backed `LlmClient`.
    pub generator: Arc<dyn GenerationService>,
    /// LaTeX to PDF. Default: `LatexmkRenderer`.
    pub renderer: Arc<dyn Renderer>,
}
