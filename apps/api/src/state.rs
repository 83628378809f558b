use std::sync::Arc;

use crate::config::Config;
use crate::documents::extract::TextExtractor;
use crate::llm_client::Evaluator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Evaluation backend. `LlmClient` in production, scripted in tests.
    pub evaluator: Arc<dyn Evaluator>,
    pub config: Arc<Config>,
    pub extractor: TextExtractor,
}

impl AppState {
    pub fn new(evaluator: Arc<dyn Evaluator>, config: Config) -> Self {
        Self {
            evaluator,
            extractor: TextExtractor::from_config(&config),
            config: Arc::new(config),
        }
    }
}
