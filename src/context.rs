use std::sync::Arc;

use crate::services::LanguageModelService;

/// Shared, read-only handles for every run. Cloned into each request.
#[derive(Clone)]
pub struct AppContext {
    pub language_model: Arc<dyn LanguageModelService>,
}

impl AppContext {
    pub fn new(language_model: Arc<dyn LanguageModelService>) -> Self {
        Self { language_model }
    }
}
