use std::sync::Arc;

use crate::core::config::Settings;
use crate::services::results::ResultService;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    results: ResultService,
}

impl AppState {
    pub(crate) fn new(settings: Settings, results: ResultService) -> Self {
        Self { inner: Arc::new(InnerState { settings, results }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn results(&self) -> &ResultService {
        &self.inner.results
    }
}
