use crate::core::AppConfig;

/// Read-only state shared by every request handler. Requests never
/// write to it so it needs no lock.
pub struct AppState {
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }
}
