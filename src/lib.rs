use std::sync::Arc;

use config::Config;
use store::SessionManager;

pub mod config;
pub mod error;
pub mod middleware;
pub mod result;
pub mod router;
pub mod routes;
pub mod store;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub manager: Arc<SessionManager>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let manager = Arc::new(SessionManager::from_config(&config));
        Self { config, manager }
    }
}
