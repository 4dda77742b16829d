//! Shared handler state.

use std::sync::Arc;

use forum_config::ForumConfig;
use forum_db::service::ForumService;

/// Cloned into every handler. Both halves are behind `Arc`, so cloning is a
/// pair of refcount bumps.
#[derive(Clone)]
pub struct AppState {
    pub forum: Arc<ForumService>,
    pub config: Arc<ForumConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(forum: ForumService, config: ForumConfig) -> Self {
        Self {
            forum: Arc::new(forum),
            config: Arc::new(config),
        }
    }

    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.config.auth.cookie_name
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.config.general.page_size
    }
}
