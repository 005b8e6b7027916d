//! Shared application state.

use std::sync::Arc;

use crate::usecase::Gateway;

/// State handed to every axum handler.
pub struct AppState {
    /// Realtime protocol handler shared by every connection task
    pub gateway: Arc<Gateway>,
}
