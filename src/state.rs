//! Shared application state.

use std::sync::Arc;

use crate::store::MembershipStore;

/// State shared with every handler.
///
/// Holds the process-wide membership store; the connection pool behind it
/// is created at startup and closed on shutdown.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MembershipStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn MembershipStore>) -> Self {
        Self { store }
    }
}
