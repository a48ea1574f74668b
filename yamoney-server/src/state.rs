//! Application state shared across all request handlers.

use std::sync::Arc;
use yamoney_core::config::SharedConfig;
use yamoney_core::notice::NoticeHandler;
use yamoney_core::signals::PaymentSignals;
use yamoney_core::store::PaymentStore;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Runtime configuration (can be reloaded via SIGHUP).
    pub config: SharedConfig,
    /// Applies `checkOrder` / `paymentAviso` notifications.
    pub notices: NoticeHandler,
}

impl AppState {
    pub fn new(
        config: SharedConfig,
        store: Arc<dyn PaymentStore>,
        signals: Arc<PaymentSignals>,
    ) -> Self {
        let notices = NoticeHandler::new(store, signals, config.defaults.clone());
        Self { config, notices }
    }
}
