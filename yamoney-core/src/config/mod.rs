//! Configuration types for yamoney.
//!
//! These types represent the validated runtime configuration used by the server
//! and the notification handler. The actual config loading/parsing is handled
//! by the server crate.

mod defaults;
mod server;

pub use defaults::PaymentDefaults;
pub use server::ServerConfig;

use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared configuration state with separate locks for each section.
///
/// This allows independent access to different configuration sections
/// without blocking other readers/writers.
#[derive(Clone)]
pub struct SharedConfig {
    /// Server configuration (listen address, route prefix).
    pub server: Arc<RwLock<ServerConfig>>,
    /// Defaults applied to payments created from notifications.
    pub defaults: Arc<RwLock<PaymentDefaults>>,
}

impl SharedConfig {
    pub fn new(server: ServerConfig, defaults: PaymentDefaults) -> Self {
        Self {
            server: Arc::new(RwLock::new(server)),
            defaults: Arc::new(RwLock::new(defaults)),
        }
    }
}
