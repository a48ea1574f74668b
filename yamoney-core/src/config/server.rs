//! Server configuration.

use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub listen: SocketAddr,
    /// Path the `check/` and `aviso/` routes are mounted under, e.g. `/yandex-money`.
    pub prefix: String,
}
