//! TOML file configuration structures.
//!
//! These structs directly map to the `yamoney-config.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub yandex_money: YandexMoneyConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
    /// Path prefix for the notification routes (e.g., "/yandex-money").
    #[serde(default)]
    pub prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
            prefix: String::new(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}

/// Shop account section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexMoneyConfig {
    /// Shop identifier issued by the provider.
    pub shop_id: i64,
    /// Storefront number.
    pub scid: i64,
    pub success_url: Url,
    pub fail_url: Url,
}
