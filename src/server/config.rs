//! Server configuration

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::registry::RegistryConfig;

/// Default listen port
pub const DEFAULT_PORT: u16 = 8000;

/// Default directory for static assets
pub const DEFAULT_ASSET_ROOT: &str = "web";

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Directory static files are served from
    pub asset_root: PathBuf,

    /// Broadcast registry settings
    pub registry: RegistryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            registry: RegistryConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the static asset directory
    pub fn asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    /// Set the per-subscriber buffer capacity
    pub fn subscriber_buffer(mut self, capacity: usize) -> Self {
        self.registry = self.registry.subscriber_buffer(capacity);
        self
    }
}
