//! Server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Origin entry that allows every origin.
pub const ANY_ORIGIN: &str = "*";

/// Default optimizer path, relative to the working directory.
pub const DEFAULT_OPTIMIZER_PATH: &str = "./capacitor_optimizer";

/// Default time budget for one optimizer run.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Cross-origin policy applied to every route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    /// Allowed origins. A lone `*` allows any origin; with credentials on,
    /// the caller's origin is echoed back instead of a literal `*`.
    pub origins: Vec<String>,
    pub allow_credentials: bool,
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.origins.iter().any(|o| o == ANY_ORIGIN)
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: vec![ANY_ORIGIN.to_string()],
            allow_credentials: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub optimizer_path: PathBuf,
    /// Time budget per optimizer run; the process is killed when it expires.
    pub timeout: Duration,
    pub cors: CorsConfig,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
            optimizer_path: PathBuf::from(DEFAULT_OPTIMIZER_PATH),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cors: CorsConfig::default(),
        }
    }
}
