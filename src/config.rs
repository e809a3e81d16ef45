use std::net::{AddrParseError, SocketAddr};

pub static CONFIG: once_cell::sync::Lazy<ServiceConfig> = once_cell::sync::Lazy::new(ServiceConfig::init);

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 50051;
pub const DEFAULT_MAX_CONCURRENT_CALLS: usize = 10_000;
pub const DEFAULT_LOG_FILTER: &str = "distance_service=debug,tower_http=debug";

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub max_concurrent_calls: usize,
}

impl ServiceConfig {
    pub fn init() -> ServiceConfig {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Values that fail to parse fall
    /// back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ServiceConfig {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = lookup("PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let max_concurrent_calls = lookup("MAX_CONCURRENT_CALLS")
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_CONCURRENT_CALLS);

        ServiceConfig {
            host,
            port,
            max_concurrent_calls,
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}
