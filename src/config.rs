//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::AppError;

/// Default listen port (on all interfaces)
pub const DEFAULT_PORT: u16 = 65432;

/// Bytes requested per read; one read is one unit of frames
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// Outbound notifications buffered per client before new ones are dropped
pub const DEFAULT_OUTBOUND_QUEUE: usize = 256;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Maximum bytes per read
    pub read_buffer_size: usize,

    /// Per-client outbound queue capacity
    pub outbound_queue: usize,

    /// Disconnect clients that send nothing for this long (None = never)
    pub idle_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            outbound_queue: DEFAULT_OUTBOUND_QUEUE,
            idle_timeout: None,
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

    /// Set the idle timeout (zero disables it)
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self.normalized()
    }

    /// Set the per-client outbound queue capacity (at least 1)
    pub fn with_outbound_queue(mut self, capacity: usize) -> Self {
        self.outbound_queue = capacity;
        self.normalized()
    }

    /// Bring directly-assigned fields back into range
    ///
    /// A zero queue capacity becomes 1, a zero idle timeout means no timeout
    /// and a zero read buffer falls back to the default.
    pub fn normalized(mut self) -> Self {
        self.outbound_queue = self.outbound_queue.max(1);
        if self.read_buffer_size == 0 {
            self.read_buffer_size = DEFAULT_READ_BUFFER_SIZE;
        }
        if self.idle_timeout.is_some_and(|t| t.is_zero()) {
            self.idle_timeout = None;
        }
        self
    }

    /// Build from positional arguments: `[ADDR] [IDLE_TIMEOUT_SECS]`
    ///
    /// The program name must already be skipped.
    pub fn from_args<I>(args: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut config = Self::default();

        if let Some(addr) = args.next() {
            config.bind_addr = addr
                .parse()
                .map_err(|_| AppError::Config(format!("invalid bind address '{}'", addr)))?;
        }

        if let Some(secs) = args.next() {
            let secs: u64 = secs
                .parse()
                .map_err(|_| AppError::Config(format!("invalid idle timeout '{}'", secs)))?;
            config = config.with_idle_timeout(Duration::from_secs(secs));
        }

        if let Some(extra) = args.next() {
            return Err(AppError::Config(format!("unexpected argument '{}'", extra)));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:65432");
        assert_eq!(config.read_buffer_size, 1024);
        assert!(config.idle_timeout.is_none());
    }

    #[test]
    fn test_from_args_empty() {
        let config = ServerConfig::from_args(args(&[])).unwrap();
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:65432");
    }

    #[test]
    fn test_from_args_addr_and_timeout() {
        let config = ServerConfig::from_args(args(&["127.0.0.1:9000", "30"])).unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_from_args_zero_timeout_disables() {
        let config = ServerConfig::from_args(args(&["127.0.0.1:9000", "0"])).unwrap();
        assert!(config.idle_timeout.is_none());
    }

    #[test]
    fn test_from_args_rejects_bad_input() {
        assert!(matches!(
            ServerConfig::from_args(args(&["not-an-addr"])),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            ServerConfig::from_args(args(&["127.0.0.1:9000", "soon"])),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            ServerConfig::from_args(args(&["127.0.0.1:9000", "5", "extra"])),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_outbound_queue_min() {
        let config = ServerConfig::default().with_outbound_queue(0);
        assert_eq!(config.outbound_queue, 1);
    }

    #[test]
    fn test_zero_idle_timeout_disables() {
        let config = ServerConfig::default().with_idle_timeout(Duration::ZERO);
        assert!(config.idle_timeout.is_none());
    }

    #[test]
    fn test_normalized_fixes_direct_assignment() {
        let mut config = ServerConfig::default();
        config.outbound_queue = 0;
        config.read_buffer_size = 0;
        config.idle_timeout = Some(Duration::ZERO);

        let config = config.normalized();
        assert_eq!(config.outbound_queue, 1);
        assert_eq!(config.read_buffer_size, DEFAULT_READ_BUFFER_SIZE);
        assert!(config.idle_timeout.is_none());
    }
}
