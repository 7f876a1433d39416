use std::net::SocketAddr;

/// Largest payload a single UDP datagram can carry over IPv4.
pub(crate) const MAX_UDP_PAYLOAD: usize = 65_507;

/// Configuration for a [`UdpCommLayer`](crate::UdpCommLayer).
///
/// All fields have sensible defaults. Use the builder pattern:
///
/// ```rust
/// use paxos_transport::UdpConfig;
///
/// let config = UdpConfig::new()
///     .bind_addr("0.0.0.0:2440".parse().unwrap())
///     .max_datagram_size(16 * 1024);
/// ```
#[derive(Debug, Clone)]
pub struct UdpConfig {
    /// Local address to bind.
    pub(crate) bind_addr: SocketAddr,
    /// Maximum datagram size in bytes, for both send and receive.
    pub(crate) max_datagram_size: usize,
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl UdpConfig {
    /// Create a new config with defaults (loopback, ephemeral port).
    pub fn new() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            max_datagram_size: MAX_UDP_PAYLOAD,
        }
    }

    /// Set the local bind address (default: `127.0.0.1:0`).
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the maximum datagram size (default and ceiling: 65 507 bytes).
    pub fn max_datagram_size(mut self, bytes: usize) -> Self {
        self.max_datagram_size = bytes.min(MAX_UDP_PAYLOAD);
        self
    }
}
