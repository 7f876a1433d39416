use std::time::Duration;

use crate::fragment::MAX_FRAME_OVERHEAD;
use crate::types::{DEFAULT_FRAGMENT_SIZE, RETRY_INTERVAL_MS};

/// Configuration for requests and fragmenting groups.
///
/// ```rust
/// use std::time::Duration;
/// use paxos_protocol::ProtocolConfig;
///
/// let config = ProtocolConfig::new()
///     .retry_interval(Duration::from_millis(250))
///     .fragment_size(8 * 1024);
/// ```
#[derive(Debug, Clone)]
pub struct ProtocolConfig {
    /// Resend period for members that have not responded.
    pub(crate) retry_interval: Duration,
    /// Largest serialized message sent unfragmented; also the chunk size.
    pub(crate) fragment_size: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolConfig {
    pub fn new() -> Self {
        Self {
            retry_interval: Duration::from_millis(RETRY_INTERVAL_MS),
            fragment_size: DEFAULT_FRAGMENT_SIZE,
        }
    }

    /// Set the resend period (default: 1 s, minimum: 1 ms).
    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Set the fragment threshold (default: 64 000 bytes, minimum: 1).
    ///
    /// This bounds the payload of a frame, not the encoded frame: leave
    /// [`MAX_FRAME_OVERHEAD`] bytes under the transport's datagram limit,
    /// or use [`for_datagram_size`](Self::for_datagram_size).
    pub fn fragment_size(mut self, bytes: usize) -> Self {
        self.fragment_size = bytes.max(1);
        self
    }

    /// Size fragments so every encoded frame fits in `max_datagram_size`.
    pub fn for_datagram_size(self, max_datagram_size: usize) -> Self {
        self.fragment_size(max_datagram_size.saturating_sub(MAX_FRAME_OVERHEAD))
    }

    pub(crate) fn retry_interval_ms(&self) -> u64 {
        u64::try_from(self.retry_interval.as_millis())
            .unwrap_or(u64::MAX)
            .max(1)
    }
}
