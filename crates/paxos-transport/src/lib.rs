//! Paxos group transport layer.
//!
//! Network identities, immutable group membership snapshots and the
//! `CommLayer` seam the protocol core sends through. A UDP
//! implementation of that seam is included.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use paxos_transport::{CommLayer, UdpCommLayer, UdpConfig, Member};
//!
//! # async fn example() -> Result<(), paxos_transport::PaxosTransportError> {
//! let comm = UdpCommLayer::bind(UdpConfig::new()).await?;
//! println!("Listening as {}", comm.local_member());
//!
//! let peer: Member = "127.0.0.1:2440".parse()?;
//! comm.send_to(&peer, b"hello")?;
//!
//! let (from, data) = comm.recv().await?;
//! println!("From {from}: {} bytes", data.len());
//! # Ok(())
//! # }
//! ```

mod comm;
mod config;
mod error;
mod membership;
mod udp;

pub use comm::CommLayer;
pub use config::UdpConfig;
pub use error::PaxosTransportError;
pub use membership::GroupMembership;
pub use udp::UdpCommLayer;

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

/// Network identity of a group member (host and port).
///
/// Displayed and parsed as `ip:port`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Member(SocketAddr);

impl Member {
    /// Create from a socket address.
    pub fn new(addr: SocketAddr) -> Self {
        Self(addr)
    }

    /// The underlying socket address.
    pub fn addr(&self) -> SocketAddr {
        self.0
    }
}

impl From<SocketAddr> for Member {
    fn from(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Member({})", self.0)
    }
}

impl FromStr for Member {
    type Err = PaxosTransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let addr: SocketAddr = s
            .parse()
            .map_err(|_| PaxosTransportError::InvalidMember(s.to_string()))?;
        Ok(Self(addr))
    }
}

impl serde::Serialize for Member {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Member {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
