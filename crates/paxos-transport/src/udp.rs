use std::sync::Arc;

use tokio::net::UdpSocket;

use crate::config::UdpConfig;
use crate::{CommLayer, Member, PaxosTransportError};

/// A UDP comm layer over one tokio socket.
///
/// Sends never wait: a datagram the socket cannot take right now is
/// reported as a send error and dropped. Cheap to clone; clones share
/// the socket.
#[derive(Debug, Clone)]
pub struct UdpCommLayer {
    socket: Arc<UdpSocket>,
    local: Member,
    max_datagram_size: usize,
}

impl UdpCommLayer {
    /// Bind a new UDP socket.
    pub async fn bind(config: UdpConfig) -> Result<Self, PaxosTransportError> {
        let socket = UdpSocket::bind(config.bind_addr)
            .await
            .map_err(PaxosTransportError::Bind)?;
        let local = Member::new(socket.local_addr().map_err(PaxosTransportError::Bind)?);

        tracing::debug!("udp comm layer bound to {local}");

        Ok(Self {
            socket: Arc::new(socket),
            local,
            max_datagram_size: config.max_datagram_size,
        })
    }

    /// The member identity peers use to reach this socket.
    pub fn local_member(&self) -> Member {
        self.local
    }

    pub fn max_datagram_size(&self) -> usize {
        self.max_datagram_size
    }

    /// Receive the next datagram.
    ///
    /// Datagrams larger than the configured maximum are truncated by the
    /// OS; callers see the truncated bytes.
    pub async fn recv(&self) -> Result<(Member, Vec<u8>), PaxosTransportError> {
        let mut buf = vec![0u8; self.max_datagram_size];
        let (len, from) = self
            .socket
            .recv_from(&mut buf)
            .await
            .map_err(PaxosTransportError::Receive)?;
        buf.truncate(len);
        Ok((Member::new(from), buf))
    }
}

impl CommLayer for UdpCommLayer {
    fn send_to(&self, member: &Member, data: &[u8]) -> Result<(), PaxosTransportError> {
        if data.len() > self.max_datagram_size {
            return Err(PaxosTransportError::MessageTooLarge {
                size: data.len(),
                max: self.max_datagram_size,
            });
        }

        self.socket
            .try_send_to(data, member.addr())
            .map(|_| ())
            .map_err(|source| PaxosTransportError::Send {
                member: *member,
                source,
            })
    }
}
