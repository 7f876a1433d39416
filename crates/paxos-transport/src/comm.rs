use std::sync::Arc;

use crate::{Member, PaxosTransportError};

/// Send seam consumed by the protocol core.
///
/// Best-effort and non-blocking: no delivery acknowledgment is implied.
/// In production: [`UdpCommLayer`](crate::UdpCommLayer).
/// In tests: a mock that records every send.
pub trait CommLayer {
    /// Send bytes to a single member.
    fn send_to(&self, member: &Member, data: &[u8]) -> Result<(), PaxosTransportError>;

    /// Send the same bytes to every member in `members`.
    ///
    /// Equivalent to one `send_to` per member. A failing member does not
    /// stop the others; the first error is returned.
    fn send_to_all(&self, members: &[Member], data: &[u8]) -> Result<(), PaxosTransportError> {
        let mut first_err = None;
        for member in members {
            if let Err(e) = self.send_to(member, data) {
                tracing::debug!("send to {member} failed: {e}");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<T: CommLayer + ?Sized> CommLayer for &T {
    fn send_to(&self, member: &Member, data: &[u8]) -> Result<(), PaxosTransportError> {
        (**self).send_to(member, data)
    }

    fn send_to_all(&self, members: &[Member], data: &[u8]) -> Result<(), PaxosTransportError> {
        (**self).send_to_all(members, data)
    }
}

impl<T: CommLayer + ?Sized> CommLayer for Arc<T> {
    fn send_to(&self, member: &Member, data: &[u8]) -> Result<(), PaxosTransportError> {
        (**self).send_to(member, data)
    }

    fn send_to_all(&self, members: &[Member], data: &[u8]) -> Result<(), PaxosTransportError> {
        (**self).send_to_all(members, data)
    }
}
