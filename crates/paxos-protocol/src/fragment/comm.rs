use bytes::Bytes;
use paxos_transport::{CommLayer, PaxosTransportError};

use crate::codec::{Codec, MsgPackCodec};
use crate::config::ProtocolConfig;
use crate::error::PaxosProtocolError;
use crate::types::Member;

use super::group::split_frames;
use super::types::GroupFrame;

/// [`CommLayer`] decorator that frames every outgoing payload.
///
/// Each `send_to`/`send_to_all` call treats `data` as one serialized
/// message: it travels as a single [`GroupFrame::Message`] when it fits in
/// `fragment_size`, otherwise as numbered [`GroupFrame::Fragment`]s. The
/// receiving side feeds datagrams to
/// [`FragmentJoiner::receive_bytes`](super::FragmentJoiner::receive_bytes).
///
/// Handing one to a [`QuorumRequest`](crate::QuorumRequest) lets it send
/// payloads larger than the inner transport's datagram limit; every resend
/// is framed afresh under a new message id.
#[derive(Debug, Clone)]
pub struct FragmentingComm<T, C = MsgPackCodec> {
    inner: T,
    codec: C,
    fragment_size: usize,
}

impl<T: CommLayer> FragmentingComm<T> {
    /// Wrap `inner` with the default 64 000-byte threshold.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, &ProtocolConfig::default())
    }

    pub fn with_config(inner: T, config: &ProtocolConfig) -> Self {
        Self::with_codec(inner, MsgPackCodec, config)
    }
}

impl<T: CommLayer, C: Codec> FragmentingComm<T, C> {
    pub fn with_codec(inner: T, codec: C, config: &ProtocolConfig) -> Self {
        Self {
            inner,
            codec,
            fragment_size: config.fragment_size,
        }
    }

    pub fn fragment_size(&self) -> usize {
        self.fragment_size
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Frame `data`, encode each frame and pass it to `send`. Every frame
    /// is attempted; the first send error is returned.
    fn send_frames(
        &self,
        data: &[u8],
        mut send: impl FnMut(&[u8]) -> Result<(), PaxosTransportError>,
    ) -> Result<(), PaxosTransportError> {
        let frames =
            split_frames(Bytes::copy_from_slice(data), self.fragment_size).map_err(framing)?;

        let mut first_err = None;
        for frame in &frames {
            let encoded = self.codec.serialize(frame).map_err(framing)?;
            if let Err(e) = send(&encoded) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<T: CommLayer, C: Codec> CommLayer for FragmentingComm<T, C> {
    fn send_to(&self, member: &Member, data: &[u8]) -> Result<(), PaxosTransportError> {
        self.send_frames(data, |frame| self.inner.send_to(member, frame))
    }

    /// Frames once, so every member sees the same message id.
    fn send_to_all(&self, members: &[Member], data: &[u8]) -> Result<(), PaxosTransportError> {
        self.send_frames(data, |frame| self.inner.send_to_all(members, frame))
    }
}

fn framing(e: PaxosProtocolError) -> PaxosTransportError {
    match e {
        PaxosProtocolError::Transport(e) => e,
        other => PaxosTransportError::Framing(other.to_string()),
    }
}
