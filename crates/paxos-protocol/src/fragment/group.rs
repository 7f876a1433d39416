use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use paxos_transport::CommLayer;
use serde::Serialize;

use crate::codec::{Codec, MsgPackCodec};
use crate::config::ProtocolConfig;
use crate::error::PaxosProtocolError;
use crate::types::GroupMembership;

use super::types::{Fragment, GroupFrame};

/// Process-wide fragment message ids. Receivers key by sender as well,
/// so ids only need to be unique within this process.
static NEXT_MESSAGE_ID: AtomicU64 = AtomicU64::new(1);

fn next_message_id() -> u64 {
    NEXT_MESSAGE_ID.fetch_add(1, Ordering::Relaxed)
}

/// A group that can broadcast one frame to every member.
pub trait BroadcastGroup {
    fn broadcast(&self, frame: GroupFrame) -> Result<(), PaxosProtocolError>;
}

impl<G: BroadcastGroup + ?Sized> BroadcastGroup for &G {
    fn broadcast(&self, frame: GroupFrame) -> Result<(), PaxosProtocolError> {
        (**self).broadcast(frame)
    }
}

impl<G: BroadcastGroup + ?Sized> BroadcastGroup for Arc<G> {
    fn broadcast(&self, frame: GroupFrame) -> Result<(), PaxosProtocolError> {
        (**self).broadcast(frame)
    }
}

/// Cut already-serialized `bytes` into frames of at most `fragment_size`
/// payload bytes: one [`GroupFrame::Message`] when it fits, otherwise
/// consecutive [`GroupFrame::Fragment`]s sharing a fresh message id.
pub(crate) fn split_frames(
    bytes: Bytes,
    fragment_size: usize,
) -> Result<Vec<GroupFrame>, PaxosProtocolError> {
    let fragment_size = fragment_size.max(1);
    if bytes.len() <= fragment_size {
        return Ok(vec![GroupFrame::Message(bytes)]);
    }

    let parts = bytes.len().div_ceil(fragment_size);
    let total_parts = u32::try_from(parts).map_err(|_| {
        PaxosProtocolError::Serialization(format!(
            "{} bytes need {parts} fragments, more than a fragment index can address",
            bytes.len()
        ))
    })?;
    let message_id = next_message_id();

    tracing::trace!(
        "fragmenting {} bytes into {total_parts} parts (message {message_id})",
        bytes.len()
    );

    Ok((0..bytes.len())
        .step_by(fragment_size)
        .enumerate()
        .map(|(part_index, start)| {
            let end = (start + fragment_size).min(bytes.len());
            GroupFrame::Fragment(Fragment {
                message_id,
                part_index: part_index as u32,
                total_parts,
                bytes: bytes.slice(start..end),
            })
        })
        .collect())
}

// ── CommLayerGroup ──────────────────────────────────────────────────────

/// Broadcasts encoded frames to every member through a [`CommLayer`].
#[derive(Debug, Clone)]
pub struct CommLayerGroup<T, C = MsgPackCodec> {
    comm: T,
    membership: Arc<GroupMembership>,
    codec: C,
}

impl<T: CommLayer> CommLayerGroup<T> {
    pub fn new(comm: T, membership: Arc<GroupMembership>) -> Self {
        Self {
            comm,
            membership,
            codec: MsgPackCodec,
        }
    }
}

impl<T: CommLayer, C: Codec> CommLayerGroup<T, C> {
    pub fn with_codec(comm: T, membership: Arc<GroupMembership>, codec: C) -> Self {
        Self {
            comm,
            membership,
            codec,
        }
    }

    pub fn membership(&self) -> &GroupMembership {
        &self.membership
    }
}

impl<T: CommLayer, C: Codec> BroadcastGroup for CommLayerGroup<T, C> {
    fn broadcast(&self, frame: GroupFrame) -> Result<(), PaxosProtocolError> {
        let bytes = self.codec.serialize(&frame)?;
        self.comm
            .send_to_all(self.membership.members(), &bytes)
            .map_err(Into::into)
    }
}

// ── FragmentingGroup ────────────────────────────────────────────────────

/// Decorator that fragments oversized messages before broadcasting.
///
/// A message whose serialized form fits in `fragment_size` bytes is
/// broadcast once as [`GroupFrame::Message`]. Anything larger is cut into
/// consecutive `fragment_size` chunks (the last holds the remainder) and
/// broadcast as [`GroupFrame::Fragment`]s in increasing `part_index` order.
#[derive(Debug)]
pub struct FragmentingGroup<G, C = MsgPackCodec> {
    inner: G,
    codec: C,
    fragment_size: usize,
}

impl<G: BroadcastGroup> FragmentingGroup<G> {
    /// Wrap `inner` with the default 64 000-byte threshold.
    pub fn new(inner: G) -> Self {
        Self::with_config(inner, &ProtocolConfig::default())
    }

    pub fn with_config(inner: G, config: &ProtocolConfig) -> Self {
        Self::with_codec(inner, MsgPackCodec, config)
    }
}

impl<G: BroadcastGroup, C: Codec> FragmentingGroup<G, C> {
    pub fn with_codec(inner: G, codec: C, config: &ProtocolConfig) -> Self {
        Self {
            inner,
            codec,
            fragment_size: config.fragment_size,
        }
    }

    pub fn fragment_size(&self) -> usize {
        self.fragment_size
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    /// Serialize and broadcast `message`, fragmenting when needed.
    ///
    /// Returns the number of frames handed to the inner group. Inner
    /// broadcast failures are logged, not retried.
    pub fn broadcast<M: Serialize + ?Sized>(
        &self,
        message: &M,
    ) -> Result<usize, PaxosProtocolError> {
        let bytes = Bytes::from(self.codec.serialize(message)?);
        let frames = split_frames(bytes, self.fragment_size)?;
        let count = frames.len();
        for frame in frames {
            self.send(frame);
        }
        Ok(count)
    }

    fn send(&self, frame: GroupFrame) {
        if let Err(e) = self.inner.broadcast(frame) {
            tracing::debug!("group broadcast failed: {e}");
        }
    }
}
