use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;

use bytes::{Bytes, BytesMut};
use serde::de::DeserializeOwned;

use crate::codec::{Codec, MsgPackCodec};
use crate::error::PaxosProtocolError;
use crate::types::Member;

use super::types::{Fragment, GroupFrame};

/// Downstream consumer of reassembled messages.
pub trait Receiver<M> {
    fn receive(&mut self, from: Member, message: M);
}

impl<M, F: FnMut(Member, M)> Receiver<M> for F {
    fn receive(&mut self, from: Member, message: M) {
        self(from, message)
    }
}

/// Parts received so far for one `(sender, message_id)`.
#[derive(Debug)]
struct PartialMessage {
    total_parts: u32,
    parts: BTreeMap<u32, Bytes>,
}

impl PartialMessage {
    fn new(total_parts: u32) -> Self {
        Self {
            total_parts,
            parts: BTreeMap::new(),
        }
    }

    fn is_complete(&self) -> bool {
        self.parts.len() == self.total_parts as usize
    }

    /// Concatenate parts in index order.
    fn assemble(self) -> Bytes {
        let len: usize = self.parts.values().map(Bytes::len).sum();
        let mut out = BytesMut::with_capacity(len);
        for part in self.parts.into_values() {
            out.extend_from_slice(&part);
        }
        out.freeze()
    }
}

/// Reassembles fragmented messages and forwards them to a [`Receiver`].
///
/// Fragments are keyed by `(sender, message_id)`, so two senders may reuse
/// the same id. Parts may arrive in any order; a duplicate part replaces
/// the earlier copy. Whole messages pass straight through.
///
/// No eviction: a message missing a part stays buffered until
/// [`discard_from`](Self::discard_from) drops it.
pub struct FragmentJoiner<M, R, C = MsgPackCodec> {
    receiver: R,
    codec: C,
    partial: HashMap<(Member, u64), PartialMessage>,
    _message: PhantomData<fn() -> M>,
}

impl<M, R> FragmentJoiner<M, R>
where
    M: DeserializeOwned,
    R: Receiver<M>,
{
    pub fn new(receiver: R) -> Self {
        Self::with_codec(receiver, MsgPackCodec)
    }
}

impl<M, R, C> FragmentJoiner<M, R, C>
where
    M: DeserializeOwned,
    R: Receiver<M>,
    C: Codec,
{
    pub fn with_codec(receiver: R, codec: C) -> Self {
        Self {
            receiver,
            codec,
            partial: HashMap::new(),
            _message: PhantomData,
        }
    }

    /// Handle one frame from `from`.
    ///
    /// Delivers at most one message. On error nothing is delivered; a
    /// malformed fragment leaves buffered state untouched.
    pub fn receive(&mut self, from: Member, frame: GroupFrame) -> Result<(), PaxosProtocolError> {
        match frame {
            GroupFrame::Message(bytes) => self.deliver(from, &bytes),
            GroupFrame::Fragment(fragment) => self.accept_fragment(from, fragment),
        }
    }

    /// Decode a raw datagram as a [`GroupFrame`] and handle it.
    pub fn receive_bytes(&mut self, from: Member, data: &[u8]) -> Result<(), PaxosProtocolError> {
        let frame: GroupFrame = self.codec.deserialize(data)?;
        self.receive(from, frame)
    }

    /// Number of messages with at least one part buffered.
    pub fn pending_len(&self) -> usize {
        self.partial.len()
    }

    /// Drop every incomplete message from `member` (e.g. when it leaves
    /// the group). Returns how many were dropped.
    pub fn discard_from(&mut self, member: &Member) -> usize {
        let before = self.partial.len();
        self.partial.retain(|(sender, _), _| sender != member);
        let dropped = before - self.partial.len();
        if dropped > 0 {
            tracing::debug!("discarded {dropped} incomplete messages from {member}");
        }
        dropped
    }

    pub fn receiver(&self) -> &R {
        &self.receiver
    }

    pub fn receiver_mut(&mut self) -> &mut R {
        &mut self.receiver
    }

    pub fn into_receiver(self) -> R {
        self.receiver
    }

    // ── Internal ───────────────────────────────────────────────────────

    fn accept_fragment(&mut self, from: Member, fragment: Fragment) -> Result<(), PaxosProtocolError> {
        let Fragment {
            message_id,
            part_index,
            total_parts,
            bytes,
        } = fragment;

        if total_parts == 0 {
            return Err(invalid(from, format!("message {message_id} has zero parts")));
        }
        if part_index >= total_parts {
            return Err(invalid(
                from,
                format!("part {part_index} of {total_parts} (message {message_id})"),
            ));
        }

        let key = (from, message_id);
        let partial = self
            .partial
            .entry(key)
            .or_insert_with(|| PartialMessage::new(total_parts));

        if partial.total_parts != total_parts {
            let expected = partial.total_parts;
            return Err(invalid(
                from,
                format!("message {message_id} announced {expected} parts, fragment says {total_parts}"),
            ));
        }

        if partial.parts.insert(part_index, bytes).is_some() {
            tracing::trace!("duplicate part {part_index} of message {message_id} from {from}");
        }

        if !partial.is_complete() {
            return Ok(());
        }

        let Some(partial) = self.partial.remove(&key) else {
            return Ok(());
        };
        tracing::trace!("reassembled message {message_id} from {from} ({total_parts} parts)");
        self.deliver(from, &partial.assemble())
    }

    fn deliver(&mut self, from: Member, bytes: &[u8]) -> Result<(), PaxosProtocolError> {
        let message: M = self.codec.deserialize(bytes)?;
        self.receiver.receive(from, message);
        Ok(())
    }
}

impl<M, R, C> std::fmt::Debug for FragmentJoiner<M, R, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FragmentJoiner")
            .field("pending", &self.partial.len())
            .finish()
    }
}

fn invalid(from: Member, reason: String) -> PaxosProtocolError {
    tracing::debug!("dropping fragment from {from}: {reason}");
    PaxosProtocolError::InvalidFragment { from, reason }
}
