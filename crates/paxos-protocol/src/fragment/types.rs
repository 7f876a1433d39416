/// Wire records carried by an underlying broadcast group.
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Upper bound on the bytes a [`GroupFrame`] adds around its payload when
/// encoded with MessagePack (enum tag, field headers, `bin32` length).
/// A transport with a datagram ceiling needs a fragment size at least this
/// much smaller.
pub const MAX_FRAME_OVERHEAD: usize = 64;

/// One bounded-size chunk of a larger serialized message.
///
/// Every fragment of a message carries the same `message_id` and
/// `total_parts`; `part_index` runs `0..total_parts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    /// Unique per sending process.
    pub message_id: u64,
    /// 0-based position of `bytes` in the original serialized message.
    pub part_index: u32,
    pub total_parts: u32,
    /// Encoded as MessagePack binary, not an integer array.
    pub bytes: Bytes,
}

/// What travels through the underlying group.
///
/// Messages within the threshold travel as `Message`, unwrapped;
/// only oversized ones are split into `Fragment`s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupFrame {
    /// A complete serialized message.
    Message(Bytes),
    /// One part of a fragmented message.
    Fragment(Fragment),
}

impl GroupFrame {
    /// Payload length, excluding framing.
    pub fn payload_len(&self) -> usize {
        match self {
            GroupFrame::Message(bytes) => bytes.len(),
            GroupFrame::Fragment(fragment) => fragment.bytes.len(),
        }
    }
}
