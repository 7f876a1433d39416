/// Serialization seam shared by requests and the fragmenting group.
///
/// The core never inspects message structure: it only needs
/// `value -> bytes` and back, deterministic and lossless.
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::PaxosProtocolError;

pub trait Codec {
    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, PaxosProtocolError>;

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, PaxosProtocolError>;
}

/// MessagePack codec (compact binary), the wire format for every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackCodec;

impl Codec for MsgPackCodec {
    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, PaxosProtocolError> {
        rmp_serde::to_vec(value).map_err(Into::into)
    }

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, PaxosProtocolError> {
        rmp_serde::from_slice(bytes).map_err(Into::into)
    }
}
