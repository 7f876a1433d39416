/// Message fragmentation for broadcast groups with bounded frame size.
///
/// Outbound: `FragmentingGroup` serializes a message and either sends it
/// whole (common case) or splits the bytes into numbered fragments.
/// `FragmentingComm` does the same for bytes handed to a `CommLayer`, so a
/// `QuorumRequest` can send payloads larger than one datagram.
/// Inbound: `FragmentJoiner` collects fragments per `(sender, message_id)`
/// and delivers the original message once every part has arrived.
/// The fragmenter only looks at byte lengths, never at message structure.
pub mod comm;
pub mod group;
pub mod joiner;
pub mod types;

pub use comm::FragmentingComm;
pub use group::{BroadcastGroup, CommLayerGroup, FragmentingGroup};
pub use joiner::{FragmentJoiner, Receiver};
pub use types::{Fragment, GroupFrame, MAX_FRAME_OVERHEAD};
