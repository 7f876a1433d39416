//! Paxos building blocks on top of `paxos-transport`.
//!
//! - [`QuorumRequest`]: broadcast a request to every group member, resend to
//!   the silent ones once per retry period, and fire callbacks when a
//!   majority and then everyone has responded.
//! - [`fragment`]: split serialized messages larger than a threshold into
//!   numbered fragments and reassemble them on the receiving side. Wrap a
//!   request's transport in [`FragmentingComm`] to send payloads larger
//!   than one datagram.
//! - [`drive`]: a tokio loop that owns one request and feeds it messages
//!   and ticks.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use paxos_protocol::{drive, now_ms, Callbacks, GroupMembership, Member, MessageWithSender, QuorumRequest};
//! use paxos_transport::{UdpCommLayer, UdpConfig};
//!
//! struct Promise { from: Member }
//!
//! impl MessageWithSender for Promise {
//!     fn sender(&self) -> Member { self.from }
//! }
//!
//! # async fn example() -> Result<(), paxos_protocol::PaxosProtocolError> {
//! let comm = UdpCommLayer::bind(UdpConfig::new()).await?;
//! let peers: Vec<Member> = vec![comm.local_member(), "127.0.0.1:2441".parse()?];
//! let membership = Arc::new(GroupMembership::new(peers, 0)?);
//!
//! let callbacks = Callbacks::<Promise>::new().on_quorum(|| println!("quorum"));
//! let request = QuorumRequest::new(membership, comm, "prepare 1", now_ms(), callbacks)?;
//!
//! let (_tx, rx) = tokio::sync::mpsc::channel::<Promise>(64);
//! let request = drive(request, rx, Duration::from_millis(100)).await;
//! println!("completed: {}", request.is_completed());
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod driver;
pub mod error;
pub mod fragment;
pub mod handler;
pub mod request;
pub mod types;

#[cfg(test)]
mod testing;

pub use codec::{Codec, MsgPackCodec};
pub use config::ProtocolConfig;
pub use driver::{drive, drive_with_clock};
pub use error::PaxosProtocolError;
pub use fragment::{
    BroadcastGroup, CommLayerGroup, Fragment, FragmentJoiner, FragmentingComm, FragmentingGroup,
    GroupFrame, Receiver, MAX_FRAME_OVERHEAD,
};
pub use handler::{Callbacks, RequestHandler};
pub use request::QuorumRequest;
pub use types::{
    now_ms, GroupMembership, Inbound, Member, MessageWithSender, Tick, DEFAULT_FRAGMENT_SIZE,
    RETRY_INTERVAL_MS,
};
