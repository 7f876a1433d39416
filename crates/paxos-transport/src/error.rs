use crate::Member;

/// Errors returned by the Paxos transport layer.
#[derive(Debug, thiserror::Error)]
pub enum PaxosTransportError {
    #[error("failed to bind socket: {0}")]
    Bind(#[source] std::io::Error),

    #[error("send to {member} failed: {source}")]
    Send {
        member: Member,
        #[source]
        source: std::io::Error,
    },

    #[error("receive failed: {0}")]
    Receive(#[source] std::io::Error),

    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("framing failed: {0}")]
    Framing(String),

    #[error("invalid member address: {0}")]
    InvalidMember(String),

    #[error("invalid membership: {0}")]
    InvalidMembership(String),
}
