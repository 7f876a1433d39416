use serde::{Deserialize, Serialize};

pub use paxos_transport::{GroupMembership, Member};

/// Resend period for requests still waiting on members (1 second).
pub const RETRY_INTERVAL_MS: u64 = 1_000;

/// Largest serialized message broadcast without fragmentation.
pub const DEFAULT_FRAGMENT_SIZE: usize = 64_000;

/// A timing event carrying the caller's clock, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tick {
    pub time: u64,
}

impl Tick {
    pub fn new(time: u64) -> Self {
        Self { time }
    }
}

/// Everything a request's dispatch entry point accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound<M> {
    /// Drive the retransmission schedule.
    Tick(Tick),
    /// An application message, possibly a response.
    Message(M),
}

impl<M> From<Tick> for Inbound<M> {
    fn from(tick: Tick) -> Self {
        Inbound::Tick(tick)
    }
}

/// A message that knows which member sent it.
pub trait MessageWithSender {
    fn sender(&self) -> Member;
}

/// Current wall-clock time in Unix milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
