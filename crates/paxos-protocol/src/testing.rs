//! Shared test doubles.

use std::sync::{Arc, Mutex};

use paxos_transport::{CommLayer, PaxosTransportError};

use crate::error::PaxosProtocolError;
use crate::fragment::{BroadcastGroup, GroupFrame};
use crate::handler::RequestHandler;
use crate::types::{Member, MessageWithSender};

pub fn members(n: u16) -> Vec<Member> {
    (0..n)
        .map(|i| format!("127.0.0.1:{}", 2440 + i).parse().unwrap())
        .collect()
}

/// Fake comm layer that records every send for verification.
#[derive(Clone, Default)]
pub struct MockComm {
    sent: Arc<Mutex<Vec<(Member, Vec<u8>)>>>,
    fail_sends: Arc<Mutex<bool>>,
}

impl MockComm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(Member, Vec<u8>)> {
        self.sent.lock().unwrap().clone()
    }

    /// Recipients only, in send order.
    pub fn sent_to(&self) -> Vec<Member> {
        self.sent.lock().unwrap().iter().map(|(m, _)| *m).collect()
    }

    pub fn set_fail_sends(&self, fail: bool) {
        *self.fail_sends.lock().unwrap() = fail;
    }

    pub fn clear_sent(&self) {
        self.sent.lock().unwrap().clear();
    }
}

impl CommLayer for MockComm {
    fn send_to(&self, member: &Member, data: &[u8]) -> Result<(), PaxosTransportError> {
        if *self.fail_sends.lock().unwrap() {
            return Err(PaxosTransportError::Send {
                member: *member,
                source: std::io::Error::new(std::io::ErrorKind::WouldBlock, "mock: send failed"),
            });
        }
        self.sent.lock().unwrap().push((*member, data.to_vec()));
        Ok(())
    }
}

/// Fake broadcast group that records frames.
#[derive(Clone, Default)]
pub struct MockGroup {
    frames: Arc<Mutex<Vec<GroupFrame>>>,
}

impl MockGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<GroupFrame> {
        self.frames.lock().unwrap().clone()
    }
}

impl BroadcastGroup for MockGroup {
    fn broadcast(&self, frame: GroupFrame) -> Result<(), PaxosProtocolError> {
        self.frames.lock().unwrap().push(frame);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Promise {
    pub from: Member,
    pub ballot: u64,
}

impl MessageWithSender for Promise {
    fn sender(&self) -> Member {
        self.from
    }
}

/// Handler that rejects ballot 0 and records callbacks.
#[derive(Debug, Default)]
pub struct PromiseCounter {
    pub filtered: usize,
    pub quorum_calls: usize,
    pub completed_calls: usize,
    pub events: Vec<&'static str>,
}

impl RequestHandler<Promise> for PromiseCounter {
    type Response = Promise;

    fn filter_response(&mut self, message: Promise) -> Option<Promise> {
        self.filtered += 1;
        (message.ballot > 0).then_some(message)
    }

    fn on_quorum_reached(&mut self) {
        self.quorum_calls += 1;
        self.events.push("quorum");
    }

    fn on_completed(&mut self) {
        self.completed_calls += 1;
        self.events.push("completed");
    }
}
