/// QuorumRequest: broadcast one request, gather responses until a
/// majority and then every member has replied.
///
/// Pure state plus fire-and-forget sends: no locking, no blocking. The
/// caller delivers `receive`/`tick` serially (one dispatch loop per
/// request). Members that stay silent get the serialized payload resent
/// once per retry period, anchored to the request's baseline time.
/// Payloads go to the transport as one serialized blob; wrap it in a
/// [`FragmentingComm`](crate::FragmentingComm) when they may exceed a
/// datagram.
use std::collections::HashSet;
use std::sync::Arc;

use paxos_transport::CommLayer;
use serde::Serialize;

use crate::codec::{Codec, MsgPackCodec};
use crate::config::ProtocolConfig;
use crate::error::PaxosProtocolError;
use crate::handler::RequestHandler;
use crate::types::{GroupMembership, Inbound, Member, MessageWithSender};

/// One outstanding request and its response bookkeeping.
pub struct QuorumRequest<Req, H, T> {
    membership: Arc<GroupMembership>,
    transport: T,
    handler: H,
    payload: Req,
    /// Serialized once at construction; every send reuses these bytes.
    payload_bytes: Vec<u8>,
    baseline: u64,
    retry_interval_ms: u64,
    pending: HashSet<Member>,
    responded: HashSet<Member>,
    quorum_reached: bool,
    completed: bool,
    finished: bool,
    last_period: u64,
}

impl<Req, H, T> QuorumRequest<Req, H, T>
where
    Req: Serialize,
    T: CommLayer,
{
    /// Serialize `payload` and broadcast it to every member.
    ///
    /// `baseline` anchors the retry schedule (same clock as later ticks).
    pub fn new(
        membership: Arc<GroupMembership>,
        transport: T,
        payload: Req,
        baseline: u64,
        handler: H,
    ) -> Result<Self, PaxosProtocolError> {
        Self::with_config(
            membership,
            transport,
            payload,
            baseline,
            handler,
            &ProtocolConfig::default(),
        )
    }

    /// Like [`new`](Self::new) with an explicit retry interval.
    pub fn with_config(
        membership: Arc<GroupMembership>,
        transport: T,
        payload: Req,
        baseline: u64,
        handler: H,
        config: &ProtocolConfig,
    ) -> Result<Self, PaxosProtocolError> {
        let payload_bytes = MsgPackCodec.serialize(&payload)?;

        if let Err(e) = transport.send_to_all(membership.members(), &payload_bytes) {
            tracing::debug!("initial broadcast incomplete: {e}");
        }

        let pending = membership.members().iter().copied().collect();

        Ok(Self {
            membership,
            transport,
            handler,
            payload,
            payload_bytes,
            baseline,
            retry_interval_ms: config.retry_interval_ms(),
            pending,
            responded: HashSet::new(),
            quorum_reached: false,
            completed: false,
            finished: false,
            last_period: 0,
        })
    }
}

impl<Req, H, T> QuorumRequest<Req, H, T>
where
    T: CommLayer,
{
    /// Dispatch entry point: a tick drives resends, anything else is
    /// offered to the handler's response filter.
    pub fn receive<M>(&mut self, inbound: Inbound<M>)
    where
        H: RequestHandler<M>,
    {
        match inbound {
            Inbound::Tick(tick) => self.tick(tick.time),
            Inbound::Message(message) => {
                if self.finished {
                    return;
                }
                let Some(response) = self.handler.filter_response(message) else {
                    return;
                };
                self.accept_response::<M>(response.sender());
            }
        }
    }

    /// Resend the payload to every pending member, at most once per call,
    /// when `now` has entered a later retry period than the last resend.
    pub fn tick(&mut self, now: u64) {
        if self.finished || self.pending.is_empty() {
            return;
        }

        let period = now.saturating_sub(self.baseline) / self.retry_interval_ms;
        if period <= self.last_period {
            return;
        }
        self.last_period = period;

        tracing::trace!(
            "retry period {period}: resending to {} pending members",
            self.pending.len()
        );

        for member in self.membership.members() {
            if !self.pending.contains(member) {
                continue;
            }
            if let Err(e) = self.transport.send_to(member, &self.payload_bytes) {
                tracing::debug!("resend to {member} failed: {e}");
            }
        }
    }

    /// Stop tracking. Idempotent; suppresses every later side effect.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    // ── Internal ───────────────────────────────────────────────────────

    fn accept_response<M>(&mut self, sender: Member)
    where
        H: RequestHandler<M>,
    {
        if !self.pending.remove(&sender) {
            tracing::debug!("ignoring response from {sender}: not pending");
            return;
        }
        self.responded.insert(sender);

        if !self.quorum_reached && self.responded.len() >= self.membership.quorum_size() {
            self.quorum_reached = true;
            tracing::trace!("quorum reached with {} responses", self.responded.len());
            self.handler.on_quorum_reached();
        }

        if !self.completed && self.pending.is_empty() {
            self.completed = true;
            tracing::trace!("all {} members responded", self.responded.len());
            self.handler.on_completed();
        }
    }
}

impl<Req, H, T> QuorumRequest<Req, H, T> {
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_quorum_reached(&self) -> bool {
        self.quorum_reached
    }

    /// True once every member has responded.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Members still owing a response, in membership order.
    pub fn pending_members(&self) -> Vec<Member> {
        self.in_membership_order(&self.pending)
    }

    /// Members whose response was accepted, in membership order.
    pub fn responded_members(&self) -> Vec<Member> {
        self.in_membership_order(&self.responded)
    }

    pub fn membership(&self) -> &GroupMembership {
        &self.membership
    }

    pub fn payload(&self) -> &Req {
        &self.payload
    }

    /// The bytes sent on broadcast and on every resend.
    pub fn serialized_payload(&self) -> &[u8] {
        &self.payload_bytes
    }

    pub fn baseline(&self) -> u64 {
        self.baseline
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    fn in_membership_order(&self, set: &HashSet<Member>) -> Vec<Member> {
        self.membership
            .members()
            .iter()
            .filter(|m| set.contains(m))
            .copied()
            .collect()
    }
}
