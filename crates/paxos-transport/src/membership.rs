/// Group membership snapshots.
use std::collections::HashSet;

use crate::{Member, PaxosTransportError};

/// Immutable snapshot of the participating members plus the local identity.
///
/// Order is stable for iteration but carries no protocol meaning.
/// Shared read-only (`Arc<GroupMembership>`) across concurrent requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMembership {
    members: Vec<Member>,
    local_index: usize,
}

impl GroupMembership {
    /// Build a membership snapshot.
    ///
    /// `local_index` is the position of this process in `members`.
    pub fn new(members: Vec<Member>, local_index: usize) -> Result<Self, PaxosTransportError> {
        if members.is_empty() {
            return Err(PaxosTransportError::InvalidMembership(
                "no members".into(),
            ));
        }
        if local_index >= members.len() {
            return Err(PaxosTransportError::InvalidMembership(format!(
                "local index {local_index} out of range for {} members",
                members.len()
            )));
        }

        let mut seen = HashSet::with_capacity(members.len());
        for member in &members {
            if !seen.insert(*member) {
                return Err(PaxosTransportError::InvalidMembership(format!(
                    "duplicate member {member}"
                )));
            }
        }

        Ok(Self {
            members,
            local_index,
        })
    }

    /// All members, in stable order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false for a constructed snapshot.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// This process's identity.
    pub fn local_member(&self) -> Member {
        self.members[self.local_index]
    }

    pub fn local_index(&self) -> usize {
        self.local_index
    }

    /// Majority size: ⌊n/2⌋ + 1.
    pub fn quorum_size(&self) -> usize {
        self.members.len() / 2 + 1
    }

    pub fn contains(&self, member: &Member) -> bool {
        self.members.contains(member)
    }

    /// Position of `member` in the snapshot.
    pub fn position(&self, member: &Member) -> Option<usize> {
        self.members.iter().position(|m| m == member)
    }
}
