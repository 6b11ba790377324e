use alloc::vec::Vec;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicRosterEntry {
    pub identity: Identity,
    pub handle: ValueHandle,
}

/// Append-only list of disclosed participants, in disclosure order.
#[derive(Clone, Debug, Default)]
pub struct PublicRoster {
    entries: Vec<PublicRosterEntry>,
    members: HashSet<Identity>,
}

impl PublicRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` without touching the roster if `identity` is listed already.
    pub fn append(&mut self, identity: Identity, handle: ValueHandle) -> bool {
        if !self.members.insert(identity) {
            return false;
        }
        self.entries.push(PublicRosterEntry { identity, handle });
        true
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.members.contains(identity)
    }

    pub fn entries(&self) -> &[PublicRosterEntry] {
        &self.entries
    }

    pub fn identities(&self) -> impl Iterator<Item = Identity> + '_ {
        self.entries.iter().map(|entry| entry.identity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
