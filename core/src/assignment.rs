use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub identity: Identity,
    pub value: ConfidentialValue,
    pub joined: bool,
    pub public: bool,
}

impl ParticipantRecord {
    pub const fn handle(&self) -> ValueHandle {
        self.value.handle
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum JoinOutcome {
    Assigned(ParticipantRecord),
    /// Identity had joined before; its record is returned untouched.
    AlreadyJoined(ParticipantRecord),
}

impl JoinOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::Assigned(_) => true,
            Self::AlreadyJoined(_) => false,
        }
    }

    pub const fn record(&self) -> &ParticipantRecord {
        match self {
            Self::Assigned(record) | Self::AlreadyJoined(record) => record,
        }
    }
}

/// Hands out free cells and owns every [`ParticipantRecord`].
#[derive(Clone, Debug)]
pub struct AssignmentEngine {
    occupancy: OccupancyTracker,
    participants: HashMap<Identity, ParticipantRecord>,
}

impl AssignmentEngine {
    pub fn new(grid: GridConfig) -> Self {
        Self {
            occupancy: OccupancyTracker::new(grid),
            participants: HashMap::new(),
        }
    }

    pub fn occupancy(&self) -> &OccupancyTracker {
        &self.occupancy
    }

    pub fn record(&self, identity: &Identity) -> Option<&ParticipantRecord> {
        self.participants.get(identity)
    }

    pub fn has_joined(&self, identity: &Identity) -> bool {
        self.participants
            .get(identity)
            .is_some_and(|record| record.joined)
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn join<B: ConfidentialBackend>(
        &mut self,
        identity: Identity,
        seed: u64,
        store: &mut ConfidentialValueStore<B>,
    ) -> Result<JoinOutcome> {
        if let Some(record) = self.participants.get(&identity) {
            log::warn!("{identity} joined already, keeping existing assignment");
            return Ok(JoinOutcome::AlreadyJoined(*record));
        }
        if self.occupancy.is_full() {
            return Err(TileError::GridFull);
        }

        let cell = self.select_cell(seed)?;
        // re-check right before committing
        if self.occupancy.is_occupied(cell)? {
            log::error!("Selected cell was taken before commit");
            return Err(TileError::AlreadyOccupied);
        }
        // backend goes last, nothing below may fail once it has encrypted
        let value = store.wrap(cell.into(), identity)?;
        self.occupancy.occupy(cell)?;

        let record = ParticipantRecord {
            identity,
            value,
            joined: true,
            public: false,
        };
        self.participants.insert(identity, record);
        log::debug!(
            "{identity} joined with handle {}, {} cells remaining",
            value.handle,
            self.occupancy.capacity_remaining()
        );
        Ok(JoinOutcome::Assigned(record))
    }

    /// Random start from `seed`, then linear probing to the next free cell.
    fn select_cell(&self, seed: u64) -> Result<CellIndex> {
        let total_cells = self.occupancy.grid().total_cells();
        let mut candidate = start_cell(seed, total_cells);
        for _ in 0..total_cells {
            if !self.occupancy.is_occupied(candidate)? {
                return Ok(candidate);
            }
            candidate = candidate.next_wrapping(total_cells);
        }
        Err(TileError::GridFull)
    }

    pub fn decrypt_own<B: ConfidentialBackend>(
        &self,
        identity: Identity,
        store: &ConfidentialValueStore<B>,
    ) -> Result<CellIndex> {
        let record = self.participants.get(&identity).ok_or(TileError::NotJoined)?;
        self.decrypt_as(identity, record.handle(), store)
    }

    /// Decrypts `handle` on behalf of `requester`, subject to its grant.
    pub fn decrypt_as<B: ConfidentialBackend>(
        &self,
        requester: Identity,
        handle: ValueHandle,
        store: &ConfidentialValueStore<B>,
    ) -> Result<CellIndex> {
        let plain = store.decrypt(handle, Requester::Identity(requester))?;
        self.to_cell(plain)
    }

    pub(crate) fn to_cell(&self, plain: u32) -> Result<CellIndex> {
        let index = CellCount::try_from(plain).map_err(|_| TileError::OutOfRange)?;
        self.occupancy.grid().cell(index)
    }

    pub(crate) fn mark_public(&mut self, identity: &Identity) -> Result<ParticipantRecord> {
        let record = self
            .participants
            .get_mut(identity)
            .ok_or(TileError::NotJoined)?;
        record.public = true;
        record.value.grant = record.value.grant.widened();
        Ok(*record)
    }
}
