use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Notification released to observers once a transition commits.
///
/// Never carries a plaintext cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    Joined { identity: Identity, handle: ValueHandle },
    Disclosed { identity: Identity, handle: ValueHandle },
}

/// Public summary of the grid, safe to show to anyone.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridStatus {
    pub total_cells: CellCount,
    pub occupied: CellCount,
    pub remaining: CellCount,
    pub participants: usize,
    pub disclosed: usize,
}

/// Encrypted tile assignment and disclosure engine.
///
/// Mutating operations finish every fallible engine check before they call
/// the confidential backend, so a failed call leaves neither the engine nor
/// the backend changed. Events are held back until the call succeeds.
#[derive(Clone, Debug)]
pub struct TileEngine<B = MockBackend, S = RngSeedSource> {
    grid: GridConfig,
    store: ConfidentialValueStore<B>,
    assignments: AssignmentEngine,
    disclosure: DisclosureController,
    seeds: S,
    pending_events: Vec<EngineEvent>,
    committed_events: Vec<EngineEvent>,
}

impl TileEngine {
    /// In-memory engine backed by [`MockBackend`].
    pub fn in_memory(config: EngineConfig, root_seed: u64) -> Self {
        Self::new(
            config.grid,
            MockBackend::new(config.backend_seed),
            RngSeedSource::new(root_seed),
        )
    }
}

impl<B, S> TileEngine<B, S>
where
    B: ConfidentialBackend,
    S: SeedSource,
{
    pub fn new(grid: GridConfig, backend: B, seeds: S) -> Self {
        Self {
            grid,
            store: ConfidentialValueStore::new(backend),
            assignments: AssignmentEngine::new(grid),
            disclosure: DisclosureController::new(),
            seeds,
            pending_events: Vec::new(),
            committed_events: Vec::new(),
        }
    }

    pub fn grid(&self) -> GridConfig {
        self.grid
    }

    pub fn total_cells(&self) -> CellCount {
        self.grid.total_cells()
    }

    pub fn store(&self) -> &ConfidentialValueStore<B> {
        &self.store
    }

    pub fn occupancy(&self) -> &OccupancyTracker {
        self.assignments.occupancy()
    }

    /// Runs a single operation and releases its events only if it succeeds.
    ///
    /// `op` must not touch the backend before its last fallible engine check.
    fn transact<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let result = op(self);
        match &result {
            Ok(_) => self.committed_events.append(&mut self.pending_events),
            Err(err) => {
                if err.is_fatal() {
                    log::error!("Aborting transition: {err}");
                }
                self.pending_events.clear();
            }
        }
        result
    }

    pub fn join(&mut self, identity: Identity) -> Result<JoinOutcome> {
        self.transact(|engine| {
            let seed = engine.seeds.next_seed();
            let outcome = engine.assignments.join(identity, seed, &mut engine.store)?;
            if let JoinOutcome::Assigned(record) = outcome {
                engine.pending_events.push(EngineEvent::Joined {
                    identity,
                    handle: record.handle(),
                });
            }
            Ok(outcome)
        })
    }

    pub fn make_public(&mut self, identity: Identity) -> Result<DisclosureOutcome> {
        self.transact(|engine| {
            let outcome = engine.disclosure.make_public(
                identity,
                &mut engine.assignments,
                &mut engine.store,
            )?;
            if let DisclosureOutcome::Disclosed(entry) = outcome {
                engine.pending_events.push(EngineEvent::Disclosed {
                    identity: entry.identity,
                    handle: entry.handle,
                });
            }
            Ok(outcome)
        })
    }

    pub fn get_own_confidential_handle(&self, identity: &Identity) -> Result<ValueHandle> {
        self.assignments
            .record(identity)
            .map(ParticipantRecord::handle)
            .ok_or(TileError::NotJoined)
    }

    pub fn record(&self, identity: &Identity) -> Option<&ParticipantRecord> {
        self.assignments.record(identity)
    }

    pub fn has_joined(&self, identity: &Identity) -> bool {
        self.assignments.has_joined(identity)
    }

    pub fn is_public(&self, identity: &Identity) -> bool {
        self.disclosure.is_public(identity)
    }

    pub fn decrypt_own(&self, identity: Identity) -> Result<CellIndex> {
        self.assignments.decrypt_own(identity, &self.store)
    }

    /// Decrypts `handle` for `requester`; fails unless the grant covers them.
    pub fn decrypt_as(&self, requester: Identity, handle: ValueHandle) -> Result<CellIndex> {
        self.assignments.decrypt_as(requester, handle, &self.store)
    }

    pub fn decrypt_public(&self, handle: ValueHandle) -> Result<CellIndex> {
        self.disclosure
            .decrypt_public(handle, &self.assignments, &self.store)
    }

    pub fn is_occupied(&self, cell: CellIndex) -> Result<bool> {
        self.assignments.occupancy().is_occupied(cell)
    }

    pub fn list_public(&self) -> Vec<PublicRosterEntry> {
        self.disclosure.list_public()
    }

    pub fn public_players(&self) -> Vec<Identity> {
        self.disclosure.roster().identities().collect()
    }

    pub fn status(&self) -> GridStatus {
        let occupancy = self.assignments.occupancy();
        GridStatus {
            total_cells: self.grid.total_cells(),
            occupied: occupancy.occupied_count(),
            remaining: occupancy.capacity_remaining(),
            participants: self.assignments.participant_count(),
            disclosed: self.disclosure.roster().len(),
        }
    }

    /// Drains events from committed transitions.
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        core::mem::take(&mut self.committed_events)
    }
}
