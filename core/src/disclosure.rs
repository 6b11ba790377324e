use alloc::vec::Vec;

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DisclosureOutcome {
    Disclosed(PublicRosterEntry),
    /// Value was public already; nothing changed.
    AlreadyPublic(PublicRosterEntry),
}

impl DisclosureOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::Disclosed(_) => true,
            Self::AlreadyPublic(_) => false,
        }
    }

    pub const fn entry(&self) -> &PublicRosterEntry {
        match self {
            Self::Disclosed(entry) | Self::AlreadyPublic(entry) => entry,
        }
    }
}

/// Owns the one-way `public` transition and the [`PublicRoster`].
#[derive(Clone, Debug, Default)]
pub struct DisclosureController {
    roster: PublicRoster,
}

impl DisclosureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roster(&self) -> &PublicRoster {
        &self.roster
    }

    pub fn is_public(&self, identity: &Identity) -> bool {
        self.roster.contains(identity)
    }

    pub fn make_public<B: ConfidentialBackend>(
        &mut self,
        identity: Identity,
        assignments: &mut AssignmentEngine,
        store: &mut ConfidentialValueStore<B>,
    ) -> Result<DisclosureOutcome> {
        let record = *assignments
            .record(&identity)
            .filter(|record| record.joined)
            .ok_or(TileError::NotJoined)?;
        let entry = PublicRosterEntry {
            identity,
            handle: record.handle(),
        };
        if record.public {
            log::warn!("{identity} is public already");
            return Ok(DisclosureOutcome::AlreadyPublic(entry));
        }

        // only backend call, everything after it is infallible
        match store.grant_public(entry.handle)? {
            GrantOutcome::Widened => {}
            GrantOutcome::AlreadyPublic => {
                log::warn!("Handle {} was widened before its record was marked", entry.handle);
            }
        }
        assignments.mark_public(&identity)?;
        self.roster.append(identity, entry.handle);
        log::info!("{identity} disclosed handle {}", entry.handle);
        Ok(DisclosureOutcome::Disclosed(entry))
    }

    pub fn list_public(&self) -> Vec<PublicRosterEntry> {
        self.roster.entries().to_vec()
    }

    pub fn decrypt_public<B: ConfidentialBackend>(
        &self,
        handle: ValueHandle,
        assignments: &AssignmentEngine,
        store: &ConfidentialValueStore<B>,
    ) -> Result<CellIndex> {
        let plain = store.decrypt(handle, Requester::Anyone)?;
        assignments.to_cell(plain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Identity = Identity([0xa1; 20]);
    const BOB: Identity = Identity([0xb0; 20]);

    struct Fixture {
        assignments: AssignmentEngine,
        disclosure: DisclosureController,
        store: ConfidentialValueStore<MockBackend>,
    }

    fn fixture() -> Fixture {
        let mut fixture = Fixture {
            assignments: AssignmentEngine::new(GridConfig::new(4, 4).unwrap()),
            disclosure: DisclosureController::new(),
            store: ConfidentialValueStore::new(MockBackend::new(5)),
        };
        fixture.assignments.join(ALICE, 10, &mut fixture.store).unwrap();
        fixture.assignments.join(BOB, 20, &mut fixture.store).unwrap();
        fixture
    }

    impl Fixture {
        fn make_public(&mut self, identity: Identity) -> Result<DisclosureOutcome> {
            self.disclosure
                .make_public(identity, &mut self.assignments, &mut self.store)
        }
    }

    #[test]
    fn private_values_are_not_publicly_decryptable() {
        let fx = fixture();
        let handle = fx.assignments.record(&ALICE).unwrap().handle();

        assert_eq!(
            fx.disclosure.decrypt_public(handle, &fx.assignments, &fx.store),
            Err(TileError::NotAuthorized)
        );
        assert!(fx.disclosure.list_public().is_empty());
    }

    #[test]
    fn disclosure_round_trips_with_private_decrypt() {
        let mut fx = fixture();
        let private = fx.assignments.decrypt_own(ALICE, &fx.store).unwrap();

        let outcome = fx.make_public(ALICE).unwrap();
        let public = fx
            .disclosure
            .decrypt_public(outcome.entry().handle, &fx.assignments, &fx.store)
            .unwrap();

        assert!(outcome.has_update());
        assert_eq!(public, private);
        assert_eq!(
            fx.assignments.decrypt_as(BOB, outcome.entry().handle, &fx.store),
            Ok(private)
        );
        assert!(fx.assignments.record(&ALICE).unwrap().public);
        assert!(fx.disclosure.is_public(&ALICE));
    }

    #[test]
    fn repeated_disclosure_is_a_no_op() {
        let mut fx = fixture();

        let first = fx.make_public(ALICE).unwrap();
        let second = fx.make_public(ALICE).unwrap();

        assert_eq!(second, DisclosureOutcome::AlreadyPublic(*first.entry()));
        assert_eq!(fx.disclosure.list_public(), [*first.entry()]);
    }

    #[test]
    fn roster_follows_disclosure_order() {
        let mut fx = fixture();

        fx.make_public(BOB).unwrap();
        fx.make_public(ALICE).unwrap();

        let order: Vec<_> = fx.disclosure.roster().identities().collect();
        assert_eq!(order, [BOB, ALICE]);
    }

    #[test]
    fn unknown_identity_must_join_first() {
        let mut fx = fixture();
        assert_eq!(
            fx.make_public(Identity([0; 20])),
            Err(TileError::NotJoined)
        );
    }
}
