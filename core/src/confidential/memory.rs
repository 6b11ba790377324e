use hashbrown::HashMap;
use rand::prelude::*;

use super::*;

/// In-process stand-in for the confidential-computation primitive.
///
/// Keeps plaintexts in memory behind random handles and enforces the same ACL
/// rules a real backend would. Provides no confidentiality against the host.
#[derive(Clone, Debug)]
pub struct MockBackend {
    rng: SmallRng,
    entries: HashMap<ValueHandle, MockEntry>,
}

#[derive(Copy, Clone, Debug)]
struct MockEntry {
    plain: u32,
    grant: Grant,
}

impl MockBackend {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn fresh_handle(&mut self) -> ValueHandle {
        loop {
            let mut bytes = [0u8; 32];
            for chunk in bytes.chunks_exact_mut(8) {
                chunk.copy_from_slice(&self.rng.random::<u64>().to_le_bytes());
            }
            let handle = ValueHandle(bytes);
            if !self.entries.contains_key(&handle) {
                return handle;
            }
        }
    }

    fn insert(&mut self, plain: u32, owner: Identity) -> ValueHandle {
        let handle = self.fresh_handle();
        self.entries.insert(
            handle,
            MockEntry {
                plain,
                grant: Grant::OwnerOnly(owner),
            },
        );
        handle
    }
}

impl ConfidentialBackend for MockBackend {
    fn encrypt(
        &mut self,
        plain: u32,
        owner: Identity,
    ) -> core::result::Result<ValueHandle, BackendError> {
        Ok(self.insert(plain, owner))
    }

    fn allow_public(&mut self, handle: ValueHandle) -> core::result::Result<(), BackendError> {
        let entry = self
            .entries
            .get_mut(&handle)
            .ok_or(BackendError::UnknownHandle)?;
        entry.grant = entry.grant.widened();
        Ok(())
    }

    fn decrypt(
        &self,
        authorization: &DecryptAuthorization,
    ) -> core::result::Result<u32, BackendError> {
        let entry = self
            .entries
            .get(&authorization.handle)
            .ok_or(BackendError::UnknownHandle)?;
        if entry.grant.permits(authorization.requester) {
            Ok(entry.plain)
        } else {
            Err(BackendError::Denied)
        }
    }

    fn equals(
        &mut self,
        a: ValueHandle,
        b: ValueHandle,
        owner: Identity,
    ) -> core::result::Result<ValueHandle, BackendError> {
        let a = self.entries.get(&a).ok_or(BackendError::UnknownHandle)?.plain;
        let b = self.entries.get(&b).ok_or(BackendError::UnknownHandle)?.plain;
        Ok(self.insert(u32::from(a == b), owner))
    }
}
