//! Adapter over the external confidential-computation primitive.
//!
//! The engine never sees ciphertexts. It holds [`ValueHandle`]s and the grant
//! state for each, and forwards encryption, ACL changes and decryption
//! requests to a [`ConfidentialBackend`].

use core::fmt;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::*;

pub use memory::*;

mod memory;

/// Opaque reference to an encrypted integer held by the backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValueHandle(pub [u8; 32]);

impl fmt::Display for ValueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Who may decrypt a value.
///
/// The only transition is [`Grant::widened`], from `OwnerOnly` to `Public`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grant {
    OwnerOnly(Identity),
    Public,
}

impl Grant {
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }

    pub const fn widened(self) -> Self {
        Self::Public
    }

    pub fn permits(self, requester: Requester) -> bool {
        match (self, requester) {
            (Self::Public, _) => true,
            (Self::OwnerOnly(owner), Requester::Identity(identity)) => owner == identity,
            (Self::OwnerOnly(_), Requester::Anyone) => false,
        }
    }
}

/// Party asking for a plaintext.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Requester {
    Identity(Identity),
    /// Unauthenticated public decryption.
    Anyone,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidentialValue {
    pub handle: ValueHandle,
    pub grant: Grant,
}

/// Authorization artifact exchanged with the backend for a plaintext.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptAuthorization {
    pub handle: ValueHandle,
    pub requester: Requester,
}

impl DecryptAuthorization {
    pub const fn new(handle: ValueHandle, requester: Requester) -> Self {
        Self { handle, requester }
    }
}

/// Boundary to the confidential-computation primitive.
pub trait ConfidentialBackend {
    /// Encrypts `plain` and grants decryption to `owner` only.
    fn encrypt(
        &mut self,
        plain: u32,
        owner: Identity,
    ) -> core::result::Result<ValueHandle, BackendError>;

    /// Makes `handle` decryptable by anyone. Must be idempotent.
    fn allow_public(&mut self, handle: ValueHandle) -> core::result::Result<(), BackendError>;

    fn decrypt(
        &self,
        authorization: &DecryptAuthorization,
    ) -> core::result::Result<u32, BackendError>;

    /// Encrypted `a == b`, as `0` or `1`, decryptable by `owner` only.
    fn equals(
        &mut self,
        a: ValueHandle,
        b: ValueHandle,
        owner: Identity,
    ) -> core::result::Result<ValueHandle, BackendError>;
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GrantOutcome {
    Widened,
    AlreadyPublic,
}

impl GrantOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::Widened => true,
            Self::AlreadyPublic => false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ConfidentialValueStore<B> {
    backend: B,
    grants: HashMap<ValueHandle, Grant>,
}

impl<B: ConfidentialBackend> ConfidentialValueStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            grants: HashMap::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn wrap(&mut self, plain: u32, owner: Identity) -> Result<ConfidentialValue> {
        let handle = self.backend.encrypt(plain, owner)?;
        if self.grants.contains_key(&handle) {
            log::error!("Backend reused handle {handle}");
            return Err(TileError::Backend(BackendError::HandleReused));
        }
        let grant = Grant::OwnerOnly(owner);
        self.grants.insert(handle, grant);
        Ok(ConfidentialValue { handle, grant })
    }

    pub fn value(&self, handle: ValueHandle) -> Result<ConfidentialValue> {
        let grant = *self.grants.get(&handle).ok_or(TileError::UnknownHandle)?;
        Ok(ConfidentialValue { handle, grant })
    }

    pub fn grant_public(&mut self, handle: ValueHandle) -> Result<GrantOutcome> {
        let grant = *self.grants.get(&handle).ok_or(TileError::UnknownHandle)?;
        if grant.is_public() {
            return Ok(GrantOutcome::AlreadyPublic);
        }
        self.backend.allow_public(handle)?;
        self.grants.insert(handle, grant.widened());
        Ok(GrantOutcome::Widened)
    }

    pub fn decrypt(&self, handle: ValueHandle, requester: Requester) -> Result<u32> {
        let value = self.value(handle)?;
        if !value.grant.permits(requester) {
            return Err(TileError::NotAuthorized);
        }
        self.backend
            .decrypt(&DecryptAuthorization::new(handle, requester))
            .map_err(|err| match err {
                BackendError::Denied => TileError::NotAuthorized,
                other => TileError::Backend(other),
            })
    }

    /// Encrypted comparison; `requester` must be able to decrypt both inputs.
    pub fn equals(
        &mut self,
        a: ValueHandle,
        b: ValueHandle,
        requester: Identity,
    ) -> Result<ConfidentialValue> {
        let who = Requester::Identity(requester);
        if !self.value(a)?.grant.permits(who) || !self.value(b)?.grant.permits(who) {
            return Err(TileError::NotAuthorized);
        }
        let handle = self.backend.equals(a, b, requester)?;
        let grant = Grant::OwnerOnly(requester);
        self.grants.insert(handle, grant);
        Ok(ConfidentialValue { handle, grant })
    }

    pub fn decrypt_bool(&self, handle: ValueHandle, requester: Requester) -> Result<bool> {
        Ok(self.decrypt(handle, requester)? != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: Identity = Identity([0xa1; 20]);
    const BOB: Identity = Identity([0xb0; 20]);

    fn store() -> ConfidentialValueStore<MockBackend> {
        ConfidentialValueStore::new(MockBackend::new(7))
    }

    #[test]
    fn wrapped_value_is_owner_only() {
        let mut store = store();
        let value = store.wrap(42, ALICE).unwrap();

        assert_eq!(value.grant, Grant::OwnerOnly(ALICE));
        assert_eq!(store.decrypt(value.handle, Requester::Identity(ALICE)), Ok(42));
        assert_eq!(
            store.decrypt(value.handle, Requester::Identity(BOB)),
            Err(TileError::NotAuthorized)
        );
        assert_eq!(
            store.decrypt(value.handle, Requester::Anyone),
            Err(TileError::NotAuthorized)
        );
    }

    #[test]
    fn grant_public_is_one_way_and_idempotent() {
        let mut store = store();
        let value = store.wrap(9, ALICE).unwrap();

        assert_eq!(store.grant_public(value.handle), Ok(GrantOutcome::Widened));
        assert_eq!(store.grant_public(value.handle), Ok(GrantOutcome::AlreadyPublic));
        assert_eq!(store.value(value.handle).unwrap().grant, Grant::Public);
        assert_eq!(store.decrypt(value.handle, Requester::Anyone), Ok(9));
        assert_eq!(store.decrypt(value.handle, Requester::Identity(BOB)), Ok(9));
    }

    #[test]
    fn unknown_handle_is_reported() {
        let mut store = store();
        let handle = ValueHandle([0; 32]);

        assert_eq!(store.grant_public(handle), Err(TileError::UnknownHandle));
        assert_eq!(
            store.decrypt(handle, Requester::Anyone),
            Err(TileError::UnknownHandle)
        );
    }

    #[test]
    fn equals_compares_without_revealing_inputs() {
        let mut store = store();
        let a = store.wrap(5, ALICE).unwrap();
        let b = store.wrap(5, ALICE).unwrap();
        let c = store.wrap(6, ALICE).unwrap();

        let same = store.equals(a.handle, b.handle, ALICE).unwrap();
        let different = store.equals(a.handle, c.handle, ALICE).unwrap();

        assert_eq!(store.decrypt_bool(same.handle, Requester::Identity(ALICE)), Ok(true));
        assert_eq!(
            store.decrypt_bool(different.handle, Requester::Identity(ALICE)),
            Ok(false)
        );
        assert_eq!(
            store.decrypt_bool(same.handle, Requester::Identity(BOB)),
            Err(TileError::NotAuthorized)
        );
    }

    #[test]
    fn equals_requires_access_to_both_inputs() {
        let mut store = store();
        let a = store.wrap(1, ALICE).unwrap();
        let b = store.wrap(1, BOB).unwrap();

        assert_eq!(
            store.equals(a.handle, b.handle, ALICE),
            Err(TileError::NotAuthorized)
        );
    }

    /// Hands out the same handle every time.
    #[derive(Clone, Debug)]
    struct StuckBackend;

    impl ConfidentialBackend for StuckBackend {
        fn encrypt(
            &mut self,
            _plain: u32,
            _owner: Identity,
        ) -> core::result::Result<ValueHandle, BackendError> {
            Ok(ValueHandle([4; 32]))
        }

        fn allow_public(&mut self, _handle: ValueHandle) -> core::result::Result<(), BackendError> {
            Ok(())
        }

        fn decrypt(
            &self,
            _authorization: &DecryptAuthorization,
        ) -> core::result::Result<u32, BackendError> {
            Err(BackendError::Denied)
        }

        fn equals(
            &mut self,
            _a: ValueHandle,
            _b: ValueHandle,
            _owner: Identity,
        ) -> core::result::Result<ValueHandle, BackendError> {
            Err(BackendError::Unavailable)
        }
    }

    #[test]
    fn reused_handle_is_fatal() {
        let mut store = ConfidentialValueStore::new(StuckBackend);
        let first = store.wrap(1, ALICE).unwrap();

        let err = store.wrap(2, BOB).unwrap_err();

        assert_eq!(err, TileError::Backend(BackendError::HandleReused));
        assert!(err.is_fatal());
        assert_eq!(store.value(first.handle).unwrap().grant, Grant::OwnerOnly(ALICE));
    }
}
