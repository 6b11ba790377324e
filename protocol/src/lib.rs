//! Participant-facing operations of the tile engine as JSON messages.
//!
//! Hosts authenticate the caller, wrap the request in an [`Envelope`] and
//! hand it to [`serve`] inside their transaction. The [`Response`] separates
//! idempotent no-ops, the expected grid-full end state and real failures.

pub use error::*;
pub use message::*;
pub use serve::*;

mod error;
mod message;
mod serve;
