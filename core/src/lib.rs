#![no_std]

//! Encrypted tile assignment and disclosure.
//!
//! Participants join a fixed grid and each receive one cell, stored as a
//! confidential value only they can decrypt until they choose to make it
//! public. Occupancy is tracked in plaintext; ownership never is.

extern crate alloc;

pub use assignment::*;
pub use confidential::*;
pub use config::*;
pub use disclosure::*;
pub use engine::*;
pub use error::*;
pub use occupancy::*;
pub use roster::*;
pub use seed::*;
pub use types::*;

mod assignment;
mod confidential;
mod config;
mod disclosure;
mod engine;
mod error;
mod occupancy;
mod roster;
mod seed;
mod types;
