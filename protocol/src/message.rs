use cipherlands_core::{
    CellCount, GridStatus, Identity, PublicRosterEntry, Severity, TileError, ValueHandle,
};
use serde::{Deserialize, Serialize};

/// Request paired with the caller identity the platform has already verified.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub caller: Identity,
    pub request: Request,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Join,
    MakePublic,
    GetOwnConfidentialHandle { identity: Identity },
    /// Caller asks for the plaintext behind `handle`.
    DecryptOwn { handle: ValueHandle },
    IsOccupied { cell: CellCount },
    ListPublic,
    DecryptPublic { handle: ValueHandle },
    HasJoined { identity: Identity },
    IsPublic { identity: Identity },
    Status,
}

impl Request {
    /// Whether serving this request may change engine state.
    pub const fn is_mutating(&self) -> bool {
        matches!(self, Self::Join | Self::MakePublic)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    Handle { handle: ValueHandle },
    Cell { cell: CellCount },
    Occupied { occupied: bool },
    Roster { entries: Vec<PublicRosterEntry> },
    Flag { value: bool },
    Status { status: GridStatus },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok { reply: Reply },
    /// Redundant call; `reply` is the current stable state.
    NoOp { reply: Reply },
    /// Every cell is taken. Not an error, the grid is complete.
    GridFull,
    Error { error: ErrorKind, fatal: bool, message: String },
}

impl Response {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Ok { .. } | Self::NoOp { .. })
    }

    pub fn reply(&self) -> Option<&Reply> {
        match self {
            Self::Ok { reply } | Self::NoOp { reply } => Some(reply),
            Self::GridFull | Self::Error { .. } => None,
        }
    }
}

impl From<TileError> for Response {
    fn from(err: TileError) -> Self {
        match err {
            TileError::GridFull => Self::GridFull,
            err => Self::Error {
                error: err.into(),
                fatal: err.severity() == Severity::Fatal,
                message: err.to_string(),
            },
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    OutOfRange,
    AlreadyOccupied,
    GridFull,
    NotJoined,
    NotAuthorized,
    UnknownHandle,
    InvalidConfig,
    Backend,
}

impl From<TileError> for ErrorKind {
    fn from(err: TileError) -> Self {
        match err {
            TileError::OutOfRange => Self::OutOfRange,
            TileError::AlreadyOccupied => Self::AlreadyOccupied,
            TileError::GridFull => Self::GridFull,
            TileError::NotJoined => Self::NotJoined,
            TileError::NotAuthorized => Self::NotAuthorized,
            TileError::UnknownHandle => Self::UnknownHandle,
            TileError::InvalidConfig => Self::InvalidConfig,
            TileError::Backend(_) => Self::Backend,
        }
    }
}
