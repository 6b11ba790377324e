use thiserror::Error;

/// Failure signal raised by the confidential-computation primitive.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Handle is not known to the confidential backend")]
    UnknownHandle,
    #[error("Confidential backend denied the decryption request")]
    Denied,
    #[error("Confidential backend is unavailable")]
    Unavailable,
    #[error("Confidential backend returned a handle that is already in use")]
    HandleReused,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum TileError {
    #[error("Cell index is outside the grid")]
    OutOfRange,
    #[error("Cell is already occupied")]
    AlreadyOccupied,
    #[error("Grid is full, no free cells remain")]
    GridFull,
    #[error("Identity has not joined the grid")]
    NotJoined,
    #[error("Requester is not authorized to decrypt this value")]
    NotAuthorized,
    #[error("Unknown confidential value handle")]
    UnknownHandle,
    #[error("Invalid grid configuration")]
    InvalidConfig,
    #[error("Confidential backend failure: {0}")]
    Backend(#[from] BackendError),
}

/// How a caller is expected to react to a [`TileError`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Consistency or configuration failure, the enclosing transaction must abort.
    Fatal,
    /// Expected end state, surfaced as a normal rejection.
    Rejected,
    /// Caller may fix the precondition and retry.
    Recoverable,
}

impl TileError {
    pub const fn severity(self) -> Severity {
        use TileError::*;
        match self {
            OutOfRange => Severity::Fatal,
            AlreadyOccupied => Severity::Fatal,
            InvalidConfig => Severity::Fatal,
            GridFull => Severity::Rejected,
            NotJoined => Severity::Recoverable,
            NotAuthorized => Severity::Recoverable,
            UnknownHandle => Severity::Recoverable,
            Backend(BackendError::Unavailable) => Severity::Recoverable,
            Backend(BackendError::Denied) => Severity::Recoverable,
            Backend(BackendError::UnknownHandle) => Severity::Fatal,
            Backend(BackendError::HandleReused) => Severity::Fatal,
        }
    }

    pub const fn is_fatal(self) -> bool {
        matches!(self.severity(), Severity::Fatal)
    }
}

pub type Result<T> = core::result::Result<T, TileError>;
