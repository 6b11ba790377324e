use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Malformed request: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("Failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),
}

pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;
