use dv_types::EncodeError;
use std::fmt;
use tbls::BlsError;

/// Errors surfaced to the validator client. Nothing in here is retried;
/// every error aborts the current request.
#[derive(Debug, Clone)]
pub enum Error {
    /// Malformed submission, e.g. an attestation that is not a
    /// single-validator attestation.
    BadRequest(String),
    /// BLS verification of a partial signature failed.
    InvalidSignature,
    /// No key share is known for the given root public key.
    UnknownRootKey,
    /// The given public share does not belong to any known validator.
    UnknownShare,
    /// The given public share belongs to a known validator, but under
    /// another peer's share index. This diagnoses validator client key
    /// material that was distributed to the wrong peer.
    MismatchedShareIndex { share_idx: u64, peer_idx: u64 },
    /// The upstream beacon node RPC failed.
    Upstream(String),
    /// The caller went away while an input was awaited.
    Cancelled,
    /// Encoding or hashing failure, or a missing wiring input.
    Internal(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest(msg) => write!(f, "bad request: {msg}"),
            Self::InvalidSignature => write!(f, "invalid signature"),
            Self::UnknownRootKey => write!(f, "unknown public key"),
            Self::UnknownShare => write!(f, "unknown public share"),
            Self::MismatchedShareIndex {
                share_idx,
                peer_idx,
            } => write!(
                f,
                "mismatching validator client key share index, {share_idx}th key share submitted to {peer_idx}th peer",
            ),
            Self::Upstream(msg) => write!(f, "beacon node: {msg}"),
            Self::Cancelled => write!(f, "request cancelled"),
            Self::Internal(msg) => write!(f, "internal: {msg}"),
        }
    }
}

impl From<BlsError> for Error {
    fn from(e: BlsError) -> Self {
        match e {
            BlsError::VerificationFailed | BlsError::InvalidSignature(_) => Self::InvalidSignature,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<EncodeError> for Error {
    fn from(e: EncodeError) -> Self {
        Self::Internal(e.to_string())
    }
}
