use std::time::Duration;

use thiserror::Error;

/// Error returned by [`Leaser`](crate::Leaser) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LeaseError {
    /// An unexpired lease already exists for the identifier.
    #[error("cannot get lease for id: {id}; held for another {remaining:?}")]
    Held { id: String, remaining: Duration },

    /// The presented expiry does not match the stored one (stale or foreign holder).
    #[error("cannot reset lease for id: {id}; alleged expiry does not match")]
    Mismatch { id: String },

    /// No lease was ever granted for the identifier.
    #[error("cannot reset lease for id: {id}; no lease granted")]
    Unknown { id: String },
}

impl LeaseError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LeaseError::Held { .. } => "lease_held",
            LeaseError::Mismatch { .. } => "lease_mismatch",
            LeaseError::Unknown { .. } => "lease_unknown",
        }
    }
}
