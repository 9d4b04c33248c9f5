//! Unified error handling for tetherd.
//!
//! Every failure in the relay core degrades to "message not delivered";
//! nothing here is fatal to the owning process. Errors exist so call sites
//! can log with structure before dropping the one affected operation.

use thiserror::Error;

// ============================================================================
// Broker Errors (tunnel allocation and session correlation)
// ============================================================================

/// Errors raised while brokering a direct-connection request.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// A listening endpoint could not be obtained from the transport.
    #[error("failed to allocate broker endpoint: {0}")]
    Allocation(#[from] std::io::Error),

    /// A session with the same broker-local port is already live.
    ///
    /// Local ports are unique among live sessions; this indicates a stale
    /// entry whose teardown has not been observed yet.
    #[error("duplicate broker-local port: {0}")]
    DuplicatePort(u16),
}

impl BrokerError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Allocation(_) => "allocation_failed",
            Self::DuplicatePort(_) => "duplicate_port",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broker_error_codes() {
        let err = BrokerError::DuplicatePort(5000);
        assert_eq!(err.error_code(), "duplicate_port");

        let err = BrokerError::Allocation(std::io::Error::other("bind failed"));
        assert_eq!(err.error_code(), "allocation_failed");
    }
}
