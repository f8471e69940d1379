//! Error types for INT provisioning operations.
//!
//! Every classified outcome of the taxonomy is an explicit variant so
//! callers must handle it; nothing expected is signaled by panicking.

use int_types::{CircuitId, InterfaceId, SwitchId};
use thiserror::Error;

/// Result type alias for INT provisioning operations.
pub type IntResult<T> = Result<T, IntError>;

/// Coarse classification of an [`IntError`], for callers that map
/// outcomes onto a response surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Requested entity is absent; terminal, no retry.
    NotFound,
    /// Precondition conflict (state or hardware health); terminal, no retry.
    Conflict,
    /// Communication failure that may succeed on retry.
    Transient,
    /// Retry budget exhausted on a transient failure.
    Unavailable,
    /// Invariant violation or rejected payload; terminal, do not retry blindly.
    Internal,
}

/// Errors that can occur while provisioning or decommissioning INT.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntError {
    /// The circuit id was requested but the inventory has no such circuit.
    #[error("circuit '{circuit}' not found")]
    CircuitNotFound {
        /// The requested circuit id.
        circuit: CircuitId,
    },

    /// Expected INT flows are absent on a path switch.
    #[error("no INT flows found for circuit '{circuit}' on switch '{switch}'")]
    FlowsNotFound {
        /// The owning circuit.
        circuit: CircuitId,
        /// The switch where flows were expected.
        switch: SwitchId,
    },

    /// No proxy port is configured for a circuit endpoint.
    #[error("no proxy port found for interface '{interface}' of circuit '{circuit}'")]
    ProxyPortNotFound {
        /// The circuit being provisioned.
        circuit: CircuitId,
        /// The UNI interface lacking a proxy port.
        interface: InterfaceId,
    },

    /// INT is already enabled and the caller did not pass force.
    #[error("INT is already enabled on circuit '{circuit}'")]
    AlreadyEnabled {
        /// The conflicting circuit.
        circuit: CircuitId,
    },

    /// INT is not enabled and the caller did not pass force.
    #[error("INT is not enabled on circuit '{circuit}'")]
    NotEnabled {
        /// The conflicting circuit.
        circuit: CircuitId,
    },

    /// The endpoint's proxy port exists but is not UP.
    ///
    /// Force never overrides this: hardware state cannot be forced.
    #[error("proxy port of interface '{interface}' is not UP for circuit '{circuit}'")]
    ProxyPortDown {
        /// The circuit being provisioned.
        circuit: CircuitId,
        /// The UNI interface whose proxy port is down.
        interface: InterfaceId,
    },

    /// The circuit's path cannot carry INT (e.g. both endpoints on one switch).
    #[error("invalid topology for circuit '{circuit}': {reason}")]
    InvalidTopology {
        /// The offending circuit.
        circuit: CircuitId,
        /// What is wrong with the path.
        reason: String,
    },

    /// Communication failure with a backend or the inventory.
    #[error("transient failure in {operation}: {message}")]
    Transient {
        /// The operation that failed.
        operation: String,
        /// Underlying cause.
        message: String,
    },

    /// A switch backend refused the payload as malformed.
    #[error("{operation} rejected by switch '{switch}': {message}")]
    Rejected {
        /// The refusing switch.
        switch: SwitchId,
        /// The operation that was rejected.
        operation: String,
        /// Backend-reported reason.
        message: String,
    },

    /// The retry budget ran out on a transient failure.
    #[error("{operation} failed after {attempts} attempts: {last}")]
    RetryExhausted {
        /// The operation that kept failing.
        operation: String,
        /// How many attempts were made.
        attempts: u32,
        /// The last underlying cause.
        last: String,
    },

    /// Internal invariant violation; surfaced, never retried.
    #[error("internal error: {message}")]
    Unrecoverable {
        /// What went wrong.
        message: String,
    },
}

impl IntError {
    /// Creates a transient communication error.
    pub fn transient(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transient {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates a rejected-payload error.
    pub fn rejected(
        switch: SwitchId,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Rejected {
            switch,
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates an unrecoverable internal error.
    pub fn unrecoverable(message: impl Into<String>) -> Self {
        Self::Unrecoverable {
            message: message.into(),
        }
    }

    /// Returns true if this error indicates a transient condition
    /// that may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, IntError::Transient { .. })
    }

    /// Returns the coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            IntError::CircuitNotFound { .. }
            | IntError::FlowsNotFound { .. }
            | IntError::ProxyPortNotFound { .. } => ErrorKind::NotFound,
            IntError::AlreadyEnabled { .. }
            | IntError::NotEnabled { .. }
            | IntError::ProxyPortDown { .. }
            | IntError::InvalidTopology { .. } => ErrorKind::Conflict,
            IntError::Transient { .. } => ErrorKind::Transient,
            IntError::RetryExhausted { .. } => ErrorKind::Unavailable,
            IntError::Rejected { .. } | IntError::Unrecoverable { .. } => ErrorKind::Internal,
        }
    }
}
