//! Error types for reconciliation runs.

use thiserror::Error;

/// Kind of remote entity a lookup was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Tag,
    Monitor,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tag => f.write_str("tag"),
            Self::Monitor => f.write_str("monitor"),
        }
    }
}

/// Every failure a reconciliation run can end with.
///
/// All variants are fatal for the run. The reporter keeps whatever `changed`
/// state was reached before the error was raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KumaError {
    /// Credentials rejected, or the instance still needs its initial setup.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Network or connection failure while talking to the remote service.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// A tag or monitor required by the assertion does not exist.
    #[error("{kind} not found: {name}")]
    NotFound { kind: EntityKind, name: String },

    /// A mutating call was acknowledged with `ok=false`.
    #[error("{operation} failed: {message}")]
    RemoteOperation { operation: String, message: String },

    /// The remote answered with something that could not be understood.
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// The assertion cannot be applied as given.
    #[error("Invalid assertion: {message}")]
    InvalidAssertion { message: String },
}

impl KumaError {
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn remote_operation(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteOperation {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    pub fn invalid_assertion(message: impl Into<String>) -> Self {
        Self::InvalidAssertion {
            message: message.into(),
        }
    }

    /// True for failures raised by a rejected mutation.
    pub fn is_remote_rejection(&self) -> bool {
        matches!(self, Self::RemoteOperation { .. })
    }
}

impl From<serde_json::Error> for KumaError {
    fn from(err: serde_json::Error) -> Self {
        Self::protocol(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KumaError>;
