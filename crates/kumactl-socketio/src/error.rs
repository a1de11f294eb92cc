//! Transport error types.

use kumactl_core::KumaError;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid server URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server answered HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed packet {packet:?}: {message}")]
    Packet { packet: String, message: String },

    #[error("Unexpected reply to {event}: {message}")]
    Reply { event: String, message: String },

    #[error("Connection refused by server: {0}")]
    ConnectRefused(String),

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Connection closed by server")]
    Closed,
}

impl TransportError {
    pub fn packet(packet: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Packet {
            packet: packet.into(),
            message: message.into(),
        }
    }

    pub fn reply(event: impl Into<String>, message: impl ToString) -> Self {
        Self::Reply {
            event: event.into(),
            message: message.to_string(),
        }
    }
}

impl From<TransportError> for KumaError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Packet { .. } | TransportError::Reply { .. } => {
                KumaError::protocol(err.to_string())
            }
            other => KumaError::transport(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
