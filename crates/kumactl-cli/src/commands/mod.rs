pub mod auth;
pub mod monitor;
pub mod reconcile;
pub mod setup;

use std::time::Duration;

use kumactl_core::KumaError;
use kumactl_socketio::{ClientConfig, SocketIoClient};

use crate::cli::OutputFormat;

/// Resolved per-invocation settings.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub url: String,
    pub profile: String,
    pub format: OutputFormat,
    pub reply_timeout: Duration,
}

impl RunContext {
    pub async fn connect(&self) -> Result<SocketIoClient, KumaError> {
        let config = ClientConfig::default().with_reply_timeout(self.reply_timeout);
        tracing::info!(url = %self.url, "connecting");
        Ok(SocketIoClient::connect(&self.url, &config).await?)
    }
}
