//! # kumactl-socketio
//!
//! [`KumaApi`](kumactl_core::KumaApi) over Socket.IO, the protocol Uptime Kuma
//! speaks to its web frontend.
//!
//! Only the HTTP long-polling transport of Engine.IO v4 is implemented; it
//! needs nothing beyond plain HTTP requests and is enough for the handful of
//! calls a reconciliation run makes.
//!
//! ```ignore
//! use kumactl_socketio::{ClientConfig, SocketIoClient};
//!
//! let client = SocketIoClient::connect("http://127.0.0.1:3001", &ClientConfig::default()).await?;
//! ```

pub mod client;
pub mod error;
pub mod packet;
pub mod transport;

pub use client::{ClientConfig, SocketIoClient};
pub use error::TransportError;
